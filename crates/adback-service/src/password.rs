//! Password hashing and verification.
//!
//! Argon2id with OWASP-recommended parameters (memory: 19 MiB,
//! iterations: 2, parallelism: 1). Salt is randomly generated per hash.
//! An optional pepper (server-side secret) can be prepended.

use adback_core::error::AdbackError;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHasher, PasswordVerifier};

fn argon2() -> Result<Argon2<'static>, AdbackError> {
    // OWASP ASVS recommended: m=19456 (19 MiB), t=2, p=1
    let params = argon2::Params::new(19456, 2, 1, None)
        .map_err(|e| AdbackError::Crypto(format!("argon2 params error: {e}")))?;
    Ok(Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        params,
    ))
}

fn peppered<'a>(password: &'a str, pepper: Option<&str>) -> std::borrow::Cow<'a, str> {
    match pepper {
        Some(p) => std::borrow::Cow::Owned(format!("{p}{password}")),
        None => std::borrow::Cow::Borrowed(password),
    }
}

/// Hash a password with Argon2id, PHC string format.
pub fn hash_password(password: &str, pepper: Option<&str>) -> Result<String, AdbackError> {
    let input = peppered(password, pepper);
    let salt = SaltString::generate(&mut argon2::password_hash::rand_core::OsRng);
    let hash = argon2()?
        .hash_password(input.as_bytes(), &salt)
        .map_err(|e| AdbackError::Crypto(format!("password hash error: {e}")))?;
    Ok(hash.to_string())
}

/// Verify a password against an Argon2id hash.
pub fn verify_password(
    password: &str,
    hash: &str,
    pepper: Option<&str>,
) -> Result<bool, AdbackError> {
    let input = peppered(password, pepper);
    let parsed_hash = argon2::PasswordHash::new(hash)
        .map_err(|e| AdbackError::Crypto(format!("invalid hash format: {e}")))?;

    match Argon2::default().verify_password(input.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AdbackError::Crypto(format!("verify error: {e}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify_roundtrip() {
        let hash = hash_password("CorrectHorse42!", None).unwrap();
        assert_ne!(hash, "CorrectHorse42!");
        assert!(hash.starts_with("$argon2id$"));

        assert!(verify_password("CorrectHorse42!", &hash, None).unwrap());
        assert!(!verify_password("WrongPassword", &hash, None).unwrap());
    }

    #[test]
    fn pepper_changes_the_verification_input() {
        let pepper = "server-secret";
        let hash = hash_password("Peppered!", Some(pepper)).unwrap();

        assert!(verify_password("Peppered!", &hash, Some(pepper)).unwrap());
        assert!(!verify_password("Peppered!", &hash, None).unwrap());
    }

    #[test]
    fn same_password_different_salts() {
        let h1 = hash_password("same", None).unwrap();
        let h2 = hash_password("same", None).unwrap();
        assert_ne!(h1, h2);
    }
}
