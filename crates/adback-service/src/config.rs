//! Service configuration.

/// Configuration shared by the service layer.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Shared secret for HS256 session token signing.
    pub jwt_secret: String,
    /// JWT issuer (`iss` claim).
    pub jwt_issuer: String,
    /// Session token lifetime in seconds (default: 86_400 = 24 hours).
    pub session_lifetime_secs: u64,
    /// Optional pepper prepended to passwords before Argon2id hashing.
    pub pepper: Option<String>,
    /// Minimum password length for account creation and password changes.
    pub min_password_length: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: "adback".into(),
            session_lifetime_secs: 86_400,
            pepper: None,
            min_password_length: 8,
        }
    }
}

impl ServiceConfig {
    /// Load configuration from `ADBACK_*` environment variables, falling
    /// back to defaults for anything unset.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            jwt_secret: std::env::var("ADBACK_JWT_SECRET").unwrap_or(defaults.jwt_secret),
            jwt_issuer: std::env::var("ADBACK_JWT_ISSUER").unwrap_or(defaults.jwt_issuer),
            session_lifetime_secs: std::env::var("ADBACK_SESSION_LIFETIME_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.session_lifetime_secs),
            pepper: std::env::var("ADBACK_PASSWORD_PEPPER").ok(),
            min_password_length: defaults.min_password_length,
        }
    }
}
