//! Login service.

use adback_core::error::{AdbackError, AdbackResult};
use adback_core::models::identity::Identity;
use adback_core::repository::UserRepository;
use tracing::info;

use crate::config::ServiceConfig;
use crate::password;
use crate::session;

/// Successful login result.
#[derive(Debug)]
pub struct LoginOutput {
    /// Signed HS256 session token.
    pub token: String,
    /// The authenticated identity, for the transport layer to attach.
    pub identity: Identity,
    /// Token lifetime in seconds.
    pub expires_in: u64,
}

/// Authentication service.
///
/// Generic over the user repository so the login flow has no dependency
/// on the database crate.
pub struct AuthService<U: UserRepository> {
    users: U,
    config: ServiceConfig,
}

impl<U: UserRepository> AuthService<U> {
    pub fn new(users: U, config: ServiceConfig) -> Self {
        Self { users, config }
    }

    /// Authenticate with username + password and issue a session token.
    ///
    /// An unknown username and a wrong password are indistinguishable to
    /// the caller.
    pub async fn login(&self, username: &str, password: &str) -> AdbackResult<LoginOutput> {
        let invalid = || AdbackError::AuthenticationFailed {
            reason: "invalid username or password".into(),
        };

        let user = self
            .users
            .get_by_username(username)
            .await
            .map_err(|e| match e {
                AdbackError::NotFound { .. } => invalid(),
                other => other,
            })?;

        let valid =
            password::verify_password(password, &user.password_hash, self.config.pepper.as_deref())?;
        if !valid {
            return Err(invalid());
        }

        let identity = Identity::from_user(&user);
        let token = session::issue_session_token(&identity, &self.config)?;

        info!(username = %identity.username, role = identity.role.as_str(), "Login succeeded");

        Ok(LoginOutput {
            token,
            identity,
            expires_in: self.config.session_lifetime_secs,
        })
    }

    /// Verify a session token and rebuild the caller's identity.
    ///
    /// Stateless: the identity reflects the token, not the current user
    /// row. Short session lifetimes bound the staleness window.
    pub fn verify(&self, token: &str) -> AdbackResult<Identity> {
        let claims = session::decode_session_token(token, &self.config)?;
        session::identity_from_claims(&claims)
    }
}
