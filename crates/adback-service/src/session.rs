//! Session token issuance and verification.
//!
//! Sessions are stateless HS256 JWTs carrying the caller's identity.
//! Verification is purely cryptographic; no store lookup happens here.

use adback_core::error::{AdbackError, AdbackResult};
use adback_core::models::identity::Identity;
use adback_core::models::user::Role;
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ServiceConfig;

/// JWT claims embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Subject — user ID (UUID string).
    pub sub: String,
    /// Login name, for display and audit logs.
    pub username: String,
    /// Role string (`MASTER` / `AGENCY` / `ADVERTISER`).
    pub role: String,
    /// Organization ID (UUID string), absent for masters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org: Option<String>,
    /// Issuer.
    pub iss: String,
    /// Issued-at (Unix timestamp).
    pub iat: i64,
    /// Expiration (Unix timestamp).
    pub exp: i64,
    /// Unique token ID (UUID string).
    pub jti: String,
}

/// Issue a signed HS256 session token for an authenticated identity.
pub fn issue_session_token(identity: &Identity, config: &ServiceConfig) -> AdbackResult<String> {
    let now = Utc::now().timestamp();
    let claims = SessionClaims {
        sub: identity.id.to_string(),
        username: identity.username.clone(),
        role: identity.role.as_str().to_string(),
        org: identity.organization_id.map(|o| o.to_string()),
        iss: config.jwt_issuer.clone(),
        iat: now,
        exp: now + config.session_lifetime_secs as i64,
        jti: Uuid::new_v4().to_string(),
    };

    let key = EncodingKey::from_secret(config.jwt_secret.as_bytes());
    jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &key)
        .map_err(|e| AdbackError::Crypto(format!("JWT encode: {e}")))
}

/// Decode and verify a session token (signature, expiry, issuer).
pub fn decode_session_token(token: &str, config: &ServiceConfig) -> AdbackResult<SessionClaims> {
    let key = DecodingKey::from_secret(config.jwt_secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[&config.jwt_issuer]);
    validation.set_required_spec_claims(&["sub", "exp", "iat", "iss"]);

    jsonwebtoken::decode::<SessionClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AdbackError::AuthenticationFailed {
            reason: format!("invalid session token: {e}"),
        })
}

/// Rebuild a trusted [`Identity`] from verified claims.
pub fn identity_from_claims(claims: &SessionClaims) -> AdbackResult<Identity> {
    let id = Uuid::parse_str(&claims.sub).map_err(|_| AdbackError::AuthenticationFailed {
        reason: "malformed subject claim".into(),
    })?;
    let role = Role::parse(&claims.role).ok_or_else(|| AdbackError::AuthenticationFailed {
        reason: "malformed role claim".into(),
    })?;
    let organization_id = claims
        .org
        .as_deref()
        .map(Uuid::parse_str)
        .transpose()
        .map_err(|_| AdbackError::AuthenticationFailed {
            reason: "malformed organization claim".into(),
        })?;

    Ok(Identity {
        id,
        username: claims.username.clone(),
        role,
        organization_id,
    })
}
