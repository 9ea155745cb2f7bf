//! Caller identity, as yielded by the session provider.
//!
//! The policy engine treats this as a trusted, already-verified input; a
//! request with no identity never reaches it (the transport layer answers
//! with an authentication error first).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::user::{Role, User};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identity {
    pub id: Uuid,
    pub username: String,
    pub role: Role,
    pub organization_id: Option<Uuid>,
}

impl Identity {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            organization_id: user.organization_id,
        }
    }
}
