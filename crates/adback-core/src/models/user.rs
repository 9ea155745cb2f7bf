//! User (account) domain model.
//!
//! Accounts form a three-tier reseller hierarchy: Master (distributor,
//! owns organizations), Agency (scoped to one organization, manages its
//! advertisers), and Advertiser (owns ads).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Master,
    Agency,
    Advertiser,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Master => "MASTER",
            Role::Agency => "AGENCY",
            Role::Advertiser => "ADVERTISER",
        }
    }

    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "MASTER" => Some(Role::Master),
            "AGENCY" => Some(Role::Agency),
            "ADVERTISER" => Some(Role::Advertiser),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    /// Globally unique login name.
    pub username: String,
    /// Argon2id PHC-format hash; raw passwords never reach the store.
    pub password_hash: String,
    pub nickname: String,
    pub role: Role,
    /// `None` for Master accounts; required for Agency and Advertiser.
    pub organization_id: Option<Uuid>,
    /// Free-text operator memo.
    pub memo: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub password_hash: String,
    pub nickname: String,
    pub role: Role,
    pub organization_id: Option<Uuid>,
    pub memo: Option<String>,
}

/// The writable account fields. Role, organization, and username are
/// deliberately absent — they cannot be changed through updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub nickname: Option<String>,
    pub password_hash: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub memo: Option<Option<String>>,
}

impl UpdateUser {
    pub fn is_empty(&self) -> bool {
        self.nickname.is_none() && self.password_hash.is_none() && self.memo.is_none()
    }
}
