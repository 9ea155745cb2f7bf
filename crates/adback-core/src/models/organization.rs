//! Organization domain model.
//!
//! An organization is a tenant grouping one or more agencies and their
//! advertisers, owned by a single master. It is created by a master
//! (explicitly, or implicitly when creating the first agency under a new
//! name) and removed when its last agency is deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    /// Unique display name.
    pub name: String,
    /// Owning master account.
    pub master_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateOrganization {
    pub name: String,
    pub master_id: Option<Uuid>,
}
