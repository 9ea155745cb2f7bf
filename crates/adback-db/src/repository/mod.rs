//! SurrealDB repository implementations.

mod ad;
mod cascade;
mod notice;
mod organization;
mod user;

pub use ad::SurrealAdRepository;
pub use cascade::SurrealCascadeExecutor;
pub use notice::SurrealNoticeRepository;
pub use organization::SurrealOrganizationRepository;
pub use user::SurrealUserRepository;

use surrealdb_types::SurrealValue;

/// Row struct for count queries.
#[derive(Debug, SurrealValue)]
pub(crate) struct CountRow {
    pub(crate) total: u64,
}
