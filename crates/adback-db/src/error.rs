//! Database-specific error types and conversions.

use adback_core::error::AdbackError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Migration failed: {0}")]
    Migration(String),

    #[error("Malformed row: {0}")]
    Decode(String),

    #[error("Record not found: {entity} with id {id}")]
    NotFound { entity: String, id: String },
}

impl From<DbError> for AdbackError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AdbackError::NotFound { entity, id },
            other => AdbackError::Database(other.to_string()),
        }
    }
}
