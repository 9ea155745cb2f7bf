//! Schema definitions and migration runner for SurrealDB.
//!
//! All table definitions use SCHEMAFULL mode for data integrity.
//! UUIDs are stored as strings. Enums are stored as strings with
//! ASSERT constraints; ad dates are stored as `YYYY-MM-DD` strings.

use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use tracing::info;

use crate::error::DbError;

// -----------------------------------------------------------------------
// Migration tracking
// -----------------------------------------------------------------------

const MIGRATION_TABLE_DDL: &str = "\
DEFINE TABLE IF NOT EXISTS _migration SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS version ON TABLE _migration TYPE int;
DEFINE FIELD IF NOT EXISTS name ON TABLE _migration TYPE string;
DEFINE FIELD IF NOT EXISTS applied_at ON TABLE _migration TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX IF NOT EXISTS idx_migration_version ON TABLE _migration \
    COLUMNS version UNIQUE;
";

#[derive(Debug, SurrealValue)]
struct MigrationRecord {
    version: u32,
    #[allow(dead_code)]
    name: String,
}

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

static MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "initial_schema",
    sql: SCHEMA_V1,
}];

// -----------------------------------------------------------------------
// Schema v1 — initial table definitions
// -----------------------------------------------------------------------

const SCHEMA_V1: &str = "\
-- =======================================================================
-- Organizations
-- =======================================================================
DEFINE TABLE organization SCHEMAFULL;
DEFINE FIELD name ON TABLE organization TYPE string;
DEFINE FIELD master_id ON TABLE organization TYPE option<string>;
DEFINE FIELD created_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE organization TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_organization_name ON TABLE organization \
    COLUMNS name UNIQUE;

-- =======================================================================
-- Users (accounts)
-- =======================================================================
DEFINE TABLE user SCHEMAFULL;
DEFINE FIELD username ON TABLE user TYPE string;
DEFINE FIELD password_hash ON TABLE user TYPE string;
DEFINE FIELD nickname ON TABLE user TYPE string;
DEFINE FIELD role ON TABLE user TYPE string \
    ASSERT $value IN ['MASTER', 'AGENCY', 'ADVERTISER'];
DEFINE FIELD organization_id ON TABLE user TYPE option<string>;
DEFINE FIELD memo ON TABLE user TYPE option<string>;
DEFINE FIELD created_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE user TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_user_username ON TABLE user COLUMNS username UNIQUE;
DEFINE INDEX idx_user_organization ON TABLE user COLUMNS organization_id;

-- =======================================================================
-- Ads (campaigns)
-- =======================================================================
DEFINE TABLE ad SCHEMAFULL;
DEFINE FIELD organization_id ON TABLE ad TYPE string;
DEFINE FIELD advertiser_id ON TABLE ad TYPE string;
DEFINE FIELD kind ON TABLE ad TYPE string \
    ASSERT $value IN ['PAID', 'TEST'];
DEFINE FIELD status ON TABLE ad TYPE string \
    ASSERT $value IN ['WAITING', 'ACTIVE', 'ERROR', 'ENDING_SOON', \
    'ENDED'];
DEFINE FIELD keyword ON TABLE ad TYPE option<string>;
DEFINE FIELD rank ON TABLE ad TYPE option<int>;
DEFINE FIELD product_name ON TABLE ad TYPE option<string>;
DEFINE FIELD product_link ON TABLE ad TYPE option<string>;
DEFINE FIELD product_id ON TABLE ad TYPE option<string>;
DEFINE FIELD quantity ON TABLE ad TYPE option<int>;
DEFINE FIELD working_days ON TABLE ad TYPE int;
DEFINE FIELD start_date ON TABLE ad TYPE string;
DEFINE FIELD end_date ON TABLE ad TYPE string;
DEFINE FIELD created_at ON TABLE ad TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE ad TYPE datetime \
    DEFAULT time::now();
DEFINE INDEX idx_ad_organization ON TABLE ad COLUMNS organization_id;
DEFINE INDEX idx_ad_advertiser ON TABLE ad COLUMNS advertiser_id;

-- =======================================================================
-- Notices
-- =======================================================================
DEFINE TABLE notice SCHEMAFULL;
DEFINE FIELD title ON TABLE notice TYPE string;
DEFINE FIELD content ON TABLE notice TYPE string;
DEFINE FIELD view_count ON TABLE notice TYPE int DEFAULT 0;
DEFINE FIELD created_at ON TABLE notice TYPE datetime \
    DEFAULT time::now();
DEFINE FIELD updated_at ON TABLE notice TYPE datetime \
    DEFAULT time::now();
";

// -----------------------------------------------------------------------
// Public API
// -----------------------------------------------------------------------

/// Run all pending migrations against the given SurrealDB client.
///
/// Creates a `_migration` tracking table on first run, then applies
/// each migration whose version exceeds the current maximum.
/// All DEFINE statements are idempotent so re-running is safe.
pub async fn run_migrations<C: Connection>(db: &Surreal<C>) -> Result<(), DbError> {
    // Ensure migration tracking table exists (idempotent).
    db.query(MIGRATION_TABLE_DDL)
        .await?
        .check()
        .map_err(|e| DbError::Migration(e.to_string()))?;

    // Determine current schema version.
    let mut result = db
        .query("SELECT * FROM _migration ORDER BY version DESC LIMIT 1")
        .await?;
    let records: Vec<MigrationRecord> = result.take(0)?;
    let current_version = records.first().map(|m| m.version).unwrap_or(0);

    for migration in MIGRATIONS {
        if migration.version > current_version {
            info!(
                version = migration.version,
                name = migration.name,
                "Applying migration"
            );
            db.query(migration.sql).await?.check().map_err(|e| {
                DbError::Migration(format!(
                    "Migration v{} '{}' failed: {}",
                    migration.version, migration.name, e,
                ))
            })?;

            // Record the applied migration.
            db.query(
                "CREATE _migration SET version = $version, \
                 name = $name",
            )
            .bind(("version", migration.version))
            .bind(("name", migration.name))
            .await?
            .check()
            .map_err(|e| {
                DbError::Migration(format!(
                    "Failed to record migration v{}: {}",
                    migration.version, e,
                ))
            })?;

            info!(
                version = migration.version,
                "Migration applied successfully"
            );
        }
    }

    Ok(())
}

/// Returns the raw schema DDL for version 1.
///
/// Exposed for testing with in-memory SurrealDB instances that
/// bypass the migration runner.
pub fn schema_v1() -> &'static str {
    SCHEMA_V1
}
