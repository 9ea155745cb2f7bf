//! SurrealDB implementation of [`CascadeExecutor`].
//!
//! Each plan runs as one transaction, deleting in dependency order (ads,
//! then users, then the organization). Every statement uses `RETURN
//! BEFORE`, so the outcome counts the rows each delete actually removed.
//! A failure anywhere rolls the whole cascade back.

use adback_core::cascade::{CascadeOutcome, CascadePlan};
use adback_core::error::AdbackResult;
use adback_core::repository::CascadeExecutor;
use surrealdb::{Connection, Surreal};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbError;

/// SurrealDB implementation of the cascade executor.
#[derive(Clone)]
pub struct SurrealCascadeExecutor<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealCascadeExecutor<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }

    async fn delete_user_only(&self, user_id: Uuid) -> Result<CascadeOutcome, DbError> {
        let mut result = self
            .db
            .query("DELETE type::record('user', $user_id) RETURN BEFORE")
            .bind(("user_id", user_id.to_string()))
            .await?;

        let removed: Vec<surrealdb_types::Value> = result.take(0)?;

        Ok(CascadeOutcome {
            deleted_users: removed.len() as u64,
            deleted_ads: 0,
            deleted_organizations: 0,
        })
    }

    async fn delete_advertiser_with_ads(
        &self,
        user_id: Uuid,
    ) -> Result<CascadeOutcome, DbError> {
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE FROM ad WHERE advertiser_id = $user_id RETURN BEFORE; \
                 DELETE type::record('user', $user_id) RETURN BEFORE; \
                 COMMIT TRANSACTION",
            )
            .bind(("user_id", user_id.to_string()))
            .await?;

        let mut result = result.check().map_err(|e| DbError::Decode(e.to_string()))?;
        let removed_ads: Vec<surrealdb_types::Value> = result.take(0)?;
        let removed_users: Vec<surrealdb_types::Value> = result.take(1)?;

        Ok(CascadeOutcome {
            deleted_users: removed_users.len() as u64,
            deleted_ads: removed_ads.len() as u64,
            deleted_organizations: 0,
        })
    }

    async fn delete_organization_teardown(
        &self,
        agency_id: Uuid,
        organization_id: Uuid,
    ) -> Result<CascadeOutcome, DbError> {
        let result = self
            .db
            .query(
                "BEGIN TRANSACTION; \
                 DELETE FROM ad WHERE organization_id = $org_id RETURN BEFORE; \
                 DELETE FROM user \
                 WHERE organization_id = $org_id AND role = 'ADVERTISER' \
                 RETURN BEFORE; \
                 DELETE type::record('user', $agency_id) RETURN BEFORE; \
                 DELETE type::record('organization', $org_id) RETURN BEFORE; \
                 COMMIT TRANSACTION",
            )
            .bind(("agency_id", agency_id.to_string()))
            .bind(("org_id", organization_id.to_string()))
            .await?;

        let mut result = result.check().map_err(|e| DbError::Decode(e.to_string()))?;
        let removed_ads: Vec<surrealdb_types::Value> = result.take(0)?;
        let removed_advertisers: Vec<surrealdb_types::Value> = result.take(1)?;
        let removed_agency: Vec<surrealdb_types::Value> = result.take(2)?;
        let removed_orgs: Vec<surrealdb_types::Value> = result.take(3)?;

        Ok(CascadeOutcome {
            deleted_users: (removed_advertisers.len() + removed_agency.len()) as u64,
            deleted_ads: removed_ads.len() as u64,
            deleted_organizations: removed_orgs.len() as u64,
        })
    }
}

impl<C: Connection> CascadeExecutor for SurrealCascadeExecutor<C> {
    async fn execute(&self, plan: &CascadePlan) -> AdbackResult<CascadeOutcome> {
        debug!(?plan, "Executing cascade plan");

        let outcome = match plan {
            CascadePlan::UserOnly { user_id } => self.delete_user_only(*user_id).await?,
            CascadePlan::AdvertiserWithAds { user_id } => {
                self.delete_advertiser_with_ads(*user_id).await?
            }
            CascadePlan::OrganizationTeardown {
                agency_id,
                organization_id,
            } => {
                self.delete_organization_teardown(*agency_id, *organization_id)
                    .await?
            }
        };

        debug!(
            users = outcome.deleted_users,
            ads = outcome.deleted_ads,
            organizations = outcome.deleted_organizations,
            "Cascade plan executed"
        );

        Ok(outcome)
    }
}
