//! SurrealDB implementation of [`OrganizationRepository`].

use adback_core::error::AdbackResult;
use adback_core::models::organization::{CreateOrganization, Organization};
use adback_core::repository::OrganizationRepository;
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct OrganizationRow {
    name: String,
    master_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct OrganizationRowWithId {
    record_id: String,
    name: String,
    master_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

fn parse_master_id(s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| {
        Uuid::parse_str(&v).map_err(|e| DbError::Decode(format!("invalid master UUID: {e}")))
    })
    .transpose()
}

impl OrganizationRow {
    fn into_organization(self, id: Uuid) -> Result<Organization, DbError> {
        Ok(Organization {
            id,
            name: self.name,
            master_id: parse_master_id(self.master_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl OrganizationRowWithId {
    fn try_into_organization(self) -> Result<Organization, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Organization {
            id,
            name: self.name,
            master_id: parse_master_id(self.master_id)?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Organization repository.
#[derive(Clone)]
pub struct SurrealOrganizationRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealOrganizationRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> OrganizationRepository for SurrealOrganizationRepository<C> {
    async fn create(&self, input: CreateOrganization) -> AdbackResult<Organization> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('organization', $id) SET \
                 name = $name, master_id = $master_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("name", input.name))
            .bind(("master_id", input.master_id.map(|m| m.to_string())))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> AdbackResult<Organization> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('organization', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: id_str,
        })?;

        Ok(row.into_organization(id)?)
    }

    async fn get_by_name(&self, name: &str) -> AdbackResult<Organization> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE name = $name",
            )
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "organization".into(),
            id: format!("name={name}"),
        })?;

        Ok(row.try_into_organization()?)
    }

    async fn get_many(&self, ids: Vec<Uuid>) -> AdbackResult<Vec<Organization>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_strs: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM organization \
                 WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", id_strs))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let organizations = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(organizations)
    }

    async fn list(&self, master_id: Option<Uuid>) -> AdbackResult<Vec<Organization>> {
        let mut result = match master_id {
            Some(master_id) => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM organization \
                     WHERE master_id = $master_id ORDER BY name ASC",
                )
                .bind(("master_id", master_id.to_string()))
                .await
                .map_err(DbError::from)?,
            None => self
                .db
                .query(
                    "SELECT meta::id(id) AS record_id, * FROM organization \
                     ORDER BY name ASC",
                )
                .await
                .map_err(DbError::from)?,
        };

        let rows: Vec<OrganizationRowWithId> = result.take(0).map_err(DbError::from)?;
        let organizations = rows
            .into_iter()
            .map(|row| row.try_into_organization())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(organizations)
    }

    async fn count_by_master(&self, master_id: Uuid) -> AdbackResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM organization \
                 WHERE master_id = $master_id GROUP ALL",
            )
            .bind(("master_id", master_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
