//! SurrealDB implementation of [`AdRepository`].
//!
//! Ad dates are stored as `YYYY-MM-DD` strings; batch creation runs inside
//! a single transaction so a mid-batch failure rolls every row back.

use adback_core::error::AdbackResult;
use adback_core::models::ad::{Ad, AdKind, AdStatus, CreateAd, UpdateAd};
use adback_core::repository::{AdFilter, AdRepository, AdScope, PaginatedResult, Pagination};
use chrono::{DateTime, NaiveDate, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, SurrealValue)]
struct AdRow {
    organization_id: String,
    advertiser_id: String,
    kind: String,
    status: String,
    keyword: Option<String>,
    rank: Option<i64>,
    product_name: Option<String>,
    product_link: Option<String>,
    product_id: Option<String>,
    quantity: Option<i64>,
    working_days: i64,
    start_date: String,
    end_date: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct AdRowWithId {
    record_id: String,
    organization_id: String,
    advertiser_id: String,
    kind: String,
    status: String,
    keyword: Option<String>,
    rank: Option<i64>,
    product_name: Option<String>,
    product_link: Option<String>,
    product_id: Option<String>,
    quantity: Option<i64>,
    working_days: i64,
    start_date: String,
    end_date: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct for kind/status projections (stats).
#[derive(Debug, SurrealValue)]
struct KindStatusRow {
    kind: String,
    status: String,
}

fn parse_kind(s: &str) -> Result<AdKind, DbError> {
    AdKind::parse(s).ok_or_else(|| DbError::Decode(format!("unknown ad kind: {s}")))
}

fn parse_status(s: &str) -> Result<AdStatus, DbError> {
    AdStatus::parse(s).ok_or_else(|| DbError::Decode(format!("unknown ad status: {s}")))
}

fn parse_uuid(s: &str, what: &str) -> Result<Uuid, DbError> {
    Uuid::parse_str(s).map_err(|e| DbError::Decode(format!("invalid {what} UUID: {e}")))
}

fn parse_date(s: &str, what: &str) -> Result<NaiveDate, DbError> {
    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .map_err(|e| DbError::Decode(format!("invalid {what}: {e}")))
}

impl AdRow {
    fn into_ad(self, id: Uuid) -> Result<Ad, DbError> {
        Ok(Ad {
            id,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            advertiser_id: parse_uuid(&self.advertiser_id, "advertiser")?,
            kind: parse_kind(&self.kind)?,
            status: parse_status(&self.status)?,
            keyword: self.keyword,
            rank: self.rank,
            product_name: self.product_name,
            product_link: self.product_link,
            product_id: self.product_id,
            quantity: self.quantity,
            working_days: self.working_days,
            start_date: parse_date(&self.start_date, "start_date")?,
            end_date: parse_date(&self.end_date, "end_date")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl AdRowWithId {
    fn try_into_ad(self) -> Result<Ad, DbError> {
        let id = parse_uuid(&self.record_id, "ad")?;
        Ok(Ad {
            id,
            organization_id: parse_uuid(&self.organization_id, "organization")?,
            advertiser_id: parse_uuid(&self.advertiser_id, "advertiser")?,
            kind: parse_kind(&self.kind)?,
            status: parse_status(&self.status)?,
            keyword: self.keyword,
            rank: self.rank,
            product_name: self.product_name,
            product_link: self.product_link,
            product_id: self.product_id,
            quantity: self.quantity,
            working_days: self.working_days,
            start_date: parse_date(&self.start_date, "start_date")?,
            end_date: parse_date(&self.end_date, "end_date")?,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Renders an [`AdScope`] as a `WHERE` body plus its binds.
fn scope_clause(scope: &AdScope) -> (String, Vec<(&'static str, String)>) {
    match scope {
        AdScope::All => ("true".into(), Vec::new()),
        AdScope::Organization(org_id) => (
            "organization_id = $scope_org".into(),
            vec![("scope_org", org_id.to_string())],
        ),
        AdScope::Advertiser(advertiser_id) => (
            "advertiser_id = $scope_advertiser".into(),
            vec![("scope_advertiser", advertiser_id.to_string())],
        ),
        AdScope::Nothing => ("false".into(), Vec::new()),
    }
}

/// SurrealDB implementation of the Ad repository.
#[derive(Clone)]
pub struct SurrealAdRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealAdRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> AdRepository for SurrealAdRepository<C> {
    async fn create_many(&self, inputs: Vec<CreateAd>) -> AdbackResult<Vec<Ad>> {
        if inputs.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = inputs.iter().map(|_| Uuid::new_v4()).collect();

        // One statement per row inside a transaction; binds are suffixed
        // with the row index so every row keeps its own values.
        let mut statements = vec!["BEGIN TRANSACTION".to_string()];
        for i in 0..inputs.len() {
            statements.push(format!(
                "CREATE type::record('ad', $id_{i}) SET \
                 organization_id = $organization_id_{i}, \
                 advertiser_id = $advertiser_id_{i}, \
                 kind = $kind_{i}, \
                 status = $status_{i}, \
                 keyword = $keyword_{i}, \
                 rank = NONE, \
                 product_name = $product_name_{i}, \
                 product_link = $product_link_{i}, \
                 product_id = $product_id_{i}, \
                 quantity = $quantity_{i}, \
                 working_days = $working_days_{i}, \
                 start_date = $start_date_{i}, \
                 end_date = $end_date_{i}"
            ));
        }
        statements.push("COMMIT TRANSACTION".to_string());
        let query = statements.join("; ");

        let mut builder = self.db.query(&query);
        for (i, (id, input)) in ids.iter().zip(inputs).enumerate() {
            builder = builder
                .bind((format!("id_{i}"), id.to_string()))
                .bind((
                    format!("organization_id_{i}"),
                    input.organization_id.to_string(),
                ))
                .bind((
                    format!("advertiser_id_{i}"),
                    input.advertiser_id.to_string(),
                ))
                .bind((format!("kind_{i}"), input.kind.as_str().to_string()))
                .bind((format!("status_{i}"), input.status.as_str().to_string()))
                .bind((format!("keyword_{i}"), input.keyword))
                .bind((format!("product_name_{i}"), input.product_name))
                .bind((format!("product_link_{i}"), input.product_link))
                .bind((format!("product_id_{i}"), input.product_id))
                .bind((format!("quantity_{i}"), input.quantity))
                .bind((format!("working_days_{i}"), input.working_days))
                .bind((
                    format!("start_date_{i}"),
                    input.start_date.format(DATE_FORMAT).to_string(),
                ))
                .bind((
                    format!("end_date_{i}"),
                    input.end_date.format(DATE_FORMAT).to_string(),
                ));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let mut ads = Vec::with_capacity(ids.len());
        for (i, id) in ids.iter().enumerate() {
            let rows: Vec<AdRow> = result.take(i).map_err(DbError::from)?;
            let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
                entity: "ad".into(),
                id: id.to_string(),
            })?;
            ads.push(row.into_ad(*id)?);
        }

        Ok(ads)
    }

    async fn get_by_id(&self, id: Uuid) -> AdbackResult<Ad> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('ad', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<AdRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ad".into(),
            id: id_str,
        })?;

        Ok(row.into_ad(id)?)
    }

    async fn update(&self, id: Uuid, input: UpdateAd) -> AdbackResult<Ad> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.status.is_some() {
            sets.push("status = $status");
        }
        if input.rank.is_some() {
            sets.push("rank = $rank");
        }
        if input.quantity.is_some() {
            sets.push("quantity = $quantity");
        }
        if input.keyword.is_some() {
            sets.push("keyword = $keyword");
        }
        if input.product_name.is_some() {
            sets.push("product_name = $product_name");
        }
        if input.product_link.is_some() {
            sets.push("product_link = $product_link");
        }
        if input.start_date.is_some() {
            sets.push("start_date = $start_date");
        }
        if input.working_days.is_some() {
            sets.push("working_days = $working_days");
        }
        if input.end_date.is_some() {
            sets.push("end_date = $end_date");
        }
        sets.push("updated_at = time::now()");

        let query = format!("UPDATE type::record('ad', $id) SET {}", sets.join(", "));

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(status) = input.status {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(rank) = input.rank {
            builder = builder.bind(("rank", rank));
        }
        if let Some(quantity) = input.quantity {
            builder = builder.bind(("quantity", quantity));
        }
        if let Some(keyword) = input.keyword {
            builder = builder.bind(("keyword", keyword));
        }
        if let Some(product_name) = input.product_name {
            builder = builder.bind(("product_name", product_name));
        }
        if let Some(product_link) = input.product_link {
            builder = builder.bind(("product_link", product_link));
        }
        if let Some(start_date) = input.start_date {
            builder = builder.bind(("start_date", start_date.format(DATE_FORMAT).to_string()));
        }
        if let Some(working_days) = input.working_days {
            builder = builder.bind(("working_days", working_days));
        }
        if let Some(end_date) = input.end_date {
            builder = builder.bind(("end_date", end_date.format(DATE_FORMAT).to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<AdRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "ad".into(),
            id: id_str,
        })?;

        Ok(row.into_ad(id)?)
    }

    async fn list(
        &self,
        scope: AdScope,
        status_filter: Option<AdStatus>,
        kind_filter: Option<AdKind>,
        pagination: Pagination,
    ) -> AdbackResult<PaginatedResult<Ad>> {
        let (scope_where, scope_binds) = scope_clause(&scope);
        let mut clauses = vec![scope_where];
        if status_filter.is_some() {
            clauses.push("status = $status".into());
        }
        if kind_filter.is_some() {
            clauses.push("kind = $kind".into());
        }
        let where_body = clauses.join(" AND ");

        let count_query = format!("SELECT count() AS total FROM ad WHERE {where_body} GROUP ALL");
        let mut count_builder = self.db.query(&count_query);
        for (name, value) in &scope_binds {
            count_builder = count_builder.bind((*name, value.clone()));
        }
        if let Some(status) = status_filter {
            count_builder = count_builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(kind) = kind_filter {
            count_builder = count_builder.bind(("kind", kind.as_str().to_string()));
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM ad \
             WHERE {where_body} \
             ORDER BY created_at DESC \
             LIMIT $limit START $offset"
        );
        let mut builder = self
            .db
            .query(&list_query)
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset));
        for (name, value) in scope_binds {
            builder = builder.bind((name, value));
        }
        if let Some(status) = status_filter {
            builder = builder.bind(("status", status.as_str().to_string()));
        }
        if let Some(kind) = kind_filter {
            builder = builder.bind(("kind", kind.as_str().to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<AdRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_ad())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_kind_status(&self, scope: AdScope) -> AdbackResult<Vec<(AdKind, AdStatus)>> {
        let (scope_where, scope_binds) = scope_clause(&scope);

        let query = format!("SELECT kind, status FROM ad WHERE {scope_where}");
        let mut builder = self.db.query(&query);
        for (name, value) in scope_binds {
            builder = builder.bind((name, value));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<KindStatusRow> = result.take(0).map_err(DbError::from)?;
        let pairs = rows
            .into_iter()
            .map(|row| Ok((parse_kind(&row.kind)?, parse_status(&row.status)?)))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(pairs)
    }

    async fn count_by_advertiser(&self, advertiser_id: Uuid) -> AdbackResult<u64> {
        let mut result = self
            .db
            .query(
                "SELECT count() AS total FROM ad \
                 WHERE advertiser_id = $advertiser_id GROUP ALL",
            )
            .bind(("advertiser_id", advertiser_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn delete_where(&self, filter: AdFilter) -> AdbackResult<u64> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.ids.is_some() {
            clauses.push("meta::id(id) IN $ids");
        }
        if filter.organization_id.is_some() {
            clauses.push("organization_id = $organization_id");
        }
        if filter.advertiser_id.is_some() {
            clauses.push("advertiser_id = $advertiser_id");
        }
        // An unconstrained filter would wipe the table; match nothing instead.
        if clauses.is_empty() {
            return Ok(0);
        }
        let where_body = clauses.join(" AND ");

        // Count and delete in one transaction so the reported count is the
        // number of rows actually removed.
        let query = format!(
            "BEGIN TRANSACTION; \
             SELECT count() AS total FROM ad WHERE {where_body} GROUP ALL; \
             DELETE FROM ad WHERE {where_body}; \
             COMMIT TRANSACTION"
        );

        let mut builder = self.db.query(&query);
        if let Some(ids) = filter.ids {
            let id_strs: Vec<String> = ids.iter().map(Uuid::to_string).collect();
            builder = builder.bind(("ids", id_strs));
        }
        if let Some(org_id) = filter.organization_id {
            builder = builder.bind(("organization_id", org_id.to_string()));
        }
        if let Some(advertiser_id) = filter.advertiser_id {
            builder = builder.bind(("advertiser_id", advertiser_id.to_string()));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }
}
