//! SurrealDB implementation of [`NoticeRepository`].

use adback_core::error::AdbackResult;
use adback_core::models::notice::{CreateNotice, Notice, UpdateNotice};
use adback_core::repository::{NoticeRepository, PaginatedResult, Pagination};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

#[derive(Debug, SurrealValue)]
struct NoticeRow {
    title: String,
    content: String,
    view_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, SurrealValue)]
struct NoticeRowWithId {
    record_id: String,
    title: String,
    content: String,
    view_count: u64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl NoticeRow {
    fn into_notice(self, id: Uuid) -> Notice {
        Notice {
            id,
            title: self.title,
            content: self.content,
            view_count: self.view_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

impl NoticeRowWithId {
    fn try_into_notice(self) -> Result<Notice, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(Notice {
            id,
            title: self.title,
            content: self.content,
            view_count: self.view_count,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// SurrealDB implementation of the Notice repository.
#[derive(Clone)]
pub struct SurrealNoticeRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealNoticeRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> NoticeRepository for SurrealNoticeRepository<C> {
    async fn create(&self, input: CreateNotice) -> AdbackResult<Notice> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('notice', $id) SET \
                 title = $title, content = $content, view_count = 0",
            )
            .bind(("id", id_str.clone()))
            .bind(("title", input.title))
            .bind(("content", input.content))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<NoticeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notice".into(),
            id: id_str,
        })?;

        Ok(row.into_notice(id))
    }

    async fn get_by_id(&self, id: Uuid) -> AdbackResult<Notice> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('notice', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoticeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notice".into(),
            id: id_str,
        })?;

        Ok(row.into_notice(id))
    }

    async fn read_and_increment(&self, id: Uuid) -> AdbackResult<Notice> {
        let id_str = id.to_string();

        // The increment does not touch updated_at; viewing is not an edit.
        let mut result = self
            .db
            .query("UPDATE type::record('notice', $id) SET view_count += 1")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoticeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notice".into(),
            id: id_str,
        })?;

        Ok(row.into_notice(id))
    }

    async fn update(&self, id: Uuid, input: UpdateNotice) -> AdbackResult<Notice> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.title.is_some() {
            sets.push("title = $title");
        }
        if input.content.is_some() {
            sets.push("content = $content");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('notice', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));
        if let Some(title) = input.title {
            builder = builder.bind(("title", title));
        }
        if let Some(content) = input.content {
            builder = builder.bind(("content", content));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<NoticeRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "notice".into(),
            id: id_str,
        })?;

        Ok(row.into_notice(id))
    }

    async fn delete(&self, id: Uuid) -> AdbackResult<()> {
        let id_str = id.to_string();

        // DELETE returns the removed rows; an empty result means the notice
        // never existed.
        let mut result = self
            .db
            .query("DELETE type::record('notice', $id) RETURN BEFORE")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoticeRow> = result.take(0).map_err(DbError::from)?;
        if rows.is_empty() {
            return Err(DbError::NotFound {
                entity: "notice".into(),
                id: id_str,
            }
            .into());
        }

        Ok(())
    }

    async fn list(&self, pagination: Pagination) -> AdbackResult<PaginatedResult<Notice>> {
        let mut count_result = self
            .db
            .query("SELECT count() AS total FROM notice GROUP ALL")
            .await
            .map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM notice \
                 ORDER BY created_at DESC \
                 LIMIT $limit START $offset",
            )
            .bind(("limit", pagination.limit))
            .bind(("offset", pagination.offset))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<NoticeRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_notice())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }
}
