//! SurrealDB implementation of [`UserRepository`].
//!
//! Visibility scopes coming out of the policy engine are translated into
//! `WHERE` clauses here; the repository itself never reasons about roles
//! beyond storing and filtering them.

use adback_core::error::AdbackResult;
use adback_core::models::user::{CreateUser, Role, UpdateUser, User};
use adback_core::repository::{
    AccountScope, PaginatedResult, Pagination, UserFilter, UserRepository,
};
use chrono::{DateTime, Utc};
use surrealdb::{Connection, Surreal};
use surrealdb_types::SurrealValue;
use uuid::Uuid;

use super::CountRow;
use crate::error::DbError;

/// DB-side row struct for queries where the UUID is already known.
#[derive(Debug, SurrealValue)]
struct UserRow {
    username: String,
    password_hash: String,
    nickname: String,
    role: String,
    organization_id: Option<String>,
    memo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// DB-side row struct that includes the record ID via `meta::id(id)`.
#[derive(Debug, SurrealValue)]
struct UserRowWithId {
    record_id: String,
    username: String,
    password_hash: String,
    nickname: String,
    role: String,
    organization_id: Option<String>,
    memo: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

/// Row struct for role-only projections (stats).
#[derive(Debug, SurrealValue)]
struct RoleRow {
    role: String,
}

fn parse_role(s: &str) -> Result<Role, DbError> {
    Role::parse(s).ok_or_else(|| DbError::Decode(format!("unknown role: {s}")))
}

fn parse_org_id(s: Option<String>) -> Result<Option<Uuid>, DbError> {
    s.map(|v| {
        Uuid::parse_str(&v).map_err(|e| DbError::Decode(format!("invalid organization UUID: {e}")))
    })
    .transpose()
}

impl UserRow {
    fn into_user(self, id: Uuid) -> Result<User, DbError> {
        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            nickname: self.nickname,
            role: parse_role(&self.role)?,
            organization_id: parse_org_id(self.organization_id)?,
            memo: self.memo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl UserRowWithId {
    fn try_into_user(self) -> Result<User, DbError> {
        let id = Uuid::parse_str(&self.record_id)
            .map_err(|e| DbError::Decode(format!("invalid UUID: {e}")))?;
        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            nickname: self.nickname,
            role: parse_role(&self.role)?,
            organization_id: parse_org_id(self.organization_id)?,
            memo: self.memo,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

/// Renders an [`AccountScope`] as a `WHERE` body plus its binds.
fn scope_clause(scope: &AccountScope) -> (String, Vec<(&'static str, String)>) {
    match scope {
        AccountScope::All => ("true".into(), Vec::new()),
        AccountScope::SelfOnly(id) => (
            "meta::id(id) = $scope_self".into(),
            vec![("scope_self", id.to_string())],
        ),
        AccountScope::Organization(org_id) => (
            "organization_id = $scope_org".into(),
            vec![("scope_org", org_id.to_string())],
        ),
        AccountScope::AgenciesAndSelf {
            organization_id,
            user_id,
        } => (
            "((organization_id = $scope_org AND role = 'AGENCY') \
             OR meta::id(id) = $scope_self)"
                .into(),
            vec![
                ("scope_org", organization_id.to_string()),
                ("scope_self", user_id.to_string()),
            ],
        ),
    }
}

/// SurrealDB implementation of the User repository.
#[derive(Clone)]
pub struct SurrealUserRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> SurrealUserRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> UserRepository for SurrealUserRepository<C> {
    async fn create(&self, input: CreateUser) -> AdbackResult<User> {
        let id = Uuid::new_v4();
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::record('user', $id) SET \
                 username = $username, \
                 password_hash = $password_hash, \
                 nickname = $nickname, \
                 role = $role, \
                 organization_id = $organization_id, \
                 memo = $memo",
            )
            .bind(("id", id_str.clone()))
            .bind(("username", input.username))
            .bind(("password_hash", input.password_hash))
            .bind(("nickname", input.nickname))
            .bind(("role", input.role.as_str().to_string()))
            .bind((
                "organization_id",
                input.organization_id.map(|o| o.to_string()),
            ))
            .bind(("memo", input.memo))
            .await
            .map_err(DbError::from)?;

        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_id(&self, id: Uuid) -> AdbackResult<User> {
        let id_str = id.to_string();

        let mut result = self
            .db
            .query("SELECT * FROM type::record('user', $id)")
            .bind(("id", id_str.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn get_by_username(&self, username: &str) -> AdbackResult<User> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE username = $username",
            )
            .bind(("username", username.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: format!("username={username}"),
        })?;

        Ok(row.try_into_user()?)
    }

    async fn get_many(&self, ids: Vec<Uuid>) -> AdbackResult<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let id_strs: Vec<String> = ids.iter().map(Uuid::to_string).collect();

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE meta::id(id) IN $ids",
            )
            .bind(("ids", id_strs))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn update(&self, id: Uuid, input: UpdateUser) -> AdbackResult<User> {
        let id_str = id.to_string();

        let mut sets = Vec::new();
        if input.nickname.is_some() {
            sets.push("nickname = $nickname");
        }
        if input.password_hash.is_some() {
            sets.push("password_hash = $password_hash");
        }
        if input.memo.is_some() {
            sets.push("memo = $memo");
        }
        sets.push("updated_at = time::now()");

        let query = format!(
            "UPDATE type::record('user', $id) SET {}",
            sets.join(", ")
        );

        let mut builder = self.db.query(&query).bind(("id", id_str.clone()));

        if let Some(nickname) = input.nickname {
            builder = builder.bind(("nickname", nickname));
        }
        if let Some(password_hash) = input.password_hash {
            builder = builder.bind(("password_hash", password_hash));
        }
        if let Some(memo) = input.memo {
            // memo is Option<Option<String>>: Some(Some(v)) = set, Some(None) = clear
            builder = builder.bind(("memo", memo));
        }

        let result = builder.await.map_err(DbError::from)?;
        let mut result = result
            .check()
            .map_err(|e| DbError::Decode(e.to_string()))?;

        let rows: Vec<UserRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| DbError::NotFound {
            entity: "user".into(),
            id: id_str,
        })?;

        Ok(row.into_user(id)?)
    }

    async fn list(
        &self,
        scope: AccountScope,
        role_filter: Option<Role>,
        pagination: Pagination,
    ) -> AdbackResult<PaginatedResult<User>> {
        let (scope_where, scope_binds) = scope_clause(&scope);
        let mut clauses = vec![scope_where];
        if role_filter.is_some() {
            clauses.push("role = $role".into());
        }
        let where_body = clauses.join(" AND ");

        let count_query =
            format!("SELECT count() AS total FROM user WHERE {where_body} GROUP ALL");
        let mut count_builder = self.db.query(&count_query);
        for (name, value) in &scope_binds {
            count_builder = count_builder.bind((*name, value.clone()));
        }
        if let Some(role) = role_filter {
            count_builder = count_builder.bind(("role", role.as_str().to_string()));
        }
        let mut count_result = count_builder.await.map_err(DbError::from)?;
        let count_rows: Vec<CountRow> = count_result.take(0).map_err(DbError::from)?;
        let total = count_rows.first().map(|r| r.total).unwrap_or(0);

        let list_query = format!(
            "SELECT meta::id(id) AS record_id, * FROM user \
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
        if let Some(role) = role_filter {
            builder = builder.bind(("role", role.as_str().to_string()));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let items = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(PaginatedResult {
            items,
            total,
            offset: pagination.offset,
            limit: pagination.limit,
        })
    }

    async fn list_roles(&self, scope: AccountScope) -> AdbackResult<Vec<Role>> {
        let (scope_where, scope_binds) = scope_clause(&scope);

        let query = format!("SELECT role FROM user WHERE {scope_where}");
        let mut builder = self.db.query(&query);
        for (name, value) in scope_binds {
            builder = builder.bind((name, value));
        }
        let mut result = builder.await.map_err(DbError::from)?;

        let rows: Vec<RoleRow> = result.take(0).map_err(DbError::from)?;
        let roles = rows
            .into_iter()
            .map(|row| parse_role(&row.role))
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(roles)
    }

    async fn count(&self, filter: UserFilter) -> AdbackResult<u64> {
        let mut clauses: Vec<&str> = Vec::new();
        if filter.ids.is_some() {
            clauses.push("meta::id(id) IN $ids");
        }
        if filter.organization_id.is_some() {
            clauses.push("organization_id = $organization_id");
        }
        if filter.role.is_some() {
            clauses.push("role = $role");
        }
        if filter.exclude_id.is_some() {
            clauses.push("meta::id(id) != $exclude_id");
        }
        if clauses.is_empty() {
            clauses.push("true");
        }

        let query = format!(
            "SELECT count() AS total FROM user WHERE {} GROUP ALL",
            clauses.join(" AND ")
        );

        let mut builder = self.db.query(&query);
        if let Some(ids) = filter.ids {
            let id_strs: Vec<String> = ids.iter().map(Uuid::to_string).collect();
            builder = builder.bind(("ids", id_strs));
        }
        if let Some(org_id) = filter.organization_id {
            builder = builder.bind(("organization_id", org_id.to_string()));
        }
        if let Some(role) = filter.role {
            builder = builder.bind(("role", role.as_str().to_string()));
        }
        if let Some(exclude_id) = filter.exclude_id {
            builder = builder.bind(("exclude_id", exclude_id.to_string()));
        }

        let mut result = builder.await.map_err(DbError::from)?;
        let rows: Vec<CountRow> = result.take(0).map_err(DbError::from)?;

        Ok(rows.first().map(|r| r.total).unwrap_or(0))
    }

    async fn list_masters(&self) -> AdbackResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE role = 'MASTER' ORDER BY created_at ASC",
            )
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }

    async fn list_organization_members(&self, organization_id: Uuid) -> AdbackResult<Vec<User>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM user \
                 WHERE organization_id = $organization_id \
                 ORDER BY created_at ASC",
            )
            .bind(("organization_id", organization_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<UserRowWithId> = result.take(0).map_err(DbError::from)?;
        let users = rows
            .into_iter()
            .map(|row| row.try_into_user())
            .collect::<Result<Vec<_>, DbError>>()?;

        Ok(users)
    }
}
