//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Visibility is expressed as data
//! ([`AccountScope`], [`AdScope`]) produced by the policy engine and
//! translated into `WHERE` clauses by the store; mutating queries take the
//! narrower [`UserFilter`]/[`AdFilter`] predicates.

use uuid::Uuid;

use crate::cascade::{CascadeOutcome, CascadePlan};
use crate::error::AdbackResult;
use crate::models::{
    ad::{Ad, AdKind, AdStatus, CreateAd, UpdateAd},
    notice::{CreateNotice, Notice, UpdateNotice},
    organization::{CreateOrganization, Organization},
    user::{CreateUser, Role, UpdateUser, User},
};

/// Pagination parameters for list queries.
#[derive(Debug, Clone)]
pub struct Pagination {
    pub offset: u64,
    pub limit: u64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            offset: 0,
            limit: 50,
        }
    }
}

/// A paginated result set.
#[derive(Debug, Clone)]
pub struct PaginatedResult<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub offset: u64,
    pub limit: u64,
}

// ---------------------------------------------------------------------------
// Visibility scopes (policy engine output)
// ---------------------------------------------------------------------------

/// Row-visibility predicate over user rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountScope {
    /// Master: every account.
    All,
    /// An account with no organization sees only itself.
    SelfOnly(Uuid),
    /// Agency: every account in its organization.
    Organization(Uuid),
    /// Advertiser: same-organization agencies plus its own row.
    AgenciesAndSelf {
        organization_id: Uuid,
        user_id: Uuid,
    },
}

/// Row-visibility predicate over ad rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdScope {
    All,
    Organization(Uuid),
    Advertiser(Uuid),
    /// Matches nothing (e.g. an agency with no organization).
    Nothing,
}

/// Equality/membership predicate for user counts and lookups.
#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub ids: Option<Vec<Uuid>>,
    pub organization_id: Option<Uuid>,
    pub role: Option<Role>,
    pub exclude_id: Option<Uuid>,
}

/// Equality/membership predicate for ad deletion and counts.
#[derive(Debug, Clone, Default)]
pub struct AdFilter {
    pub ids: Option<Vec<Uuid>>,
    pub organization_id: Option<Uuid>,
    pub advertiser_id: Option<Uuid>,
}

// ---------------------------------------------------------------------------
// Repositories
// ---------------------------------------------------------------------------

pub trait UserRepository: Send + Sync {
    fn create(&self, input: CreateUser) -> impl Future<Output = AdbackResult<User>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AdbackResult<User>> + Send;
    fn get_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = AdbackResult<User>> + Send;
    /// Fetch the subset of `ids` that exists; missing ids are skipped.
    fn get_many(&self, ids: Vec<Uuid>) -> impl Future<Output = AdbackResult<Vec<User>>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateUser,
    ) -> impl Future<Output = AdbackResult<User>> + Send;
    fn list(
        &self,
        scope: AccountScope,
        role_filter: Option<Role>,
        pagination: Pagination,
    ) -> impl Future<Output = AdbackResult<PaginatedResult<User>>> + Send;
    /// Roles of every row in scope, for stats. Ignores secondary filters.
    fn list_roles(
        &self,
        scope: AccountScope,
    ) -> impl Future<Output = AdbackResult<Vec<Role>>> + Send;
    fn count(&self, filter: UserFilter) -> impl Future<Output = AdbackResult<u64>> + Send;
    fn list_masters(&self) -> impl Future<Output = AdbackResult<Vec<User>>> + Send;
    fn list_organization_members(
        &self,
        organization_id: Uuid,
    ) -> impl Future<Output = AdbackResult<Vec<User>>> + Send;
}

pub trait OrganizationRepository: Send + Sync {
    fn create(
        &self,
        input: CreateOrganization,
    ) -> impl Future<Output = AdbackResult<Organization>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AdbackResult<Organization>> + Send;
    fn get_by_name(&self, name: &str)
    -> impl Future<Output = AdbackResult<Organization>> + Send;
    fn get_many(
        &self,
        ids: Vec<Uuid>,
    ) -> impl Future<Output = AdbackResult<Vec<Organization>>> + Send;
    /// Name-ordered listing, optionally restricted to one master's
    /// organizations.
    fn list(
        &self,
        master_id: Option<Uuid>,
    ) -> impl Future<Output = AdbackResult<Vec<Organization>>> + Send;
    fn count_by_master(&self, master_id: Uuid)
    -> impl Future<Output = AdbackResult<u64>> + Send;
}

pub trait AdRepository: Send + Sync {
    /// Create a batch of ads in a single atomic transaction — either every
    /// row lands or none do.
    fn create_many(
        &self,
        inputs: Vec<CreateAd>,
    ) -> impl Future<Output = AdbackResult<Vec<Ad>>> + Send;
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AdbackResult<Ad>> + Send;
    fn update(&self, id: Uuid, input: UpdateAd)
    -> impl Future<Output = AdbackResult<Ad>> + Send;
    fn list(
        &self,
        scope: AdScope,
        status_filter: Option<AdStatus>,
        kind_filter: Option<AdKind>,
        pagination: Pagination,
    ) -> impl Future<Output = AdbackResult<PaginatedResult<Ad>>> + Send;
    /// Kind/status of every row in scope, for stats.
    fn list_kind_status(
        &self,
        scope: AdScope,
    ) -> impl Future<Output = AdbackResult<Vec<(AdKind, AdStatus)>>> + Send;
    fn count_by_advertiser(
        &self,
        advertiser_id: Uuid,
    ) -> impl Future<Output = AdbackResult<u64>> + Send;
    /// Delete everything matching the filter; returns the number of rows
    /// actually removed.
    fn delete_where(&self, filter: AdFilter) -> impl Future<Output = AdbackResult<u64>> + Send;
}

pub trait NoticeRepository: Send + Sync {
    fn create(&self, input: CreateNotice)
    -> impl Future<Output = AdbackResult<Notice>> + Send;
    /// Plain read, no view-count side effect (edit mode).
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = AdbackResult<Notice>> + Send;
    /// Read with a view-count increment. A missing row is a NotFound, never
    /// a crash of the read path.
    fn read_and_increment(&self, id: Uuid)
    -> impl Future<Output = AdbackResult<Notice>> + Send;
    fn update(
        &self,
        id: Uuid,
        input: UpdateNotice,
    ) -> impl Future<Output = AdbackResult<Notice>> + Send;
    fn delete(&self, id: Uuid) -> impl Future<Output = AdbackResult<()>> + Send;
    fn list(
        &self,
        pagination: Pagination,
    ) -> impl Future<Output = AdbackResult<PaginatedResult<Notice>>> + Send;
}

/// Executes a cascade plan as one atomic transaction, deleting in the
/// dependency order the plan dictates.
pub trait CascadeExecutor: Send + Sync {
    fn execute(
        &self,
        plan: &CascadePlan,
    ) -> impl Future<Output = AdbackResult<CascadeOutcome>> + Send;
}
