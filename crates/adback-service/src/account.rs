//! Account management service.
//!
//! Orchestrates the policy engine, cascade resolver, and stats aggregator
//! for the account back office: role-scoped listings with stats, account
//! creation with organization resolution, masked updates, and bulk
//! deletion with cascades.

use std::collections::HashMap;

use adback_core::cascade::{CascadeOutcome, DeletionContext, plan_account_deletion};
use adback_core::error::{AdbackError, AdbackResult};
use adback_core::models::identity::Identity;
use adback_core::models::organization::{CreateOrganization, Organization};
use adback_core::models::user::{CreateUser, Role, UpdateUser, User};
use adback_core::policy;
use adback_core::repository::{
    AdRepository, CascadeExecutor, OrganizationRepository, Pagination, UserFilter, UserRepository,
};
use adback_core::stats::{AccountStats, account_stats};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::ServiceConfig;
use crate::password;

/// Accounts per listing page.
pub const ACCOUNT_PAGE_SIZE: u64 = 10;

/// An account row enriched for display.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
    pub role: Role,
    pub organization_id: Option<Uuid>,
    pub organization_name: Option<String>,
    pub memo: Option<String>,
    /// Registered ads, for advertiser rows; 0 otherwise.
    pub ad_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of accounts plus scope-wide stats.
#[derive(Debug, Serialize)]
pub struct AccountListOutput {
    pub accounts: Vec<AccountView>,
    pub stats: AccountStats,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub username: String,
    pub password: String,
    pub nickname: String,
    pub role: Role,
    /// Attach to an existing organization (Master callers only).
    pub organization_id: Option<Uuid>,
    /// Create a new organization owned by the caller (Master callers only).
    pub organization_name: Option<String>,
    pub memo: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    pub nickname: Option<String>,
    pub password: Option<String>,
    /// `Some(Some(val))` = set, `Some(None)` = clear, `None` = no change.
    pub memo: Option<Option<String>>,
}

#[derive(Debug, Default, Serialize)]
pub struct DeleteAccountsOutput {
    /// User rows actually removed, cascaded advertisers included.
    pub deleted_count: u64,
    pub deleted_ads: u64,
    pub deleted_organizations: u64,
}

/// A master roster entry.
#[derive(Debug, Clone, Serialize)]
pub struct MasterView {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
    pub organization_count: u64,
    pub created_at: DateTime<Utc>,
}

/// An organization enriched for display.
#[derive(Debug, Clone, Serialize)]
pub struct OrganizationView {
    pub id: Uuid,
    pub name: String,
    pub master_id: Option<Uuid>,
    pub master_nickname: Option<String>,
    pub user_count: u64,
    pub created_at: DateTime<Utc>,
}

/// A slim account row for hierarchy trees.
#[derive(Debug, Clone, Serialize)]
pub struct MemberView {
    pub id: Uuid,
    pub username: String,
    pub nickname: String,
    pub role: Role,
}

impl MemberView {
    fn from_user(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            nickname: user.nickname.clone(),
            role: user.role,
        }
    }
}

/// One level of the role-scoped directory tree.
#[derive(Debug, Serialize)]
pub enum HierarchyView {
    Masters(Vec<MasterView>),
    Organizations(Vec<OrganizationView>),
    Members(Vec<MemberView>),
}

/// Account management service, generic over its repositories.
pub struct AccountService<U, O, A, X>
where
    U: UserRepository,
    O: OrganizationRepository,
    A: AdRepository,
    X: CascadeExecutor,
{
    users: U,
    orgs: O,
    ads: A,
    cascade: X,
    config: ServiceConfig,
}

impl<U, O, A, X> AccountService<U, O, A, X>
where
    U: UserRepository,
    O: OrganizationRepository,
    A: AdRepository,
    X: CascadeExecutor,
{
    pub fn new(users: U, orgs: O, ads: A, cascade: X, config: ServiceConfig) -> Self {
        Self {
            users,
            orgs,
            ads,
            cascade,
            config,
        }
    }

    /// One page of the caller's visible accounts, plus stats over the whole
    /// visible scope. The stats never react to the role filter.
    pub async fn list_accounts(
        &self,
        identity: &Identity,
        role_filter: Option<Role>,
        page: u64,
    ) -> AdbackResult<AccountListOutput> {
        let scope = policy::account_read_scope(identity);
        // Advertisers get a fixed directory view; the role filter is ignored.
        let role_filter = if identity.role == Role::Advertiser {
            None
        } else {
            role_filter
        };

        let roles = self.users.list_roles(scope).await?;
        let stats = account_stats(&roles);

        let page = page.max(1);
        let result = self
            .users
            .list(
                scope,
                role_filter,
                Pagination {
                    offset: (page - 1) * ACCOUNT_PAGE_SIZE,
                    limit: ACCOUNT_PAGE_SIZE,
                },
            )
            .await?;
        let accounts = self.build_views(result.items).await?;

        Ok(AccountListOutput {
            accounts,
            stats,
            total: result.total,
            page,
            page_size: ACCOUNT_PAGE_SIZE,
        })
    }

    pub async fn create_account(
        &self,
        identity: &Identity,
        input: CreateAccountInput,
    ) -> AdbackResult<AccountView> {
        policy::authorize_account_creation(identity, input.role)?;

        let username = input.username.trim().to_string();
        if username.len() < 3 {
            return Err(AdbackError::validation(
                "username must be at least 3 characters",
            ));
        }
        let nickname = input.nickname.trim().to_string();
        if nickname.is_empty() {
            return Err(AdbackError::validation("nickname is required"));
        }
        if input.password.len() < self.config.min_password_length {
            return Err(AdbackError::validation(format!(
                "password must be at least {} characters",
                self.config.min_password_length
            )));
        }

        // Uniqueness pre-check for a friendlier error than the index
        // violation; the unique index still backstops races.
        match self.users.get_by_username(&username).await {
            Ok(_) => return Err(AdbackError::conflict("username already in use")),
            Err(AdbackError::NotFound { .. }) => {}
            Err(e) => return Err(e),
        }

        let organization_id = self.resolve_organization(identity, &input).await?;

        let password_hash =
            password::hash_password(&input.password, self.config.pepper.as_deref())?;
        let user = self
            .users
            .create(CreateUser {
                username,
                password_hash,
                nickname,
                role: input.role,
                organization_id,
                memo: input.memo,
            })
            .await?;

        info!(
            username = %user.username,
            role = user.role.as_str(),
            created_by = %identity.username,
            "Account created"
        );

        self.build_view(user).await
    }

    /// Decide which organization a new account belongs to.
    ///
    /// Masters never belong to one. Agency callers force their own
    /// organization. Master callers either create a fresh organization by
    /// name (owned by them) or attach to an existing one by id.
    async fn resolve_organization(
        &self,
        identity: &Identity,
        input: &CreateAccountInput,
    ) -> AdbackResult<Option<Uuid>> {
        if input.role == Role::Master {
            return Ok(None);
        }
        match identity.role {
            Role::Agency => identity
                .organization_id
                .map(Some)
                .ok_or_else(|| AdbackError::validation("caller has no organization")),
            Role::Master => {
                if let Some(name) = input.organization_name.as_deref() {
                    let name = name.trim();
                    if name.is_empty() {
                        return Err(AdbackError::validation("organization name is required"));
                    }
                    match self.orgs.get_by_name(name).await {
                        Ok(_) => Err(AdbackError::conflict("organization name already in use")),
                        Err(AdbackError::NotFound { .. }) => {
                            let org = self
                                .orgs
                                .create(CreateOrganization {
                                    name: name.to_string(),
                                    master_id: Some(identity.id),
                                })
                                .await?;
                            Ok(Some(org.id))
                        }
                        Err(e) => Err(e),
                    }
                } else if let Some(org_id) = input.organization_id {
                    let org = self.orgs.get_by_id(org_id).await?;
                    Ok(Some(org.id))
                } else {
                    Err(AdbackError::validation(
                        "an organization is required for this role",
                    ))
                }
            }
            Role::Advertiser => Err(AdbackError::denied("cannot create accounts of this role")),
        }
    }

    pub async fn update_account(
        &self,
        identity: &Identity,
        target_id: Uuid,
        input: UpdateAccountInput,
    ) -> AdbackResult<AccountView> {
        // Existence before ownership.
        let target = self.users.get_by_id(target_id).await?;
        policy::authorize_account_update(identity, &target)?;

        let mut update = UpdateUser::default();
        if let Some(nickname) = input.nickname {
            let nickname = nickname.trim().to_string();
            if nickname.is_empty() {
                return Err(AdbackError::validation("nickname cannot be empty"));
            }
            update.nickname = Some(nickname);
        }
        if let Some(pw) = input.password {
            if pw.len() < self.config.min_password_length {
                return Err(AdbackError::validation(format!(
                    "password must be at least {} characters",
                    self.config.min_password_length
                )));
            }
            update.password_hash =
                Some(password::hash_password(&pw, self.config.pepper.as_deref())?);
        }
        update.memo = input.memo;

        if update.is_empty() {
            return Err(AdbackError::validation("no fields to update"));
        }

        let user = self.users.update(target_id, update).await?;
        self.build_view(user).await
    }

    /// Bulk account deletion with cascades.
    ///
    /// Out-of-scope ids and the caller's own id are silently dropped; a
    /// request targeting only the caller is a validation error. Every
    /// Master target is checked for owned organizations before anything is
    /// deleted, so a conflict aborts the whole batch untouched.
    pub async fn delete_accounts(
        &self,
        identity: &Identity,
        ids: Vec<Uuid>,
    ) -> AdbackResult<DeleteAccountsOutput> {
        policy::authorize_account_deletion(identity)?;
        if ids.is_empty() {
            return Err(AdbackError::validation("no accounts selected"));
        }

        let found = self.users.get_many(ids.clone()).await?;
        let targets: Vec<User> = found
            .into_iter()
            .filter(|u| policy::account_deletable(identity, u))
            .collect();

        if targets.is_empty() {
            if ids.iter().all(|id| *id == identity.id) {
                return Err(AdbackError::validation("cannot delete your own account"));
            }
            return Ok(DeleteAccountsOutput::default());
        }

        for target in targets.iter().filter(|t| t.role == Role::Master) {
            let ctx = DeletionContext {
                managed_organization_count: self.orgs.count_by_master(target.id).await?,
                ..Default::default()
            };
            plan_account_deletion(target, &ctx)?;
        }

        // Context is re-gathered per target so earlier cascades in the
        // batch are reflected (e.g. both agencies of one organization).
        let mut outcome = CascadeOutcome::default();
        for target in &targets {
            let ctx = self.deletion_context(target).await?;
            let plan = plan_account_deletion(target, &ctx)?;
            outcome.absorb(self.cascade.execute(&plan).await?);
        }

        info!(
            requested = ids.len(),
            deleted_users = outcome.deleted_users,
            deleted_ads = outcome.deleted_ads,
            deleted_organizations = outcome.deleted_organizations,
            deleted_by = %identity.username,
            "Accounts deleted"
        );

        Ok(DeleteAccountsOutput {
            deleted_count: outcome.deleted_users,
            deleted_ads: outcome.deleted_ads,
            deleted_organizations: outcome.deleted_organizations,
        })
    }

    async fn deletion_context(&self, target: &User) -> AdbackResult<DeletionContext> {
        let mut ctx = DeletionContext::default();
        match target.role {
            Role::Master => {
                ctx.managed_organization_count = self.orgs.count_by_master(target.id).await?;
            }
            Role::Agency => {
                if let Some(org) = target.organization_id {
                    ctx.sibling_agency_count = self
                        .users
                        .count(UserFilter {
                            organization_id: Some(org),
                            role: Some(Role::Agency),
                            exclude_id: Some(target.id),
                            ..Default::default()
                        })
                        .await?;
                }
            }
            Role::Advertiser => {}
        }
        Ok(ctx)
    }

    /// The master roster with managed-organization counts. Master-only.
    pub async fn list_masters(&self, identity: &Identity) -> AdbackResult<Vec<MasterView>> {
        policy::authorize_directory_management(identity)?;

        let masters = self.users.list_masters().await?;
        let mut views = Vec::with_capacity(masters.len());
        for master in masters {
            let organization_count = self.orgs.count_by_master(master.id).await?;
            views.push(MasterView {
                id: master.id,
                username: master.username,
                nickname: master.nickname,
                organization_count,
                created_at: master.created_at,
            });
        }
        Ok(views)
    }

    /// Organizations visible to the caller: Master sees all (optionally one
    /// master's), scoped roles see their own.
    pub async fn list_organizations(
        &self,
        identity: &Identity,
        master_id: Option<Uuid>,
    ) -> AdbackResult<Vec<OrganizationView>> {
        let organizations = match identity.role {
            Role::Master => self.orgs.list(master_id).await?,
            Role::Agency | Role::Advertiser => match identity.organization_id {
                Some(org_id) => vec![self.orgs.get_by_id(org_id).await?],
                None => Vec::new(),
            },
        };
        self.build_organization_views(organizations).await
    }

    /// Create an organization. Master-only; owner defaults to the caller.
    pub async fn create_organization(
        &self,
        identity: &Identity,
        name: &str,
        master_id: Option<Uuid>,
    ) -> AdbackResult<Organization> {
        policy::authorize_directory_management(identity)?;

        let name = name.trim();
        if name.is_empty() {
            return Err(AdbackError::validation("organization name is required"));
        }
        match self.orgs.get_by_name(name).await {
            Ok(_) => Err(AdbackError::conflict("organization name already in use")),
            Err(AdbackError::NotFound { .. }) => {
                self.orgs
                    .create(CreateOrganization {
                        name: name.to_string(),
                        master_id: Some(master_id.unwrap_or(identity.id)),
                    })
                    .await
            }
            Err(e) => Err(e),
        }
    }

    /// Role-scoped directory tree: masters drill from the roster through a
    /// master's organizations down to one organization's members; agencies
    /// get their own organization; advertisers get their organization's
    /// agencies plus themselves.
    pub async fn get_hierarchy(
        &self,
        identity: &Identity,
        master_id: Option<Uuid>,
        organization_id: Option<Uuid>,
    ) -> AdbackResult<HierarchyView> {
        match identity.role {
            Role::Master => {
                if let Some(org_id) = organization_id {
                    let members = self.users.list_organization_members(org_id).await?;
                    Ok(HierarchyView::Members(
                        members.iter().map(MemberView::from_user).collect(),
                    ))
                } else if let Some(master_id) = master_id {
                    let organizations = self.orgs.list(Some(master_id)).await?;
                    Ok(HierarchyView::Organizations(
                        self.build_organization_views(organizations).await?,
                    ))
                } else {
                    Ok(HierarchyView::Masters(self.list_masters(identity).await?))
                }
            }
            Role::Agency => match identity.organization_id {
                Some(org_id) => {
                    let members = self.users.list_organization_members(org_id).await?;
                    Ok(HierarchyView::Members(
                        members.iter().map(MemberView::from_user).collect(),
                    ))
                }
                None => {
                    let me = self.users.get_by_id(identity.id).await?;
                    Ok(HierarchyView::Members(vec![MemberView::from_user(&me)]))
                }
            },
            Role::Advertiser => {
                let me = self.users.get_by_id(identity.id).await?;
                let mut members = match identity.organization_id {
                    Some(org_id) => self
                        .users
                        .list_organization_members(org_id)
                        .await?
                        .iter()
                        .filter(|u| u.role == Role::Agency)
                        .map(MemberView::from_user)
                        .collect(),
                    None => Vec::new(),
                };
                members.push(MemberView::from_user(&me));
                Ok(HierarchyView::Members(members))
            }
        }
    }

    async fn build_view(&self, user: User) -> AdbackResult<AccountView> {
        let mut views = self.build_views(vec![user]).await?;
        Ok(views.remove(0))
    }

    async fn build_views(&self, users: Vec<User>) -> AdbackResult<Vec<AccountView>> {
        let mut org_ids: Vec<Uuid> = users.iter().filter_map(|u| u.organization_id).collect();
        org_ids.sort_unstable();
        org_ids.dedup();
        let organizations = self.orgs.get_many(org_ids).await?;
        let names: HashMap<Uuid, String> = organizations
            .into_iter()
            .map(|o| (o.id, o.name))
            .collect();

        let mut views = Vec::with_capacity(users.len());
        for user in users {
            let ad_count = if user.role == Role::Advertiser {
                self.ads.count_by_advertiser(user.id).await?
            } else {
                0
            };
            views.push(AccountView {
                id: user.id,
                organization_name: user
                    .organization_id
                    .and_then(|o| names.get(&o).cloned()),
                username: user.username,
                nickname: user.nickname,
                role: user.role,
                organization_id: user.organization_id,
                memo: user.memo,
                ad_count,
                created_at: user.created_at,
                updated_at: user.updated_at,
            });
        }
        Ok(views)
    }

    async fn build_organization_views(
        &self,
        organizations: Vec<Organization>,
    ) -> AdbackResult<Vec<OrganizationView>> {
        let mut master_ids: Vec<Uuid> =
            organizations.iter().filter_map(|o| o.master_id).collect();
        master_ids.sort_unstable();
        master_ids.dedup();
        let masters = self.users.get_many(master_ids).await?;
        let nicknames: HashMap<Uuid, String> =
            masters.into_iter().map(|u| (u.id, u.nickname)).collect();

        let mut views = Vec::with_capacity(organizations.len());
        for org in organizations {
            let user_count = self
                .users
                .count(UserFilter {
                    organization_id: Some(org.id),
                    ..Default::default()
                })
                .await?;
            views.push(OrganizationView {
                id: org.id,
                name: org.name,
                master_id: org.master_id,
                master_nickname: org.master_id.and_then(|m| nicknames.get(&m).cloned()),
                user_count,
                created_at: org.created_at,
            });
        }
        Ok(views)
    }
}
