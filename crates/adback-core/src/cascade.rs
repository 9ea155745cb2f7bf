//! Cascade resolver — expands an account deletion into the dependency-ordered
//! set of store operations that keeps referential integrity.
//!
//! Planning is pure and separate from execution: the service gathers the
//! counts the decision needs, [`plan_account_deletion`] picks the plan (or
//! refuses), and a [`crate::repository::CascadeExecutor`] applies it inside
//! one atomic transaction.

use uuid::Uuid;

use crate::error::{AdbackError, AdbackResult};
use crate::models::user::{Role, User};

/// Inputs the deletion decision depends on, gathered by the caller before
/// planning.
#[derive(Debug, Clone, Copy, Default)]
pub struct DeletionContext {
    /// Agencies left in the target's organization, excluding the target.
    pub sibling_agency_count: u64,
    /// Organizations owned by the target (masters only).
    pub managed_organization_count: u64,
}

/// One account deletion, expanded. Execution order within each variant is
/// ads → users → organization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CascadePlan {
    /// Only the user row goes.
    UserOnly { user_id: Uuid },
    /// An advertiser takes its ads with it.
    AdvertiserWithAds { user_id: Uuid },
    /// The last agency of an organization tears the whole tenant down:
    /// the organization's ads, its advertiser accounts, the agency row,
    /// then the organization itself.
    OrganizationTeardown {
        agency_id: Uuid,
        organization_id: Uuid,
    },
}

/// What a plan actually removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CascadeOutcome {
    pub deleted_users: u64,
    pub deleted_ads: u64,
    pub deleted_organizations: u64,
}

impl CascadeOutcome {
    pub fn absorb(&mut self, other: CascadeOutcome) {
        self.deleted_users += other.deleted_users;
        self.deleted_ads += other.deleted_ads;
        self.deleted_organizations += other.deleted_organizations;
    }
}

/// Decide how deleting `target` must cascade.
///
/// A master that still manages organizations is a hard stop — ownership has
/// to be reassigned manually before the account can go.
pub fn plan_account_deletion(
    target: &User,
    ctx: &DeletionContext,
) -> AdbackResult<CascadePlan> {
    match target.role {
        Role::Master => {
            if ctx.managed_organization_count > 0 {
                Err(AdbackError::conflict(
                    "cannot delete a distributor that still manages organizations",
                ))
            } else {
                Ok(CascadePlan::UserOnly { user_id: target.id })
            }
        }
        Role::Advertiser => Ok(CascadePlan::AdvertiserWithAds { user_id: target.id }),
        Role::Agency => match target.organization_id {
            // Orphaned agency: nothing depends on it.
            None => Ok(CascadePlan::UserOnly { user_id: target.id }),
            Some(organization_id) => {
                if ctx.sibling_agency_count > 0 {
                    Ok(CascadePlan::UserOnly { user_id: target.id })
                } else {
                    Ok(CascadePlan::OrganizationTeardown {
                        agency_id: target.id,
                        organization_id,
                    })
                }
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn user(role: Role, org: Option<Uuid>) -> User {
        User {
            id: Uuid::new_v4(),
            username: "u".into(),
            password_hash: String::new(),
            nickname: "U".into(),
            role,
            organization_id: org,
            memo: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn master_without_organizations_is_plain_delete() {
        let target = user(Role::Master, None);
        let plan = plan_account_deletion(&target, &DeletionContext::default()).unwrap();
        assert_eq!(plan, CascadePlan::UserOnly { user_id: target.id });
    }

    #[test]
    fn master_with_organizations_is_a_conflict() {
        let target = user(Role::Master, None);
        let ctx = DeletionContext {
            managed_organization_count: 2,
            ..Default::default()
        };
        assert!(matches!(
            plan_account_deletion(&target, &ctx),
            Err(AdbackError::Conflict { .. })
        ));
    }

    #[test]
    fn advertiser_takes_its_ads() {
        let target = user(Role::Advertiser, Some(Uuid::new_v4()));
        let plan = plan_account_deletion(&target, &DeletionContext::default()).unwrap();
        assert_eq!(plan, CascadePlan::AdvertiserWithAds { user_id: target.id });
    }

    #[test]
    fn agency_with_siblings_leaves_the_organization_alone() {
        let org = Uuid::new_v4();
        let target = user(Role::Agency, Some(org));
        let ctx = DeletionContext {
            sibling_agency_count: 1,
            ..Default::default()
        };
        let plan = plan_account_deletion(&target, &ctx).unwrap();
        assert_eq!(plan, CascadePlan::UserOnly { user_id: target.id });
    }

    #[test]
    fn last_agency_tears_the_organization_down() {
        let org = Uuid::new_v4();
        let target = user(Role::Agency, Some(org));
        let plan = plan_account_deletion(&target, &DeletionContext::default()).unwrap();
        assert_eq!(
            plan,
            CascadePlan::OrganizationTeardown {
                agency_id: target.id,
                organization_id: org,
            }
        );
    }

    #[test]
    fn orphaned_agency_is_plain_delete() {
        let target = user(Role::Agency, None);
        let plan = plan_account_deletion(&target, &DeletionContext::default()).unwrap();
        assert_eq!(plan, CascadePlan::UserOnly { user_id: target.id });
    }

    #[test]
    fn outcome_absorb_sums_fields() {
        let mut total = CascadeOutcome::default();
        total.absorb(CascadeOutcome {
            deleted_users: 2,
            deleted_ads: 5,
            deleted_organizations: 1,
        });
        total.absorb(CascadeOutcome {
            deleted_users: 1,
            deleted_ads: 0,
            deleted_organizations: 0,
        });
        assert_eq!(total.deleted_users, 3);
        assert_eq!(total.deleted_ads, 5);
        assert_eq!(total.deleted_organizations, 1);
    }
}
