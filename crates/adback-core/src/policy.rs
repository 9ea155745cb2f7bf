//! Authorization policy engine.
//!
//! Every (identity, resource, operation) decision lives here, as pure
//! functions: read operations get a visibility scope, writes get an
//! allow/deny plus a field mask, deletes get a scope-restricted filter.
//! Route-level code never branches on roles directly.
//!
//! Error classification contract: callers check existence before invoking
//! the `authorize_*` functions, so a dangling id surfaces as `NotFound`
//! rather than `AuthorizationDenied`.

use uuid::Uuid;

use crate::error::{AdbackError, AdbackResult};
use crate::models::ad::{Ad, UpdateAd};
use crate::models::identity::Identity;
use crate::models::user::{Role, User};
use crate::repository::{AccountScope, AdFilter, AdScope};

// ---------------------------------------------------------------------------
// Read scopes
// ---------------------------------------------------------------------------

/// Which user rows the caller may see.
pub fn account_read_scope(identity: &Identity) -> AccountScope {
    match (identity.role, identity.organization_id) {
        (Role::Master, _) => AccountScope::All,
        (Role::Agency, Some(org)) => AccountScope::Organization(org),
        (Role::Advertiser, Some(org)) => AccountScope::AgenciesAndSelf {
            organization_id: org,
            user_id: identity.id,
        },
        // Orphaned scoped accounts fall back to their own row.
        (_, None) => AccountScope::SelfOnly(identity.id),
    }
}

/// Which ad rows the caller may see.
pub fn ad_read_scope(identity: &Identity) -> AdScope {
    match (identity.role, identity.organization_id) {
        (Role::Master, _) => AdScope::All,
        (Role::Agency, Some(org)) => AdScope::Organization(org),
        (Role::Agency, None) => AdScope::Nothing,
        (Role::Advertiser, _) => AdScope::Advertiser(identity.id),
    }
}

// ---------------------------------------------------------------------------
// Account mutations
// ---------------------------------------------------------------------------

/// Roles the caller is allowed to create accounts for.
pub fn creatable_roles(caller: Role) -> &'static [Role] {
    match caller {
        Role::Master => &[Role::Master, Role::Agency, Role::Advertiser],
        Role::Agency => &[Role::Advertiser],
        Role::Advertiser => &[],
    }
}

pub fn authorize_account_creation(identity: &Identity, requested: Role) -> AdbackResult<()> {
    if creatable_roles(identity.role).contains(&requested) {
        Ok(())
    } else {
        Err(AdbackError::denied("cannot create accounts of this role"))
    }
}

/// Account update rights. The field mask itself is structural: the
/// [`crate::models::user::UpdateUser`] type only carries nickname,
/// password, and memo.
pub fn authorize_account_update(identity: &Identity, target: &User) -> AdbackResult<()> {
    if target.id == identity.id {
        return Ok(());
    }
    match identity.role {
        Role::Master => Ok(()),
        Role::Agency => {
            let same_org = identity.organization_id.is_some()
                && identity.organization_id == target.organization_id;
            if same_org && target.role == Role::Advertiser {
                Ok(())
            } else {
                Err(AdbackError::denied("cannot update this account"))
            }
        }
        Role::Advertiser => Err(AdbackError::denied("cannot update other accounts")),
    }
}

pub fn authorize_account_deletion(identity: &Identity) -> AdbackResult<()> {
    match identity.role {
        Role::Master | Role::Agency => Ok(()),
        Role::Advertiser => Err(AdbackError::denied("cannot delete accounts")),
    }
}

/// Whether `target` falls inside the caller's bulk-delete scope. The
/// caller's own row is never deletable; out-of-scope targets are silently
/// dropped by the caller, not errors.
pub fn account_deletable(identity: &Identity, target: &User) -> bool {
    if target.id == identity.id {
        return false;
    }
    match identity.role {
        Role::Master => true,
        Role::Agency => {
            target.role == Role::Advertiser
                && identity.organization_id.is_some()
                && identity.organization_id == target.organization_id
        }
        Role::Advertiser => false,
    }
}

// ---------------------------------------------------------------------------
// Ad mutations
// ---------------------------------------------------------------------------

/// Ad creation happens on behalf of an advertiser; agencies may only target
/// advertisers inside their own organization.
pub fn authorize_ad_creation(identity: &Identity, advertiser: &User) -> AdbackResult<()> {
    match identity.role {
        Role::Master => Ok(()),
        Role::Agency => {
            if identity.organization_id.is_some()
                && identity.organization_id == advertiser.organization_id
            {
                Ok(())
            } else {
                Err(AdbackError::denied(
                    "cannot register ads outside your organization",
                ))
            }
        }
        Role::Advertiser => Err(AdbackError::denied("cannot register ads")),
    }
}

pub fn authorize_ad_update(identity: &Identity, ad: &Ad) -> AdbackResult<()> {
    match identity.role {
        Role::Master => Ok(()),
        Role::Agency => {
            if identity.organization_id == Some(ad.organization_id) {
                Ok(())
            } else {
                Err(AdbackError::denied("cannot update this ad"))
            }
        }
        Role::Advertiser => {
            if ad.advertiser_id == identity.id {
                Ok(())
            } else {
                Err(AdbackError::denied("cannot update this ad"))
            }
        }
    }
}

/// Apply the ad field mask: status, rank, and quantity are admin-only and
/// are stripped from advertiser-submitted updates.
pub fn mask_ad_update(caller: Role, mut update: UpdateAd) -> UpdateAd {
    if caller == Role::Advertiser {
        update.status = None;
        update.rank = None;
        update.quantity = None;
    }
    update
}

pub fn authorize_ad_deletion(identity: &Identity) -> AdbackResult<()> {
    match identity.role {
        Role::Master | Role::Agency => Ok(()),
        Role::Advertiser => Err(AdbackError::denied("cannot delete ads")),
    }
}

/// Scope-restricted delete predicate for ads: agencies only reach rows in
/// their own organization; masters are unrestricted.
pub fn ad_delete_filter(identity: &Identity, ids: Vec<Uuid>) -> AdFilter {
    AdFilter {
        ids: Some(ids),
        organization_id: match identity.role {
            Role::Agency => identity.organization_id,
            _ => None,
        },
        advertiser_id: None,
    }
}

// ---------------------------------------------------------------------------
// Directory
// ---------------------------------------------------------------------------

/// Master-only directory operations: the master roster and organization
/// creation.
pub fn authorize_directory_management(identity: &Identity) -> AdbackResult<()> {
    match identity.role {
        Role::Master => Ok(()),
        _ => Err(AdbackError::denied("cannot manage the account directory")),
    }
}

// ---------------------------------------------------------------------------
// Notices
// ---------------------------------------------------------------------------

pub fn authorize_notice_management(identity: &Identity) -> AdbackResult<()> {
    match identity.role {
        Role::Master => Ok(()),
        _ => Err(AdbackError::denied("cannot manage notices")),
    }
}
