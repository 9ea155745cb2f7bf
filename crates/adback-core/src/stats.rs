//! Stats aggregator — grouped counts over a caller's visible scope.
//!
//! Stats are always computed over the *unfiltered* visible set: applying a
//! role/status/kind filter to a list view changes which rows are shown,
//! never the displayed totals.

use serde::Serialize;

use crate::models::ad::{AdKind, AdStatus};
use crate::models::user::Role;

/// Account counts grouped by role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AccountStats {
    pub total: u64,
    pub master: u64,
    pub agency: u64,
    pub advertiser: u64,
}

pub fn account_stats(roles: &[Role]) -> AccountStats {
    let mut stats = AccountStats {
        total: roles.len() as u64,
        ..Default::default()
    };
    for role in roles {
        match role {
            Role::Master => stats.master += 1,
            Role::Agency => stats.agency += 1,
            Role::Advertiser => stats.advertiser += 1,
        }
    }
    stats
}

/// Ad counts grouped by status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdStatusStats {
    pub total: u64,
    pub active: u64,
    pub error: u64,
    pub waiting: u64,
    pub ending_soon: u64,
    pub ended: u64,
}

impl AdStatusStats {
    fn record(&mut self, status: AdStatus) {
        self.total += 1;
        match status {
            AdStatus::Active => self.active += 1,
            AdStatus::Error => self.error += 1,
            AdStatus::Waiting => self.waiting += 1,
            AdStatus::EndingSoon => self.ending_soon += 1,
            AdStatus::Ended => self.ended += 1,
        }
    }
}

/// Ad counts grouped by kind × status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AdStats {
    pub all: AdStatusStats,
    pub paid: AdStatusStats,
    pub test: AdStatusStats,
}

pub fn ad_stats(rows: &[(AdKind, AdStatus)]) -> AdStats {
    let mut stats = AdStats::default();
    for (kind, status) in rows {
        stats.all.record(*status);
        match kind {
            AdKind::Paid => stats.paid.record(*status),
            AdKind::Test => stats.test.record(*status),
        }
    }
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_totals_add_up() {
        let roles = [
            Role::Master,
            Role::Agency,
            Role::Agency,
            Role::Advertiser,
            Role::Advertiser,
            Role::Advertiser,
        ];
        let stats = account_stats(&roles);
        assert_eq!(stats.total, 6);
        assert_eq!(stats.master, 1);
        assert_eq!(stats.agency, 2);
        assert_eq!(stats.advertiser, 3);
        assert_eq!(stats.total, stats.master + stats.agency + stats.advertiser);
    }

    #[test]
    fn empty_scope_is_all_zeroes() {
        assert_eq!(account_stats(&[]), AccountStats::default());
        assert_eq!(ad_stats(&[]), AdStats::default());
    }

    #[test]
    fn ad_stats_split_by_kind() {
        let rows = [
            (AdKind::Paid, AdStatus::Active),
            (AdKind::Paid, AdStatus::Waiting),
            (AdKind::Test, AdStatus::Active),
            (AdKind::Test, AdStatus::Ended),
            (AdKind::Paid, AdStatus::EndingSoon),
        ];
        let stats = ad_stats(&rows);
        assert_eq!(stats.all.total, 5);
        assert_eq!(stats.paid.total, 3);
        assert_eq!(stats.test.total, 2);
        assert_eq!(stats.all.active, 2);
        assert_eq!(stats.paid.ending_soon, 1);
        assert_eq!(stats.test.ended, 1);
        assert_eq!(
            stats.all.total,
            stats.paid.total + stats.test.total
        );
    }
}
