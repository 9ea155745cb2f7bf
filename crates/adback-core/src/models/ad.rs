//! Advertisement campaign domain model.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdKind {
    Paid,
    Test,
}

impl AdKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdKind::Paid => "PAID",
            AdKind::Test => "TEST",
        }
    }

    pub fn parse(s: &str) -> Option<AdKind> {
        match s {
            "PAID" => Some(AdKind::Paid),
            "TEST" => Some(AdKind::Test),
            _ => None,
        }
    }
}

/// Campaign lifecycle status. Never auto-transitioned by date — EndingSoon
/// and Ended are set by an operator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdStatus {
    Waiting,
    Active,
    Error,
    EndingSoon,
    Ended,
}

impl AdStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdStatus::Waiting => "WAITING",
            AdStatus::Active => "ACTIVE",
            AdStatus::Error => "ERROR",
            AdStatus::EndingSoon => "ENDING_SOON",
            AdStatus::Ended => "ENDED",
        }
    }

    pub fn parse(s: &str) -> Option<AdStatus> {
        match s {
            "WAITING" => Some(AdStatus::Waiting),
            "ACTIVE" => Some(AdStatus::Active),
            "ERROR" => Some(AdStatus::Error),
            "ENDING_SOON" => Some(AdStatus::EndingSoon),
            "ENDED" => Some(AdStatus::Ended),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ad {
    pub id: Uuid,
    /// Always equals the advertiser's organization at creation time.
    pub organization_id: Uuid,
    pub advertiser_id: Uuid,
    pub kind: AdKind,
    pub status: AdStatus,
    pub keyword: Option<String>,
    /// Exposure rank, admin-set.
    pub rank: Option<i64>,
    pub product_name: Option<String>,
    pub product_link: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub working_days: i64,
    pub start_date: NaiveDate,
    /// Derived: `start_date + working_days` days. Kept consistent by the
    /// lifecycle rules on every schedule change.
    pub end_date: NaiveDate,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAd {
    pub organization_id: Uuid,
    pub advertiser_id: Uuid,
    pub kind: AdKind,
    pub status: AdStatus,
    pub keyword: Option<String>,
    pub product_name: Option<String>,
    pub product_link: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub working_days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Writable ad fields. `end_date` is not caller-supplied; the service sets
/// it whenever `start_date` or `working_days` changes so the recomputation
/// lands in the same store update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAd {
    pub status: Option<AdStatus>,
    pub rank: Option<i64>,
    pub quantity: Option<i64>,
    pub keyword: Option<String>,
    pub product_name: Option<String>,
    pub product_link: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub working_days: Option<i64>,
    pub end_date: Option<NaiveDate>,
}

impl UpdateAd {
    pub fn is_empty(&self) -> bool {
        self.status.is_none()
            && self.rank.is_none()
            && self.quantity.is_none()
            && self.keyword.is_none()
            && self.product_name.is_none()
            && self.product_link.is_none()
            && self.start_date.is_none()
            && self.working_days.is_none()
            && self.end_date.is_none()
    }
}
