//! Advertisement management service.
//!
//! Bulk registration on behalf of an advertiser, masked updates with
//! derived end dates, scope-filtered deletion, and role-scoped listings
//! with kind/status stats.

use std::collections::HashMap;

use adback_core::error::{AdbackError, AdbackResult};
use adback_core::lifecycle;
use adback_core::models::ad::{Ad, AdKind, AdStatus, CreateAd, UpdateAd};
use adback_core::models::identity::Identity;
use adback_core::models::user::Role;
use adback_core::policy;
use adback_core::repository::{AdRepository, Pagination, UserRepository};
use adback_core::stats::{AdStats, ad_stats};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

/// Ads per listing page.
pub const AD_PAGE_SIZE: u64 = 10;

/// Longest allowed search keyword.
pub const MAX_KEYWORD_LENGTH: usize = 10;

/// An ad row enriched for display.
#[derive(Debug, Clone, Serialize)]
pub struct AdView {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub advertiser_id: Uuid,
    pub advertiser_username: Option<String>,
    pub kind: AdKind,
    pub status: AdStatus,
    pub keyword: Option<String>,
    pub rank: Option<i64>,
    pub product_name: Option<String>,
    pub product_link: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub working_days: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    /// Days left until the end date, floored at zero. Derived, never stored.
    pub remaining_days: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// One page of ads plus scope-wide stats.
#[derive(Debug, Serialize)]
pub struct AdListOutput {
    pub ads: Vec<AdView>,
    pub stats: AdStats,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
}

/// One campaign draft in a bulk registration.
#[derive(Debug, Clone)]
pub struct AdDraft {
    pub keyword: Option<String>,
    pub product_name: Option<String>,
    pub product_link: Option<String>,
    pub product_id: Option<String>,
    pub quantity: Option<i64>,
    pub working_days: i64,
    pub start_date: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CreateAdsOutput {
    pub ads: Vec<AdView>,
    pub count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAdInput {
    pub status: Option<AdStatus>,
    pub rank: Option<i64>,
    pub quantity: Option<i64>,
    pub keyword: Option<String>,
    pub product_name: Option<String>,
    pub product_link: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub working_days: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct DeleteAdsOutput {
    pub deleted_count: u64,
}

fn validate_keyword(keyword: Option<&str>) -> AdbackResult<()> {
    if let Some(k) = keyword {
        if k.chars().count() > MAX_KEYWORD_LENGTH {
            return Err(AdbackError::validation(format!(
                "keyword must be at most {MAX_KEYWORD_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

fn validate_product_link(link: Option<&str>) -> AdbackResult<()> {
    if let Some(l) = link {
        if !(l.starts_with("http://") || l.starts_with("https://")) {
            return Err(AdbackError::validation(
                "product link must start with http:// or https://",
            ));
        }
    }
    Ok(())
}

fn validate_working_days(days: i64) -> AdbackResult<()> {
    if days < 1 {
        return Err(AdbackError::validation("working days must be at least 1"));
    }
    Ok(())
}

/// Advertisement service, generic over its repositories.
pub struct AdService<A: AdRepository, U: UserRepository> {
    ads: A,
    users: U,
}

impl<A: AdRepository, U: UserRepository> AdService<A, U> {
    pub fn new(ads: A, users: U) -> Self {
        Self { ads, users }
    }

    /// One page of the caller's visible ads, plus stats over the whole
    /// visible scope. The status/kind filters never change the stats.
    pub async fn list_ads(
        &self,
        identity: &Identity,
        status_filter: Option<AdStatus>,
        kind_filter: Option<AdKind>,
        page: u64,
    ) -> AdbackResult<AdListOutput> {
        let scope = policy::ad_read_scope(identity);

        let kind_status = self.ads.list_kind_status(scope).await?;
        let stats = ad_stats(&kind_status);

        let page = page.max(1);
        let result = self
            .ads
            .list(
                scope,
                status_filter,
                kind_filter,
                Pagination {
                    offset: (page - 1) * AD_PAGE_SIZE,
                    limit: AD_PAGE_SIZE,
                },
            )
            .await?;
        let ads = self.build_views(result.items).await?;

        Ok(AdListOutput {
            ads,
            stats,
            total: result.total,
            page,
            page_size: AD_PAGE_SIZE,
        })
    }

    /// Register a batch of campaigns for one advertiser.
    ///
    /// The batch lands atomically: a validation failure anywhere rejects
    /// all drafts. Every new campaign starts in `Waiting` with the
    /// advertiser's organization and a derived end date.
    pub async fn create_ads(
        &self,
        identity: &Identity,
        advertiser_id: Uuid,
        kind: AdKind,
        drafts: Vec<AdDraft>,
    ) -> AdbackResult<CreateAdsOutput> {
        // Existence before ownership.
        let advertiser = self.users.get_by_id(advertiser_id).await?;
        if advertiser.role != Role::Advertiser {
            return Err(AdbackError::validation(
                "target account is not an advertiser",
            ));
        }
        policy::authorize_ad_creation(identity, &advertiser)?;

        let organization_id = advertiser
            .organization_id
            .ok_or_else(|| AdbackError::validation("advertiser has no organization"))?;

        if drafts.is_empty() {
            return Err(AdbackError::validation("no ads to register"));
        }

        let mut inputs = Vec::with_capacity(drafts.len());
        for draft in drafts {
            validate_working_days(draft.working_days)?;
            validate_keyword(draft.keyword.as_deref())?;
            validate_product_link(draft.product_link.as_deref())?;

            inputs.push(CreateAd {
                organization_id,
                advertiser_id,
                kind,
                status: AdStatus::Waiting,
                keyword: draft.keyword,
                product_name: draft.product_name,
                product_link: draft.product_link,
                product_id: draft.product_id,
                quantity: draft.quantity,
                working_days: draft.working_days,
                start_date: draft.start_date,
                end_date: lifecycle::end_date(draft.start_date, draft.working_days),
            });
        }

        let created = self.ads.create_many(inputs).await?;
        let count = created.len();

        info!(
            advertiser = %advertiser.username,
            kind = kind.as_str(),
            count,
            created_by = %identity.username,
            "Ads registered"
        );

        Ok(CreateAdsOutput {
            ads: self.build_views(created).await?,
            count,
        })
    }

    /// Update one ad, masked per the caller's role. Any schedule change
    /// recomputes the end date in the same store update.
    pub async fn update_ad(
        &self,
        identity: &Identity,
        target_id: Uuid,
        input: UpdateAdInput,
    ) -> AdbackResult<AdView> {
        let ad = self.ads.get_by_id(target_id).await?;
        policy::authorize_ad_update(identity, &ad)?;

        let update = UpdateAd {
            status: input.status,
            rank: input.rank,
            quantity: input.quantity,
            keyword: input.keyword,
            product_name: input.product_name,
            product_link: input.product_link,
            start_date: input.start_date,
            working_days: input.working_days,
            end_date: None,
        };
        let masked = policy::mask_ad_update(identity.role, update);

        validate_keyword(masked.keyword.as_deref())?;
        validate_product_link(masked.product_link.as_deref())?;
        if let Some(days) = masked.working_days {
            validate_working_days(days)?;
        }

        if masked.is_empty() {
            return Err(AdbackError::validation("no fields to update"));
        }

        let folded = lifecycle::apply_schedule_change(&ad, masked);
        let updated = self.ads.update(target_id, folded).await?;

        let mut views = self.build_views(vec![updated]).await?;
        Ok(views.remove(0))
    }

    /// Delete ads by id, restricted to the caller's delete scope. Ids
    /// outside the scope are silently dropped; partial match is not an
    /// error.
    pub async fn delete_ads(
        &self,
        identity: &Identity,
        ids: Vec<Uuid>,
    ) -> AdbackResult<DeleteAdsOutput> {
        policy::authorize_ad_deletion(identity)?;
        if ids.is_empty() {
            return Err(AdbackError::validation("no ads selected"));
        }

        let filter = policy::ad_delete_filter(identity, ids);
        let deleted_count = self.ads.delete_where(filter).await?;

        info!(deleted_count, deleted_by = %identity.username, "Ads deleted");

        Ok(DeleteAdsOutput { deleted_count })
    }

    async fn build_views(&self, ads: Vec<Ad>) -> AdbackResult<Vec<AdView>> {
        let mut advertiser_ids: Vec<Uuid> = ads.iter().map(|ad| ad.advertiser_id).collect();
        advertiser_ids.sort_unstable();
        advertiser_ids.dedup();
        let advertisers = self.users.get_many(advertiser_ids).await?;
        let usernames: HashMap<Uuid, String> = advertisers
            .into_iter()
            .map(|u| (u.id, u.username))
            .collect();

        let today = Utc::now().date_naive();
        let views = ads
            .into_iter()
            .map(|ad| AdView {
                id: ad.id,
                organization_id: ad.organization_id,
                advertiser_username: usernames.get(&ad.advertiser_id).cloned(),
                advertiser_id: ad.advertiser_id,
                kind: ad.kind,
                status: ad.status,
                keyword: ad.keyword,
                rank: ad.rank,
                product_name: ad.product_name,
                product_link: ad.product_link,
                product_id: ad.product_id,
                quantity: ad.quantity,
                working_days: ad.working_days,
                start_date: ad.start_date,
                remaining_days: lifecycle::remaining_days(ad.end_date, today),
                end_date: ad.end_date,
                created_at: ad.created_at,
                updated_at: ad.updated_at,
            })
            .collect();

        Ok(views)
    }
}
