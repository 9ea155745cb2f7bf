//! Integration tests for the Ad repository using in-memory SurrealDB.

use adback_core::models::ad::{AdKind, AdStatus, CreateAd, UpdateAd};
use adback_core::repository::{AdFilter, AdRepository, AdScope, Pagination};
use adback_db::repository::SurrealAdRepository;
use chrono::NaiveDate;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    adback_db::run_migrations(&db).await.unwrap();
    db
}

fn new_ad(organization_id: Uuid, advertiser_id: Uuid, kind: AdKind) -> CreateAd {
    let start = NaiveDate::from_ymd_opt(2026, 8, 1).unwrap();
    CreateAd {
        organization_id,
        advertiser_id,
        kind,
        status: AdStatus::Waiting,
        keyword: Some("sneakers".into()),
        product_name: Some("Runner X".into()),
        product_link: Some("https://shop.example.com/runner-x".into()),
        product_id: Some("SKU-1".into()),
        quantity: Some(100),
        working_days: 30,
        start_date: start,
        end_date: start + chrono::Days::new(30),
    }
}

#[tokio::test]
async fn create_many_and_get() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let org = Uuid::new_v4();
    let advertiser = Uuid::new_v4();
    let ads = repo
        .create_many(vec![
            new_ad(org, advertiser, AdKind::Paid),
            new_ad(org, advertiser, AdKind::Test),
            new_ad(org, advertiser, AdKind::Paid),
        ])
        .await
        .unwrap();

    assert_eq!(ads.len(), 3);
    assert_eq!(ads[0].kind, AdKind::Paid);
    assert_eq!(ads[1].kind, AdKind::Test);
    assert!(ads.iter().all(|ad| ad.status == AdStatus::Waiting));
    assert!(ads.iter().all(|ad| ad.rank.is_none()));

    let fetched = repo.get_by_id(ads[0].id).await.unwrap();
    assert_eq!(fetched.id, ads[0].id);
    assert_eq!(
        fetched.start_date,
        NaiveDate::from_ymd_opt(2026, 8, 1).unwrap()
    );
    assert_eq!(
        fetched.end_date,
        NaiveDate::from_ymd_opt(2026, 8, 31).unwrap()
    );

    let missing = repo.get_by_id(Uuid::new_v4()).await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn create_many_empty_is_noop() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let ads = repo.create_many(Vec::new()).await.unwrap();
    assert!(ads.is_empty());
}

#[tokio::test]
async fn update_touches_only_named_fields() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let org = Uuid::new_v4();
    let advertiser = Uuid::new_v4();
    let ads = repo
        .create_many(vec![new_ad(org, advertiser, AdKind::Paid)])
        .await
        .unwrap();
    let ad = &ads[0];

    let updated = repo
        .update(
            ad.id,
            UpdateAd {
                status: Some(AdStatus::Active),
                rank: Some(3),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.status, AdStatus::Active);
    assert_eq!(updated.rank, Some(3));
    assert_eq!(updated.keyword.as_deref(), Some("sneakers")); // unchanged
    assert_eq!(updated.working_days, 30); // unchanged
}

#[tokio::test]
async fn update_schedule_fields() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let ads = repo
        .create_many(vec![new_ad(Uuid::new_v4(), Uuid::new_v4(), AdKind::Paid)])
        .await
        .unwrap();

    let new_start = NaiveDate::from_ymd_opt(2026, 9, 1).unwrap();
    let updated = repo
        .update(
            ads[0].id,
            UpdateAd {
                start_date: Some(new_start),
                working_days: Some(10),
                end_date: Some(new_start + chrono::Days::new(10)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.start_date, new_start);
    assert_eq!(updated.working_days, 10);
    assert_eq!(
        updated.end_date,
        NaiveDate::from_ymd_opt(2026, 9, 11).unwrap()
    );
}

#[tokio::test]
async fn list_scoped_and_filtered() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();
    let adv_a = Uuid::new_v4();
    let adv_b = Uuid::new_v4();

    repo.create_many(vec![
        new_ad(org_a, adv_a, AdKind::Paid),
        new_ad(org_a, adv_a, AdKind::Test),
        new_ad(org_a, adv_b, AdKind::Paid),
        new_ad(org_b, Uuid::new_v4(), AdKind::Paid),
    ])
    .await
    .unwrap();

    let org_page = repo
        .list(
            AdScope::Organization(org_a),
            None,
            None,
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(org_page.total, 3);

    let advertiser_page = repo
        .list(AdScope::Advertiser(adv_a), None, None, Pagination::default())
        .await
        .unwrap();
    assert_eq!(advertiser_page.total, 2);

    let paid_page = repo
        .list(
            AdScope::Organization(org_a),
            None,
            Some(AdKind::Paid),
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(paid_page.total, 2);

    let waiting_page = repo
        .list(
            AdScope::All,
            Some(AdStatus::Waiting),
            None,
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(waiting_page.total, 4);

    let nothing = repo
        .list(AdScope::Nothing, None, None, Pagination::default())
        .await
        .unwrap();
    assert_eq!(nothing.total, 0);
    assert!(nothing.items.is_empty());
}

#[tokio::test]
async fn list_kind_status_projection() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let org = Uuid::new_v4();
    let adv = Uuid::new_v4();
    let ads = repo
        .create_many(vec![
            new_ad(org, adv, AdKind::Paid),
            new_ad(org, adv, AdKind::Test),
        ])
        .await
        .unwrap();
    repo.update(
        ads[0].id,
        UpdateAd {
            status: Some(AdStatus::Active),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let pairs = repo
        .list_kind_status(AdScope::Organization(org))
        .await
        .unwrap();
    assert_eq!(pairs.len(), 2);
    assert!(pairs.contains(&(AdKind::Paid, AdStatus::Active)));
    assert!(pairs.contains(&(AdKind::Test, AdStatus::Waiting)));
}

#[tokio::test]
async fn count_by_advertiser() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let org = Uuid::new_v4();
    let adv = Uuid::new_v4();
    repo.create_many(vec![
        new_ad(org, adv, AdKind::Paid),
        new_ad(org, adv, AdKind::Paid),
        new_ad(org, Uuid::new_v4(), AdKind::Paid),
    ])
    .await
    .unwrap();

    assert_eq!(repo.count_by_advertiser(adv).await.unwrap(), 2);
    assert_eq!(repo.count_by_advertiser(Uuid::new_v4()).await.unwrap(), 0);
}

#[tokio::test]
async fn delete_where_reports_rows_actually_removed() {
    let db = setup().await;
    let repo = SurrealAdRepository::new(db);

    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();
    let ads = repo
        .create_many(vec![
            new_ad(org_a, Uuid::new_v4(), AdKind::Paid),
            new_ad(org_a, Uuid::new_v4(), AdKind::Paid),
            new_ad(org_b, Uuid::new_v4(), AdKind::Paid),
        ])
        .await
        .unwrap();

    // Ids spanning both orgs, constrained to org_a: only the in-org rows go.
    let deleted = repo
        .delete_where(AdFilter {
            ids: Some(vec![ads[0].id, ads[2].id]),
            organization_id: Some(org_a),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(deleted, 1);

    assert!(repo.get_by_id(ads[0].id).await.is_err());
    assert!(repo.get_by_id(ads[1].id).await.is_ok());
    assert!(repo.get_by_id(ads[2].id).await.is_ok());

    // An empty filter matches nothing rather than everything.
    let none = repo.delete_where(AdFilter::default()).await.unwrap();
    assert_eq!(none, 0);
    assert!(repo.get_by_id(ads[1].id).await.is_ok());
}
