//! Integration tests for the User and Organization repositories using
//! in-memory SurrealDB.

use adback_core::models::organization::CreateOrganization;
use adback_core::models::user::{CreateUser, Role, UpdateUser};
use adback_core::repository::{
    AccountScope, OrganizationRepository, Pagination, UserFilter, UserRepository,
};
use adback_db::repository::{SurrealOrganizationRepository, SurrealUserRepository};
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    adback_db::run_migrations(&db).await.unwrap();
    db
}

fn new_user(username: &str, role: Role, organization_id: Option<Uuid>) -> CreateUser {
    CreateUser {
        username: username.into(),
        password_hash: "$argon2id$fake-hash".into(),
        nickname: username.to_uppercase(),
        role,
        organization_id,
        memo: None,
    }
}

#[tokio::test]
async fn create_and_get_user() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let org_id = Uuid::new_v4();
    let user = repo
        .create(new_user("alice", Role::Agency, Some(org_id)))
        .await
        .unwrap();

    assert_eq!(user.username, "alice");
    assert_eq!(user.role, Role::Agency);
    assert_eq!(user.organization_id, Some(org_id));
    assert!(user.memo.is_none());

    let fetched = repo.get_by_id(user.id).await.unwrap();
    assert_eq!(fetched.id, user.id);
    assert_eq!(fetched.username, "alice");
}

#[tokio::test]
async fn get_user_by_username() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("bob", Role::Master, None))
        .await
        .unwrap();

    let fetched = repo.get_by_username("bob").await.unwrap();
    assert_eq!(fetched.id, user.id);

    let missing = repo.get_by_username("nobody").await;
    assert!(missing.is_err());
}

#[tokio::test]
async fn get_many_skips_missing_ids() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let a = repo
        .create(new_user("carol", Role::Master, None))
        .await
        .unwrap();
    let b = repo
        .create(new_user("dave", Role::Master, None))
        .await
        .unwrap();

    let found = repo
        .get_many(vec![a.id, Uuid::new_v4(), b.id])
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
}

#[tokio::test]
async fn update_user_fields() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let user = repo
        .create(new_user("erin", Role::Advertiser, Some(Uuid::new_v4())))
        .await
        .unwrap();

    let updated = repo
        .update(
            user.id,
            UpdateUser {
                nickname: Some("Erin the Second".into()),
                memo: Some(Some("priority client".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.nickname, "Erin the Second");
    assert_eq!(updated.memo.as_deref(), Some("priority client"));
    assert_eq!(updated.username, "erin"); // unchanged
    assert_eq!(updated.role, Role::Advertiser); // unchanged

    // Some(None) clears the memo.
    let cleared = repo
        .update(
            user.id,
            UpdateUser {
                memo: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(cleared.memo.is_none());
}

#[tokio::test]
async fn duplicate_username_rejected() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    repo.create(new_user("unique", Role::Master, None))
        .await
        .unwrap();

    let result = repo.create(new_user("unique", Role::Master, None)).await;
    assert!(result.is_err(), "duplicate username should be rejected");
}

#[tokio::test]
async fn list_scoped_to_organization() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let org_a = Uuid::new_v4();
    let org_b = Uuid::new_v4();
    repo.create(new_user("agency-a", Role::Agency, Some(org_a)))
        .await
        .unwrap();
    repo.create(new_user("adv-a", Role::Advertiser, Some(org_a)))
        .await
        .unwrap();
    repo.create(new_user("agency-b", Role::Agency, Some(org_b)))
        .await
        .unwrap();

    let page = repo
        .list(
            AccountScope::Organization(org_a),
            None,
            Pagination::default(),
        )
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(
        page.items
            .iter()
            .all(|u| u.organization_id == Some(org_a))
    );
}

#[tokio::test]
async fn list_agencies_and_self_scope() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let org = Uuid::new_v4();
    let agency = repo
        .create(new_user("agency", Role::Agency, Some(org)))
        .await
        .unwrap();
    let me = repo
        .create(new_user("me", Role::Advertiser, Some(org)))
        .await
        .unwrap();
    // Same org but another advertiser: must stay invisible.
    repo.create(new_user("peer", Role::Advertiser, Some(org)))
        .await
        .unwrap();

    let page = repo
        .list(
            AccountScope::AgenciesAndSelf {
                organization_id: org,
                user_id: me.id,
            },
            None,
            Pagination::default(),
        )
        .await
        .unwrap();

    assert_eq!(page.total, 2);
    let ids: Vec<Uuid> = page.items.iter().map(|u| u.id).collect();
    assert!(ids.contains(&agency.id));
    assert!(ids.contains(&me.id));
}

#[tokio::test]
async fn list_self_only_scope() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let me = repo
        .create(new_user("orphan", Role::Advertiser, None))
        .await
        .unwrap();
    repo.create(new_user("other", Role::Master, None))
        .await
        .unwrap();

    let page = repo
        .list(AccountScope::SelfOnly(me.id), None, Pagination::default())
        .await
        .unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].id, me.id);
}

#[tokio::test]
async fn list_with_role_filter_and_pagination() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let org = Uuid::new_v4();
    for i in 0..5 {
        repo.create(new_user(
            &format!("adv-{i}"),
            Role::Advertiser,
            Some(org),
        ))
        .await
        .unwrap();
    }
    repo.create(new_user("agency", Role::Agency, Some(org)))
        .await
        .unwrap();

    let page1 = repo
        .list(
            AccountScope::All,
            Some(Role::Advertiser),
            Pagination {
                offset: 0,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page1.total, 5);
    assert_eq!(page1.items.len(), 3);

    let page2 = repo
        .list(
            AccountScope::All,
            Some(Role::Advertiser),
            Pagination {
                offset: 3,
                limit: 3,
            },
        )
        .await
        .unwrap();
    assert_eq!(page2.items.len(), 2);
}

#[tokio::test]
async fn list_roles_covers_whole_scope() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let org = Uuid::new_v4();
    repo.create(new_user("m", Role::Master, None))
        .await
        .unwrap();
    repo.create(new_user("g", Role::Agency, Some(org)))
        .await
        .unwrap();
    repo.create(new_user("v1", Role::Advertiser, Some(org)))
        .await
        .unwrap();
    repo.create(new_user("v2", Role::Advertiser, Some(org)))
        .await
        .unwrap();

    let roles = repo.list_roles(AccountScope::All).await.unwrap();
    assert_eq!(roles.len(), 4);
    assert_eq!(
        roles.iter().filter(|r| **r == Role::Advertiser).count(),
        2
    );

    let org_roles = repo
        .list_roles(AccountScope::Organization(org))
        .await
        .unwrap();
    assert_eq!(org_roles.len(), 3);
}

#[tokio::test]
async fn count_with_filters() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let org = Uuid::new_v4();
    let a = repo
        .create(new_user("g1", Role::Agency, Some(org)))
        .await
        .unwrap();
    repo.create(new_user("g2", Role::Agency, Some(org)))
        .await
        .unwrap();
    repo.create(new_user("v", Role::Advertiser, Some(org)))
        .await
        .unwrap();

    // Sibling agencies: same org, same role, excluding one id.
    let siblings = repo
        .count(UserFilter {
            organization_id: Some(org),
            role: Some(Role::Agency),
            exclude_id: Some(a.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(siblings, 1);

    let by_ids = repo
        .count(UserFilter {
            ids: Some(vec![a.id, Uuid::new_v4()]),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_ids, 1);
}

#[tokio::test]
async fn list_masters_and_organization_members() {
    let db = setup().await;
    let repo = SurrealUserRepository::new(db);

    let org = Uuid::new_v4();
    repo.create(new_user("m1", Role::Master, None))
        .await
        .unwrap();
    repo.create(new_user("m2", Role::Master, None))
        .await
        .unwrap();
    repo.create(new_user("g", Role::Agency, Some(org)))
        .await
        .unwrap();
    repo.create(new_user("v", Role::Advertiser, Some(org)))
        .await
        .unwrap();

    let masters = repo.list_masters().await.unwrap();
    assert_eq!(masters.len(), 2);
    assert!(masters.iter().all(|u| u.role == Role::Master));

    let members = repo.list_organization_members(org).await.unwrap();
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn organization_crud_and_uniqueness() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let master_id = Uuid::new_v4();
    let org = repo
        .create(CreateOrganization {
            name: "Acme Media".into(),
            master_id: Some(master_id),
        })
        .await
        .unwrap();
    assert_eq!(org.name, "Acme Media");
    assert_eq!(org.master_id, Some(master_id));

    let fetched = repo.get_by_id(org.id).await.unwrap();
    assert_eq!(fetched.id, org.id);

    let by_name = repo.get_by_name("Acme Media").await.unwrap();
    assert_eq!(by_name.id, org.id);

    let duplicate = repo
        .create(CreateOrganization {
            name: "Acme Media".into(),
            master_id: None,
        })
        .await;
    assert!(duplicate.is_err(), "duplicate name should be rejected");
}

#[tokio::test]
async fn organization_list_and_count_by_master() {
    let db = setup().await;
    let repo = SurrealOrganizationRepository::new(db);

    let master_a = Uuid::new_v4();
    let master_b = Uuid::new_v4();
    repo.create(CreateOrganization {
        name: "Beta".into(),
        master_id: Some(master_a),
    })
    .await
    .unwrap();
    repo.create(CreateOrganization {
        name: "Alpha".into(),
        master_id: Some(master_a),
    })
    .await
    .unwrap();
    repo.create(CreateOrganization {
        name: "Gamma".into(),
        master_id: Some(master_b),
    })
    .await
    .unwrap();

    let all = repo.list(None).await.unwrap();
    assert_eq!(all.len(), 3);
    // Name-ordered.
    assert_eq!(all[0].name, "Alpha");
    assert_eq!(all[1].name, "Beta");

    let mine = repo.list(Some(master_a)).await.unwrap();
    assert_eq!(mine.len(), 2);

    assert_eq!(repo.count_by_master(master_a).await.unwrap(), 2);
    assert_eq!(repo.count_by_master(master_b).await.unwrap(), 1);
    assert_eq!(repo.count_by_master(Uuid::new_v4()).await.unwrap(), 0);
}
