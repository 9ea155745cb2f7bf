//! Integration tests for the notice service using in-memory SurrealDB.

use adback_core::error::AdbackError;
use adback_core::models::identity::Identity;
use adback_core::models::notice::UpdateNotice;
use adback_core::models::user::Role;
use adback_db::repository::SurrealNoticeRepository;
use adback_service::notice::NoticeService;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;
use uuid::Uuid;

async fn setup() -> NoticeService<SurrealNoticeRepository<surrealdb::engine::local::Db>> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    adback_db::run_migrations(&db).await.unwrap();
    NoticeService::new(SurrealNoticeRepository::new(db))
}

fn identity(role: Role) -> Identity {
    Identity {
        id: Uuid::new_v4(),
        username: "caller".into(),
        role,
        organization_id: match role {
            Role::Master => None,
            _ => Some(Uuid::new_v4()),
        },
    }
}

#[tokio::test]
async fn master_manages_notices_and_everyone_reads() {
    let service = setup().await;
    let master = identity(Role::Master);
    let advertiser = identity(Role::Advertiser);

    let notice = service
        .create(&master, "Maintenance window", "Down on Sunday 02:00-04:00.")
        .await
        .unwrap();
    assert_eq!(notice.view_count, 0);

    // Reads increment the view count, whoever reads.
    let read1 = service.read(&advertiser, notice.id).await.unwrap();
    assert_eq!(read1.view_count, 1);
    let read2 = service.read(&master, notice.id).await.unwrap();
    assert_eq!(read2.view_count, 2);

    // Edit reads do not.
    let edit = service.read_for_edit(&master, notice.id).await.unwrap();
    assert_eq!(edit.view_count, 2);

    let page = service.list(&advertiser, 1).await.unwrap();
    assert_eq!(page.total, 1);
    assert_eq!(page.items[0].title, "Maintenance window");
}

#[tokio::test]
async fn only_master_writes() {
    let service = setup().await;
    let master = identity(Role::Master);
    let agency = identity(Role::Agency);

    let notice = service.create(&master, "Title", "Body").await.unwrap();

    assert!(matches!(
        service.create(&agency, "Nope", "Nope").await,
        Err(AdbackError::AuthorizationDenied { .. })
    ));
    assert!(matches!(
        service
            .update(
                &agency,
                notice.id,
                UpdateNotice {
                    title: Some("Hijacked".into()),
                    content: None,
                },
            )
            .await,
        Err(AdbackError::AuthorizationDenied { .. })
    ));
    assert!(matches!(
        service.delete(&agency, notice.id).await,
        Err(AdbackError::AuthorizationDenied { .. })
    ));
    assert!(matches!(
        service.read_for_edit(&agency, notice.id).await,
        Err(AdbackError::AuthorizationDenied { .. })
    ));
}

#[tokio::test]
async fn update_and_delete_roundtrip() {
    let service = setup().await;
    let master = identity(Role::Master);

    let notice = service.create(&master, "Old title", "Old body").await.unwrap();

    let updated = service
        .update(
            &master,
            notice.id,
            UpdateNotice {
                title: Some("New title".into()),
                content: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.title, "New title");
    assert_eq!(updated.content, "Old body");

    service.delete(&master, notice.id).await.unwrap();
    assert!(matches!(
        service.read(&master, notice.id).await,
        Err(AdbackError::NotFound { .. })
    ));
}

#[tokio::test]
async fn validation_errors() {
    let service = setup().await;
    let master = identity(Role::Master);

    assert!(matches!(
        service.create(&master, "  ", "Body").await,
        Err(AdbackError::Validation { .. })
    ));
    assert!(matches!(
        service.create(&master, "Title", "").await,
        Err(AdbackError::Validation { .. })
    ));

    let notice = service.create(&master, "Title", "Body").await.unwrap();
    assert!(matches!(
        service
            .update(&master, notice.id, UpdateNotice::default())
            .await,
        Err(AdbackError::Validation { .. })
    ));

    // A dangling id is NotFound, not a crash.
    assert!(matches!(
        service.read(&master, Uuid::new_v4()).await,
        Err(AdbackError::NotFound { .. })
    ));
    assert!(matches!(
        service.delete(&master, Uuid::new_v4()).await,
        Err(AdbackError::NotFound { .. })
    ));
}
