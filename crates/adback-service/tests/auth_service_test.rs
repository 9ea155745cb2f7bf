//! Integration tests for the login service using in-memory SurrealDB.

use adback_core::error::AdbackError;
use adback_core::models::user::{CreateUser, Role};
use adback_core::repository::UserRepository;
use adback_db::repository::SurrealUserRepository;
use adback_service::ServiceConfig;
use adback_service::auth::AuthService;
use adback_service::password;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

fn test_config() -> ServiceConfig {
    ServiceConfig {
        jwt_secret: "test-secret".into(),
        ..Default::default()
    }
}

async fn setup() -> Surreal<surrealdb::engine::local::Db> {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    adback_db::run_migrations(&db).await.unwrap();
    db
}

async fn seed_user(db: &Surreal<surrealdb::engine::local::Db>, username: &str, pw: &str) {
    let repo = SurrealUserRepository::new(db.clone());
    repo.create(CreateUser {
        username: username.into(),
        password_hash: password::hash_password(pw, None).unwrap(),
        nickname: username.to_uppercase(),
        role: Role::Master,
        organization_id: None,
        memo: None,
    })
    .await
    .unwrap();
}

#[tokio::test]
async fn login_issues_a_verifiable_token() {
    let db = setup().await;
    seed_user(&db, "admin", "TopSecret99!").await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());

    let output = service.login("admin", "TopSecret99!").await.unwrap();
    assert_eq!(output.identity.username, "admin");
    assert_eq!(output.identity.role, Role::Master);
    assert_eq!(output.expires_in, ServiceConfig::default().session_lifetime_secs);

    let identity = service.verify(&output.token).unwrap();
    assert_eq!(identity.id, output.identity.id);
    assert_eq!(identity.role, Role::Master);
    assert!(identity.organization_id.is_none());
}

#[tokio::test]
async fn wrong_password_and_unknown_username_are_indistinguishable() {
    let db = setup().await;
    seed_user(&db, "admin", "TopSecret99!").await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());

    let bad_password = service.login("admin", "WrongPassword").await;
    let unknown_user = service.login("ghost", "TopSecret99!").await;

    for result in [bad_password, unknown_user] {
        match result {
            Err(AdbackError::AuthenticationFailed { reason }) => {
                assert_eq!(reason, "invalid username or password");
            }
            other => panic!("expected AuthenticationFailed, got {other:?}"),
        }
    }
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let db = setup().await;
    let service = AuthService::new(SurrealUserRepository::new(db), test_config());

    assert!(matches!(
        service.verify("not-a-jwt"),
        Err(AdbackError::AuthenticationFailed { .. })
    ));
}
