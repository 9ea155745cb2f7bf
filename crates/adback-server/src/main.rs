//! ADBACK Server — Application entry point.

use adback_db::{DbConfig, DbManager, run_migrations};
use adback_service::ServiceConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("adback=info".parse().unwrap()),
        )
        .json()
        .init();

    tracing::info!("Starting ADBACK server...");

    let db_config = DbConfig::from_env();
    let _service_config = ServiceConfig::from_env();

    let manager = match DbManager::connect(&db_config).await {
        Ok(manager) => manager,
        Err(e) => {
            tracing::error!(error = %e, "Failed to connect to SurrealDB");
            std::process::exit(1);
        }
    };

    if let Err(e) = run_migrations(manager.client()).await {
        tracing::error!(error = %e, "Failed to run migrations");
        std::process::exit(1);
    }

    // TODO: Mount the HTTP transport over the account, ad, notice, and
    // auth services once the API surface lands.

    tracing::info!("ADBACK server stopped.");
}
