use std::error::Error;
use std::sync::Arc;

use contoso_hotel::config::{AppConfig, StorageBackend};
use contoso_hotel::manage::DataContext;
use contoso_hotel::storage::{MemoryStorage, PostgresStorage, Storage};
use contoso_hotel::{create_router, db, AppState};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_level(true)
        .init();

    tracing::info!("Contoso Hotel API - Starting...");

    let config = AppConfig::from_env()?;

    let storage: Arc<dyn Storage> = match &config.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on shutdown");
            Arc::new(MemoryStorage::new())
        }
        StorageBackend::Postgres(target) => {
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(target.connect_options()?, config.max_connections).await?;
            if config.run_migrations {
                db::run_migrations(&pool).await?;
            }
            Arc::new(PostgresStorage::new(pool))
        }
    };

    let app = create_router(AppState::new(DataContext::new(storage)));

    let addr = config.bind_address();
    tracing::info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Contoso Hotel API is running on http://{}", addr);
    tracing::info!("Swagger UI available at http://{}/swagger-ui", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
