use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use eventdesk_server::{
    build_router,
    config::{AppConfig, DatabaseType, StorageType},
    db::{Database, InMemoryDatabase, MongoDatabase},
    storage::{InMemoryStorage, LocalFileStorage, Storage},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    let db: Arc<dyn Database> = match config.database_type {
        DatabaseType::Memory => {
            tracing::warn!("using in-memory database, data is lost on restart");
            Arc::new(InMemoryDatabase::new())
        }
        DatabaseType::Mongo => Arc::new(
            MongoDatabase::connect(&config.mongo_uri, &config.database_name)
                .await
                .context("failed to connect to MongoDB")?,
        ),
    };

    let storage: Arc<dyn Storage> = match config.storage_type {
        StorageType::Memory => Arc::new(InMemoryStorage::new()),
        StorageType::Local => Arc::new(
            LocalFileStorage::new(config.upload_dir.clone())
                .context("failed to initialize upload directory")?,
        ),
    };

    let app = build_router(db, storage, config.max_upload_bytes);

    let addr = config.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server running on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
