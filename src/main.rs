//! slotbook-seed - provisions the document table and the default catalog.
//!
//! Connects to Postgres using the configured pool, runs the schema
//! migration, and seeds trainers and plans if their collections are empty.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::EnvFilter;

use slotbook::adapters::postgres::PostgresDocumentStore;
use slotbook::application::handlers::catalog::SeedCatalogHandler;
use slotbook::config::AppConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!("connected to database");

    let store = PostgresDocumentStore::new(pool);
    store.migrate().await?;

    let report = SeedCatalogHandler::new(Arc::new(store)).handle().await?;
    tracing::info!(
        trainers = report.trainers_inserted,
        plans = report.plans_inserted,
        "seeding complete"
    );
    Ok(())
}
