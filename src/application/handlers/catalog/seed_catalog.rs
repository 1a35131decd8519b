//! SeedCatalogHandler - first-run population of trainers and plans.
//!
//! Idempotent: a collection that already holds documents is left untouched.
//! A write-protected catalog is not an error; deployments that manage the
//! catalog externally run this as a no-op.

use std::sync::Arc;

use crate::domain::catalog::{seed, PLANS, TRAINERS};
use crate::ports::{DocumentStore, Query, StoreError};

/// What the seeding run inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SeedReport {
    pub trainers_inserted: usize,
    pub plans_inserted: usize,
}

/// Handler populating the catalog collections with their defaults.
pub struct SeedCatalogHandler {
    store: Arc<dyn DocumentStore>,
}

impl SeedCatalogHandler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn handle(&self) -> Result<SeedReport, StoreError> {
        let trainers_inserted = self.seed_collection(TRAINERS, seed::default_trainers()).await?;
        let plans_inserted = self.seed_collection(PLANS, seed::default_plans()).await?;
        Ok(SeedReport {
            trainers_inserted,
            plans_inserted,
        })
    }

    async fn seed_collection(
        &self,
        collection: &str,
        defaults: Vec<serde_json::Value>,
    ) -> Result<usize, StoreError> {
        let existing = self
            .store
            .query(&Query::collection(collection).limit(1))
            .await?;
        if !existing.is_empty() {
            tracing::debug!(collection, "collection already populated, skipping seed");
            return Ok(0);
        }

        let mut inserted = 0;
        for data in defaults {
            match self.store.insert(collection, data).await {
                Ok(_) => inserted += 1,
                Err(StoreError::PermissionDenied(_)) => {
                    tracing::warn!(collection, "seeding not permitted, leaving collection empty");
                    return Ok(inserted);
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(collection, inserted, "seeded default catalog documents");
        Ok(inserted)
    }
}
