//! Read-side catalog queries.

use std::sync::Arc;

use crate::domain::catalog::{Plan, Trainer, PLANS, TRAINERS};
use crate::ports::{Direction, DocumentStore, Query, StoreError};

/// Read-side queries over the trainer and plan catalog.
pub struct CatalogQueries {
    store: Arc<dyn DocumentStore>,
}

impl CatalogQueries {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Active trainers, alphabetical.
    pub async fn list_active_trainers(&self) -> Result<Vec<Trainer>, StoreError> {
        let query = Query::collection(TRAINERS)
            .filter_eq("active", true)
            .order_by("name", Direction::Ascending);
        let docs = self.store.query(&query).await?;
        docs.iter().map(Trainer::from_document).collect()
    }

    /// All plans, cheapest first.
    pub async fn list_plans(&self) -> Result<Vec<Plan>, StoreError> {
        let docs = self.store.query(&Query::collection(PLANS)).await?;
        let mut plans = docs
            .iter()
            .map(Plan::from_document)
            .collect::<Result<Vec<_>, _>>()?;
        plans.sort_by_key(|p| p.price_cents);
        Ok(plans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryDocumentStore;
    use crate::application::handlers::catalog::SeedCatalogHandler;
    use serde_json::json;

    #[tokio::test]
    async fn lists_only_active_trainers_alphabetically() {
        let store = Arc::new(MemoryDocumentStore::new());
        SeedCatalogHandler::new(store.clone()).handle().await.unwrap();
        store
            .put(
                TRAINERS,
                "retired",
                json!({"name": "Aaron Gone", "active": false}),
            )
            .await
            .unwrap();
        let queries = CatalogQueries::new(store);

        let trainers = queries.list_active_trainers().await.unwrap();
        assert_eq!(trainers.len(), 5);
        assert!(trainers.iter().all(|t| t.active));
        let names: Vec<&str> = trainers.iter().map(|t| t.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
    }

    #[tokio::test]
    async fn lists_plans_cheapest_first() {
        let store = Arc::new(MemoryDocumentStore::new());
        SeedCatalogHandler::new(store.clone()).handle().await.unwrap();
        let queries = CatalogQueries::new(store);

        let plans = queries.list_plans().await.unwrap();
        assert_eq!(plans.len(), 2);
        assert!(plans[0].price_cents <= plans[1].price_cents);
        assert_eq!(plans[0].name, "Basic Plan");
    }
}
