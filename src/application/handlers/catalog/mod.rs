//! Catalog handlers: seeding and listings.

mod queries;
mod seed_catalog;

pub use queries::CatalogQueries;
pub use seed_catalog::{SeedCatalogHandler, SeedReport};
