//! Postgres-backed adapters.

mod document_store;

pub use document_store::PostgresDocumentStore;
