//! In-memory adapters for tests and local tooling.

mod document_store;

pub use document_store::MemoryDocumentStore;
