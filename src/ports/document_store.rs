//! Document store port - the transactional persistence contract.
//!
//! Abstracts a transactional document database: point reads, predicate
//! queries (equality/range filters plus ordering and limit), and an atomic
//! read-modify-write transaction primitive with optimistic conflict
//! detection. Both the in-memory adapter and the Postgres adapter implement
//! this contract with identical semantics, so handlers and tests are
//! interchangeable across backings.
//!
//! # Transaction contract
//!
//! - Every `get`/`query` issued through a [`DocumentTransaction`] records
//!   what was read (document versions, query result fingerprints).
//! - `create`/`update` stage writes; staged writes are NOT visible to the
//!   transaction's own subsequent reads, so callers must finish reading
//!   before the first write.
//! - `commit` re-validates every recorded read and applies all staged writes
//!   atomically, or fails with [`StoreError::Conflict`] having applied
//!   nothing. A dropped transaction applies nothing.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::cmp::Ordering;
use thiserror::Error;
use tokio::sync::mpsc;

/// Errors surfaced by document store adapters.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A concurrent writer touched documents this transaction read.
    /// Retrying the whole transaction with fresh reads is safe.
    #[error("transaction conflict: a concurrent writer invalidated this transaction's reads")]
    Conflict,

    /// The target document of a blind update does not exist.
    #[error("document '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    /// The store rejected a write for lack of permission.
    #[error("write permission denied for collection '{0}'")]
    PermissionDenied(String),

    /// The backing store could not be reached or failed internally.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A document could not be encoded or decoded.
    #[error("document serialization failed: {0}")]
    Serialization(String),
}

impl StoreError {
    /// Whether retrying the same operation may succeed without new input.
    pub fn is_retryable(&self) -> bool {
        matches!(self, StoreError::Conflict | StoreError::Unavailable(_))
    }
}

/// A document as read from the store: id, payload, and version.
///
/// The version increases monotonically on every committed write to the
/// document and drives optimistic conflict detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub version: u64,
    pub data: Value,
}

impl Document {
    /// Deserializes the payload into a typed domain value.
    pub fn deserialize<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Sort direction for query ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A single field predicate.
///
/// Range filters compare strings lexicographically and numbers numerically;
/// timestamps are persisted as RFC 3339 strings precisely so that the string
/// order is the chronological order.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    Eq(String, Value),
    Gte(String, Value),
    Lte(String, Value),
}

/// A predicate query over one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: String,
    pub filters: Vec<Filter>,
    pub order_by: Option<(String, Direction)>,
    pub limit: Option<usize>,
}

impl Query {
    /// Starts a query over the given collection.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            collection: name.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    pub fn filter_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.into(), value.into()));
        self
    }

    pub fn filter_gte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Gte(field.into(), value.into()));
        self
    }

    pub fn filter_lte(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Lte(field.into(), value.into()));
        self
    }

    pub fn order_by(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by = Some((field.into(), direction));
        self
    }

    pub fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }
}

/// Compares two JSON scalars for range filtering and ordering.
///
/// Returns `None` for mixed or non-scalar types; a filter that cannot
/// compare excludes the document.
pub fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::Bool(x), Value::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// An open optimistic transaction against the store.
///
/// All reads must precede the first staged write; commit consumes the
/// transaction.
#[async_trait]
pub trait DocumentTransaction: Send {
    /// Point read; records the document version (or its absence) for
    /// commit-time validation.
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Predicate query; records the result set fingerprint so that a
    /// concurrent insert/update matching the query conflicts the commit.
    async fn query(&mut self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Stages creation of a new document and returns its assigned id.
    ///
    /// The store assigns a `created_at` timestamp at commit if the payload
    /// does not carry one.
    fn create(&mut self, collection: &str, data: Value) -> String;

    /// Stages a shallow field merge into an existing document.
    fn update(&mut self, collection: &str, id: &str, patch: Value);

    /// Validates all recorded reads and applies all staged writes
    /// atomically, or fails with `StoreError::Conflict` applying nothing.
    async fn commit(self: Box<Self>) -> Result<(), StoreError>;
}

/// Live query subscription delivering full snapshots.
///
/// A snapshot of the current result set is delivered on registration and
/// after every committed change that affects the query. Dropping or
/// unsubscribing stops delivery; no snapshot is observable afterwards.
pub struct Subscription {
    rx: mpsc::UnboundedReceiver<Vec<Document>>,
}

impl Subscription {
    pub fn new(rx: mpsc::UnboundedReceiver<Vec<Document>>) -> Self {
        Self { rx }
    }

    /// Waits for the next snapshot; `None` once the store side shut down.
    pub async fn next_snapshot(&mut self) -> Option<Vec<Document>> {
        self.rx.recv().await
    }

    /// Stops delivery. Pending undelivered snapshots are discarded.
    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}

/// Transactional document database contract.
///
/// Injected into handlers as `Arc<dyn DocumentStore>` so tests can
/// substitute the in-memory adapter for the persistent one.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Point read outside any transaction.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Creates a document with a store-assigned id, returning the id.
    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError>;

    /// Creates or overwrites a document under a caller-chosen id.
    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError>;

    /// Shallow field merge into an existing document.
    ///
    /// Fails with `StoreError::NotFound` if the document does not exist.
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    /// Predicate query outside any transaction. Non-authoritative under
    /// concurrency; only in-transaction reads may gate a write.
    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError>;

    /// Opens an optimistic transaction.
    async fn begin(&self) -> Result<Box<dyn DocumentTransaction>, StoreError>;

    /// Registers a live query delivering full snapshots on every change.
    async fn watch(&self, query: Query) -> Result<Subscription, StoreError>;
}
