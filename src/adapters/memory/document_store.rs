//! In-memory document store adapter.
//!
//! Implements the full transactional contract of the `DocumentStore` port:
//! versioned documents, optimistic transactions that validate every recorded
//! read at commit, and live query snapshots. Used by tests and local tooling
//! in place of the Postgres adapter.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::{mpsc, RwLock};
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    compare_values, Direction, Document, DocumentStore, DocumentTransaction, Filter, Query,
    StoreError, Subscription,
};

#[derive(Debug, Clone)]
struct StoredDoc {
    data: Value,
    version: u64,
}

struct Watcher {
    query: Query,
    tx: mpsc::UnboundedSender<Vec<Document>>,
}

#[derive(Default)]
struct Shared {
    collections: HashMap<String, BTreeMap<String, StoredDoc>>,
    watchers: Vec<Watcher>,
    denied: HashSet<String>,
}

/// In-memory store. Cloning shares the underlying state.
#[derive(Clone)]
pub struct MemoryDocumentStore {
    shared: Arc<RwLock<Shared>>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(RwLock::new(Shared::default())),
        }
    }

    /// Rejects all subsequent writes to the collection with
    /// `StoreError::PermissionDenied`. Reads stay allowed.
    pub async fn deny_writes(&self, collection: &str) {
        self.shared.write().await.denied.insert(collection.to_string());
    }

    /// Number of documents currently held in the collection.
    pub async fn count(&self, collection: &str) -> usize {
        self.shared
            .read()
            .await
            .collections
            .get(collection)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::new()
    }
}

fn field_matches(data: &Value, filter: &Filter) -> bool {
    use std::cmp::Ordering;
    match filter {
        Filter::Eq(field, expected) => data.get(field) == Some(expected),
        Filter::Gte(field, bound) => data
            .get(field)
            .and_then(|v| compare_values(v, bound))
            .map(|o| o != Ordering::Less)
            .unwrap_or(false),
        Filter::Lte(field, bound) => data
            .get(field)
            .and_then(|v| compare_values(v, bound))
            .map(|o| o != Ordering::Greater)
            .unwrap_or(false),
    }
}

fn run_query(shared: &Shared, query: &Query) -> Vec<Document> {
    let mut results: Vec<Document> = shared
        .collections
        .get(&query.collection)
        .into_iter()
        .flatten()
        .filter(|(_, doc)| query.filters.iter().all(|f| field_matches(&doc.data, f)))
        .map(|(id, doc)| Document {
            id: id.clone(),
            version: doc.version,
            data: doc.data.clone(),
        })
        .collect();

    if let Some((field, direction)) = &query.order_by {
        results.sort_by(|a, b| {
            let ordering = match (a.data.get(field), b.data.get(field)) {
                (Some(x), Some(y)) => {
                    compare_values(x, y).unwrap_or(std::cmp::Ordering::Equal)
                }
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            match direction {
                Direction::Ascending => ordering,
                Direction::Descending => ordering.reverse(),
            }
        });
    }

    if let Some(limit) = query.limit {
        results.truncate(limit);
    }
    results
}

fn query_fingerprint(docs: &[Document]) -> Vec<(String, u64)> {
    docs.iter().map(|d| (d.id.clone(), d.version)).collect()
}

fn inject_created_at(data: &mut Value) {
    if let Value::Object(map) = data {
        map.entry("created_at")
            .or_insert_with(|| Value::String(Timestamp::now().to_rfc3339()));
    }
}

fn apply_patch(target: &mut Value, patch: Value) {
    if let (Value::Object(target), Value::Object(patch)) = (target, patch) {
        for (key, value) in patch {
            target.insert(key, value);
        }
    }
}

/// Re-runs every watcher's query and delivers fresh snapshots, dropping
/// watchers whose subscriptions were closed.
fn notify_watchers(shared: &mut Shared) {
    let state: &Shared = shared;
    let snapshots: Vec<Option<Vec<Document>>> = state
        .watchers
        .iter()
        .map(|w| {
            if w.tx.is_closed() {
                None
            } else {
                Some(run_query(state, &w.query))
            }
        })
        .collect();

    let mut kept = Vec::with_capacity(shared.watchers.len());
    for (watcher, snapshot) in shared.watchers.drain(..).zip(snapshots) {
        if let Some(snap) = snapshot {
            if watcher.tx.send(snap).is_ok() {
                kept.push(watcher);
            }
        }
    }
    shared.watchers = kept;
}

#[derive(Debug)]
enum StagedWrite {
    Create {
        collection: String,
        id: String,
        data: Value,
    },
    Update {
        collection: String,
        id: String,
        patch: Value,
    },
}

/// Optimistic transaction over the in-memory store.
///
/// Reads go against committed state and record what was seen; writes are
/// staged and applied under the write lock at commit, after every recorded
/// read has been re-validated.
struct MemoryTransaction {
    shared: Arc<RwLock<Shared>>,
    doc_reads: Vec<(String, String, Option<u64>)>,
    query_reads: Vec<(Query, Vec<(String, u64)>)>,
    staged: Vec<StagedWrite>,
}

#[async_trait]
impl DocumentTransaction for MemoryTransaction {
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let shared = self.shared.read().await;
        let found = shared
            .collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|doc| Document {
                id: id.to_string(),
                version: doc.version,
                data: doc.data.clone(),
            });
        self.doc_reads.push((
            collection.to_string(),
            id.to_string(),
            found.as_ref().map(|d| d.version),
        ));
        Ok(found)
    }

    async fn query(&mut self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let shared = self.shared.read().await;
        let docs = run_query(&shared, query);
        self.query_reads.push((query.clone(), query_fingerprint(&docs)));
        Ok(docs)
    }

    fn create(&mut self, collection: &str, data: Value) -> String {
        let id = Uuid::new_v4().to_string();
        self.staged.push(StagedWrite::Create {
            collection: collection.to_string(),
            id: id.clone(),
            data,
        });
        id
    }

    fn update(&mut self, collection: &str, id: &str, patch: Value) {
        self.staged.push(StagedWrite::Update {
            collection: collection.to_string(),
            id: id.to_string(),
            patch,
        });
    }

    async fn commit(self: Box<Self>) -> Result<(), StoreError> {
        let mut shared = self.shared.write().await;

        // Validate point reads: version unchanged, absence still absent.
        for (collection, id, seen_version) in &self.doc_reads {
            let current = shared
                .collections
                .get(collection)
                .and_then(|c| c.get(id))
                .map(|d| d.version);
            if current != *seen_version {
                return Err(StoreError::Conflict);
            }
        }

        // Validate query reads: the result set must be byte-for-byte the
        // same documents at the same versions, so a concurrent insert that
        // would have matched the query conflicts this commit.
        for (query, fingerprint) in &self.query_reads {
            let current = query_fingerprint(&run_query(&shared, query));
            if current != *fingerprint {
                return Err(StoreError::Conflict);
            }
        }

        for write in &self.staged {
            let collection = match write {
                StagedWrite::Create { collection, .. } => collection,
                StagedWrite::Update { collection, .. } => collection,
            };
            if shared.denied.contains(collection) {
                return Err(StoreError::PermissionDenied(collection.clone()));
            }
        }

        // Every update must land on a document that exists now or is
        // created earlier in this same transaction; checked up front so a
        // failing commit applies nothing.
        let mut staged_creates: HashSet<(&str, &str)> = HashSet::new();
        for write in &self.staged {
            match write {
                StagedWrite::Create { collection, id, .. } => {
                    staged_creates.insert((collection.as_str(), id.as_str()));
                }
                StagedWrite::Update { collection, id, .. } => {
                    let exists = staged_creates.contains(&(collection.as_str(), id.as_str()))
                        || shared
                            .collections
                            .get(collection)
                            .is_some_and(|c| c.contains_key(id));
                    if !exists {
                        return Err(StoreError::NotFound {
                            collection: collection.clone(),
                            id: id.clone(),
                        });
                    }
                }
            }
        }

        for write in self.staged {
            match write {
                StagedWrite::Create {
                    collection,
                    id,
                    mut data,
                } => {
                    inject_created_at(&mut data);
                    shared
                        .collections
                        .entry(collection)
                        .or_default()
                        .insert(id, StoredDoc { data, version: 1 });
                }
                StagedWrite::Update {
                    collection,
                    id,
                    patch,
                } => {
                    let doc = shared
                        .collections
                        .get_mut(&collection)
                        .and_then(|c| c.get_mut(&id))
                        .ok_or(StoreError::NotFound {
                            collection: collection.clone(),
                            id: id.clone(),
                        })?;
                    apply_patch(&mut doc.data, patch);
                    doc.version += 1;
                }
            }
        }

        notify_watchers(&mut shared);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let shared = self.shared.read().await;
        Ok(shared
            .collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|doc| Document {
                id: id.to_string(),
                version: doc.version,
                data: doc.data.clone(),
            }))
    }

    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.put(collection, &id, data).await?;
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        let mut shared = self.shared.write().await;
        if shared.denied.contains(collection) {
            return Err(StoreError::PermissionDenied(collection.to_string()));
        }
        let mut data = data;
        inject_created_at(&mut data);
        let version = shared
            .collections
            .get(collection)
            .and_then(|c| c.get(id))
            .map(|d| d.version + 1)
            .unwrap_or(1);
        shared
            .collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), StoredDoc { data, version });
        notify_watchers(&mut shared);
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let mut shared = self.shared.write().await;
        if shared.denied.contains(collection) {
            return Err(StoreError::PermissionDenied(collection.to_string()));
        }
        let doc = shared
            .collections
            .get_mut(collection)
            .and_then(|c| c.get_mut(id))
            .ok_or(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;
        apply_patch(&mut doc.data, patch);
        doc.version += 1;
        notify_watchers(&mut shared);
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let shared = self.shared.read().await;
        Ok(run_query(&shared, query))
    }

    async fn begin(&self) -> Result<Box<dyn DocumentTransaction>, StoreError> {
        Ok(Box::new(MemoryTransaction {
            shared: Arc::clone(&self.shared),
            doc_reads: Vec::new(),
            query_reads: Vec::new(),
            staged: Vec::new(),
        }))
    }

    async fn watch(&self, query: Query) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut shared = self.shared.write().await;
        let initial = run_query(&shared, &query);
        // Receiver is held by the caller, so this send cannot fail yet.
        let _ = tx.send(initial);
        shared.watchers.push(Watcher { query, tx });
        Ok(Subscription::new(rx))
    }
}
