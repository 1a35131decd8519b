//! Postgres document store adapter.
//!
//! Documents live in a single JSONB-backed table keyed by (collection, id).
//! Transactions follow the same optimistic protocol as the in-memory
//! adapter: reads against committed state record versions and query
//! fingerprints, and commit re-validates them under per-collection advisory
//! locks before applying the staged writes.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use std::time::Duration as StdDuration;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::domain::foundation::Timestamp;
use crate::ports::{
    Direction, Document, DocumentStore, DocumentTransaction, Filter, Query, StoreError,
    Subscription,
};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    collection  TEXT   NOT NULL,
    id          TEXT   NOT NULL,
    data        JSONB  NOT NULL,
    version     BIGINT NOT NULL DEFAULT 1,
    PRIMARY KEY (collection, id)
);
CREATE INDEX IF NOT EXISTS documents_collection_idx ON documents (collection);
"#;

/// Poll interval for live query subscriptions.
const WATCH_POLL_INTERVAL: StdDuration = StdDuration::from_millis(500);

/// Document store backed by a Postgres JSONB table.
#[derive(Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the documents table and indexes if missing.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await.map_err(map_sqlx)?;
        for statement in SCHEMA.split(';').map(str::trim).filter(|s| !s.is_empty()) {
            sqlx::query(statement)
                .execute(&mut *conn)
                .await
                .map_err(map_sqlx)?;
        }
        Ok(())
    }
}

fn map_sqlx(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        // 42501: insufficient_privilege
        if db.code().as_deref() == Some("42501") {
            return StoreError::PermissionDenied(db.message().to_string());
        }
    }
    StoreError::Unavailable(err.to_string())
}

/// Rejects field names that cannot be spliced into a JSONB path.
fn checked_field(field: &str) -> Result<&str, StoreError> {
    if !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        Ok(field)
    } else {
        Err(StoreError::Serialization(format!(
            "invalid field name '{}'",
            field
        )))
    }
}

/// Builds the SELECT for a query. Range filters compare text for string
/// bounds (RFC 3339 timestamps order correctly as text) and float8 for
/// numeric bounds.
fn build_select(query: &Query) -> Result<QueryBuilder<'static, Postgres>, StoreError> {
    let mut qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT id, data, version FROM documents WHERE collection = ");
    qb.push_bind(query.collection.clone());

    for filter in &query.filters {
        match filter {
            Filter::Eq(field, value) => {
                qb.push(format!(" AND data->'{}' = ", checked_field(field)?));
                qb.push_bind(value.clone());
            }
            Filter::Gte(field, bound) | Filter::Lte(field, bound) => {
                let op = if matches!(filter, Filter::Gte(..)) { ">=" } else { "<=" };
                match bound {
                    Value::String(s) => {
                        qb.push(format!(" AND data->>'{}' {} ", checked_field(field)?, op));
                        qb.push_bind(s.clone());
                    }
                    Value::Number(n) => {
                        let n = n.as_f64().ok_or_else(|| {
                            StoreError::Serialization("non-finite numeric bound".to_string())
                        })?;
                        qb.push(format!(
                            " AND (data->'{}')::float8 {} ",
                            checked_field(field)?,
                            op
                        ));
                        qb.push_bind(n);
                    }
                    other => {
                        return Err(StoreError::Serialization(format!(
                            "unsupported range bound {}",
                            other
                        )))
                    }
                }
            }
        }
    }

    if let Some((field, direction)) = &query.order_by {
        let dir = match direction {
            Direction::Ascending => "ASC",
            Direction::Descending => "DESC",
        };
        qb.push(format!(" ORDER BY data->>'{}' {}", checked_field(field)?, dir));
    }
    if let Some(limit) = query.limit {
        qb.push(" LIMIT ");
        qb.push_bind(limit as i64);
    }
    Ok(qb)
}

fn row_to_document(row: PgRow) -> Document {
    Document {
        id: row.get::<String, _>("id"),
        version: row.get::<i64, _>("version") as u64,
        data: row.get::<Value, _>("data"),
    }
}

async fn fetch_documents<'e, E>(executor: E, query: &Query) -> Result<Vec<Document>, StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    let mut qb = build_select(query)?;
    let rows = qb.build().fetch_all(executor).await.map_err(map_sqlx)?;
    Ok(rows.into_iter().map(row_to_document).collect())
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

struct PostgresTransaction {
    pool: PgPool,
    doc_reads: Vec<(String, String, Option<u64>)>,
    query_reads: Vec<(Query, Vec<(String, u64)>)>,
    staged: Vec<StagedWrite>,
}

impl PostgresTransaction {
    /// Collections this transaction touched, deduplicated and sorted so
    /// advisory locks are taken in a stable order.
    fn touched_collections(&self) -> Vec<&str> {
        let mut out: Vec<&str> = self
            .doc_reads
            .iter()
            .map(|(c, _, _)| c.as_str())
            .chain(self.query_reads.iter().map(|(q, _)| q.collection.as_str()))
            .chain(self.staged.iter().map(|w| match w {
                StagedWrite::Create { collection, .. } => collection.as_str(),
                StagedWrite::Update { collection, .. } => collection.as_str(),
            }))
            .collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

#[async_trait]
impl DocumentTransaction for PostgresTransaction {
    async fn get(&mut self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            "SELECT id, data, version FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;

        let found = row.map(row_to_document);
        self.doc_reads.push((
            collection.to_string(),
            id.to_string(),
            found.as_ref().map(|d| d.version),
        ));
        Ok(found)
    }

    async fn query(&mut self, query: &Query) -> Result<Vec<Document>, StoreError> {
        let docs = fetch_documents(&self.pool, query).await?;
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
        let mut txn = self.pool.begin().await.map_err(map_sqlx)?;

        // Serialize commits per touched collection so read validation and
        // write application happen without interleaving competitors.
        for collection in self.touched_collections() {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
                .bind(collection)
                .execute(&mut *txn)
                .await
                .map_err(map_sqlx)?;
        }

        for (collection, id, seen_version) in &self.doc_reads {
            let current: Option<i64> = sqlx::query_scalar(
                "SELECT version FROM documents WHERE collection = $1 AND id = $2",
            )
            .bind(collection)
            .bind(id)
            .fetch_optional(&mut *txn)
            .await
            .map_err(map_sqlx)?;
            if current.map(|v| v as u64) != *seen_version {
                return Err(StoreError::Conflict);
            }
        }

        for (query, fingerprint) in &self.query_reads {
            let current = query_fingerprint(&fetch_documents(&mut *txn, query).await?);
            if current != *fingerprint {
                return Err(StoreError::Conflict);
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
                    sqlx::query(
                        "INSERT INTO documents (collection, id, data, version) \
                         VALUES ($1, $2, $3, 1)",
                    )
                    .bind(collection)
                    .bind(id)
                    .bind(data)
                    .execute(&mut *txn)
                    .await
                    .map_err(map_sqlx)?;
                }
                StagedWrite::Update {
                    collection,
                    id,
                    patch,
                } => {
                    let result = sqlx::query(
                        "UPDATE documents SET data = data || $3, version = version + 1 \
                         WHERE collection = $1 AND id = $2",
                    )
                    .bind(&collection)
                    .bind(&id)
                    .bind(patch)
                    .execute(&mut *txn)
                    .await
                    .map_err(map_sqlx)?;
                    if result.rows_affected() == 0 {
                        // Dropping the open transaction rolls back any
                        // writes applied so far.
                        return Err(StoreError::NotFound { collection, id });
                    }
                }
            }
        }

        txn.commit().await.map_err(map_sqlx)
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            "SELECT id, data, version FROM documents WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(row.map(row_to_document))
    }

    async fn insert(&self, collection: &str, data: Value) -> Result<String, StoreError> {
        let id = Uuid::new_v4().to_string();
        self.put(collection, &id, data).await?;
        Ok(id)
    }

    async fn put(&self, collection: &str, id: &str, data: Value) -> Result<(), StoreError> {
        let mut data = data;
        inject_created_at(&mut data);
        sqlx::query(
            "INSERT INTO documents (collection, id, data, version) VALUES ($1, $2, $3, 1) \
             ON CONFLICT (collection, id) \
             DO UPDATE SET data = EXCLUDED.data, version = documents.version + 1",
        )
        .bind(collection)
        .bind(id)
        .bind(data)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        Ok(())
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE documents SET data = data || $3, version = version + 1 \
             WHERE collection = $1 AND id = $2",
        )
        .bind(collection)
        .bind(id)
        .bind(patch)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }

    async fn query(&self, query: &Query) -> Result<Vec<Document>, StoreError> {
        fetch_documents(&self.pool, query).await
    }

    async fn begin(&self) -> Result<Box<dyn DocumentTransaction>, StoreError> {
        Ok(Box::new(PostgresTransaction {
            pool: self.pool.clone(),
            doc_reads: Vec::new(),
            query_reads: Vec::new(),
            staged: Vec::new(),
        }))
    }

    /// Live queries are polled; a snapshot is delivered on registration and
    /// whenever the (id, version) fingerprint of the result set changes.
    async fn watch(&self, query: Query) -> Result<Subscription, StoreError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let initial = fetch_documents(&self.pool, &query).await?;
        let mut last = query_fingerprint(&initial);
        let _ = tx.send(initial);

        let pool = self.pool.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(WATCH_POLL_INTERVAL);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                if tx.is_closed() {
                    break;
                }
                match fetch_documents(&pool, &query).await {
                    Ok(docs) => {
                        let fingerprint = query_fingerprint(&docs);
                        if fingerprint != last {
                            last = fingerprint;
                            if tx.send(docs).is_err() {
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "live query poll failed");
                    }
                }
            }
        });

        Ok(Subscription::new(rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn select_compiles_equality_and_range_filters() {
        let q = Query::collection("reservations")
            .filter_eq("status", "confirmed")
            .filter_gte("session_date", "2099-01-01T00:00:00Z")
            .filter_lte("session_date", "2099-01-01T23:59:59.999Z");
        let qb = build_select(&q).unwrap();
        let sql = qb.sql();
        assert!(sql.contains("data->'status' ="));
        assert!(sql.contains("data->>'session_date' >="));
        assert!(sql.contains("data->>'session_date' <="));
    }

    #[test]
    fn select_compiles_ordering_and_limit() {
        let q = Query::collection("reservations")
            .order_by("session_date", Direction::Descending)
            .limit(5);
        let qb = build_select(&q).unwrap();
        let sql = qb.sql();
        assert!(sql.contains("ORDER BY data->>'session_date' DESC"));
        assert!(sql.contains("LIMIT"));
    }

    #[test]
    fn numeric_range_bounds_compare_as_float8() {
        let q = Query::collection("profiles").filter_gte("remaining_credits", 1);
        let qb = build_select(&q).unwrap();
        assert!(qb.sql().contains("(data->'remaining_credits')::float8 >="));
    }

    #[test]
    fn hostile_field_names_are_rejected() {
        let q = Query::collection("x").filter_eq("status' OR '1'='1", "y");
        assert!(matches!(
            build_select(&q),
            Err(StoreError::Serialization(_))
        ));
        let q = Query::collection("x").order_by("a; DROP TABLE documents", Direction::Ascending);
        assert!(matches!(
            build_select(&q),
            Err(StoreError::Serialization(_))
        ));
    }

    #[test]
    fn created_at_is_injected_only_when_absent() {
        let mut data = json!({"status": "confirmed"});
        inject_created_at(&mut data);
        assert!(data["created_at"].as_str().is_some());

        let mut data = json!({"created_at": "2099-01-01T00:00:00Z"});
        inject_created_at(&mut data);
        assert_eq!(data["created_at"], json!("2099-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn touched_collections_are_deduplicated_and_sorted() {
        let txn = PostgresTransaction {
            pool: PgPool::connect_lazy("postgres://localhost/unused").unwrap(),
            doc_reads: vec![("profiles".into(), "m1".into(), Some(1))],
            query_reads: vec![(Query::collection("reservations"), vec![])],
            staged: vec![StagedWrite::Update {
                collection: "profiles".into(),
                id: "m1".into(),
                patch: json!({}),
            }],
        };
        assert_eq!(txn.touched_collections(), vec!["profiles", "reservations"]);
    }
}
