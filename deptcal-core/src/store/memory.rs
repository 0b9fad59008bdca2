//! In-process document store.

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::{Mutex, RwLock};

use crate::constants::STORE_BATCH_LIMIT;
use crate::diff::WriteOp;
use crate::error::{DeptCalError, DeptCalResult};
use crate::event::Event;
use crate::store::{apply_ops, check_batch_size, matches_field, Collections, Document, DocumentStore};

/// A `DocumentStore` held in memory.
///
/// Records the size of every committed batch and can be told to fail a
/// specific commit, which makes chunking and partial-failure behavior
/// observable.
pub struct MemoryStore {
    collections: RwLock<Collections>,
    commits: Mutex<Vec<usize>>,
    fail_commit: Mutex<Option<usize>>,
    limit: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        MemoryStore::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            collections: RwLock::new(Collections::new()),
            commits: Mutex::new(Vec::new()),
            fail_commit: Mutex::new(None),
            limit: STORE_BATCH_LIMIT,
        }
    }

    /// Insert events directly, bypassing batch accounting.
    pub async fn seed(&self, collection: &str, events: &[Event]) -> DeptCalResult<()> {
        let mut collections = self.collections.write().await;
        let docs = collections.entry(collection.to_string()).or_default();
        for event in events {
            docs.insert(event.id.clone(), serde_json::to_value(event)?);
        }
        Ok(())
    }

    /// Sizes of successfully committed batches, in commit order.
    pub async fn committed_batches(&self) -> Vec<usize> {
        self.commits.lock().await.clone()
    }

    /// Make the `n`th commit (1-based) fail once without applying anything.
    pub async fn fail_on_commit(&self, n: usize) {
        *self.fail_commit.lock().await = Some(n);
    }

    pub async fn events(&self, collection: &str) -> DeptCalResult<Vec<Event>> {
        self.get_all(collection)
            .await?
            .iter()
            .map(Document::to_event)
            .collect()
    }
}

fn to_documents<'a>(docs: impl Iterator<Item = (&'a String, &'a Value)>) -> Vec<Document> {
    docs.map(|(id, data)| Document {
        id: id.clone(),
        data: data.clone(),
    })
    .collect()
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn query(&self, collection: &str, field: &str, value: &Value) -> DeptCalResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| to_documents(docs.iter().filter(|(_, data)| matches_field(data, field, value))))
            .unwrap_or_default())
    }

    async fn get_all(&self, collection: &str) -> DeptCalResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|docs| to_documents(docs.iter()))
            .unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> DeptCalResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .map(|data| Document {
                id: id.to_string(),
                data: data.clone(),
            }))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> DeptCalResult<()> {
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> DeptCalResult<()> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn commit_batch(&self, ops: &[WriteOp]) -> DeptCalResult<()> {
        check_batch_size(ops, self.limit)?;

        let mut commits = self.commits.lock().await;
        let attempt = commits.len() + 1;
        let mut fail_commit = self.fail_commit.lock().await;
        if *fail_commit == Some(attempt) {
            *fail_commit = None;
            return Err(DeptCalError::Store(format!("injected failure on commit {}", attempt)));
        }

        let mut collections = self.collections.write().await;
        *collections = apply_ops(&collections, ops)?;
        commits.push(ops.len());
        Ok(())
    }

    fn batch_limit(&self) -> usize {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn query_filters_by_field() {
        let store = MemoryStore::new();
        store.set("events", "a", json!({"relatedGroupId": "g1"})).await.unwrap();
        store.set("events", "b", json!({"relatedGroupId": "g2"})).await.unwrap();
        store.set("events", "c", json!({"relatedGroupId": "g1"})).await.unwrap();

        let docs = store.query("events", "relatedGroupId", &json!("g1")).await.unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "c"]);
    }

    #[tokio::test]
    async fn oversized_batch_is_rejected() {
        let store = MemoryStore::new();
        let ops: Vec<_> = (0..501).map(|i| WriteOp::delete("events", &i.to_string())).collect();
        let result = store.commit_batch(&ops).await;
        assert!(matches!(result, Err(DeptCalError::BatchTooLarge { size: 501, limit: 500 })));
        assert!(store.committed_batches().await.is_empty());
    }

    #[tokio::test]
    async fn injected_failure_commits_nothing() {
        let store = MemoryStore::new();
        store.fail_on_commit(1).await;

        let mut fields = serde_json::Map::new();
        fields.insert("title".to_string(), json!("x"));
        let result = store
            .commit_batch(&[WriteOp::patch("events", "a", fields)])
            .await;

        assert!(matches!(result, Err(DeptCalError::Store(_))));
        assert!(store.get_all("events").await.unwrap().is_empty());
    }
}
