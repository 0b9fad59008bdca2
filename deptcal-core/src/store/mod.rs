//! Document store abstraction.
//!
//! The engine talks to a hosted document database through `DocumentStore`:
//! keyed JSON documents grouped in named collections, queryable by a single
//! field and writable in bounded atomic batches.

mod json_file;
mod memory;

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value;

use crate::constants::STORE_BATCH_LIMIT;
use crate::diff::{WriteAction, WriteOp};
use crate::error::{DeptCalError, DeptCalResult};
use crate::event::Event;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

/// A stored document and its key.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub data: Value,
}

impl Document {
    /// Decode as an event. The document key wins over any `id` field.
    pub fn to_event(&self) -> DeptCalResult<Event> {
        let mut event: Event = serde_json::from_value(self.data.clone())?;
        event.id = self.id.clone();
        Ok(event)
    }
}

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Documents in `collection` whose top-level `field` equals `value`.
    async fn query(&self, collection: &str, field: &str, value: &Value) -> DeptCalResult<Vec<Document>>;

    async fn get_all(&self, collection: &str) -> DeptCalResult<Vec<Document>>;

    async fn get(&self, collection: &str, id: &str) -> DeptCalResult<Option<Document>>;

    /// Create or overwrite one document.
    async fn set(&self, collection: &str, id: &str, data: Value) -> DeptCalResult<()>;

    /// Delete one document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> DeptCalResult<()>;

    /// Apply all `ops` atomically: either every write lands or none does.
    async fn commit_batch(&self, ops: &[WriteOp]) -> DeptCalResult<()>;

    /// Most operations accepted by one `commit_batch` call.
    fn batch_limit(&self) -> usize {
        STORE_BATCH_LIMIT
    }
}

/// Collection name -> document id -> document.
pub(crate) type Collections = BTreeMap<String, BTreeMap<String, Value>>;

/// Apply `ops` to a copy of `collections`, returning the copy.
/// `collections` is left untouched when any op fails.
pub(crate) fn apply_ops(collections: &Collections, ops: &[WriteOp]) -> DeptCalResult<Collections> {
    let mut next = collections.clone();

    for op in ops {
        let docs = next.entry(op.collection.clone()).or_default();
        match &op.action {
            WriteAction::Create(data) | WriteAction::Update(data) => {
                docs.insert(op.id.clone(), data.clone());
            }
            WriteAction::Patch(fields) => {
                let doc = docs
                    .get_mut(&op.id)
                    .and_then(Value::as_object_mut)
                    .ok_or_else(|| DeptCalError::DocumentNotFound {
                        collection: op.collection.clone(),
                        id: op.id.clone(),
                    })?;
                for (key, value) in fields {
                    doc.insert(key.clone(), value.clone());
                }
            }
            WriteAction::Delete => {
                docs.remove(&op.id);
            }
        }
    }

    Ok(next)
}

pub(crate) fn matches_field(data: &Value, field: &str, value: &Value) -> bool {
    data.get(field) == Some(value)
}

pub(crate) fn check_batch_size(ops: &[WriteOp], limit: usize) -> DeptCalResult<()> {
    if ops.len() > limit {
        return Err(DeptCalError::BatchTooLarge {
            size: ops.len(),
            limit,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn failed_patch_leaves_collections_untouched() {
        let mut collections = Collections::new();
        collections
            .entry("events".to_string())
            .or_default()
            .insert("a".to_string(), json!({"title": "A"}));

        let mut fields = serde_json::Map::new();
        fields.insert("title".to_string(), json!("B"));
        let ops = vec![
            WriteOp::delete("events", "a"),
            WriteOp::patch("events", "missing", fields),
        ];

        let result = apply_ops(&collections, &ops);
        assert!(matches!(result, Err(DeptCalError::DocumentNotFound { .. })));
        assert!(collections["events"].contains_key("a"));
    }

    #[test]
    fn patch_merges_top_level_fields() {
        let mut collections = Collections::new();
        collections
            .entry("events".to_string())
            .or_default()
            .insert("a".to_string(), json!({"title": "A", "version": 1}));

        let mut fields = serde_json::Map::new();
        fields.insert("version".to_string(), json!(2));
        let next = apply_ops(&collections, &[WriteOp::patch("events", "a", fields)]).unwrap();

        assert_eq!(next["events"]["a"], json!({"title": "A", "version": 2}));
    }

    #[test]
    fn document_key_overrides_id_field() {
        let doc = Document {
            id: "evt_science".to_string(),
            data: json!({
                "id": "stale",
                "title": "t",
                "startDate": "2026-01-05",
                "endDate": "2026-01-05",
                "departmentId": "science"
            }),
        };
        assert_eq!(doc.to_event().unwrap().id, "evt_science");
    }
}
