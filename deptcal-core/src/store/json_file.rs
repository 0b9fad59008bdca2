//! Document store backed by one JSON file per collection.
//!
//! `<dir>/<collection>.json` holds an object mapping document id to
//! document. Writes go to a temp file first and are renamed into place.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::diff::WriteOp;
use crate::error::DeptCalResult;
use crate::store::{apply_ops, check_batch_size, matches_field, Collections, Document, DocumentStore};

pub struct JsonFileStore {
    dir: PathBuf,
    // Serializes read-modify-write cycles.
    write_lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        JsonFileStore {
            dir: dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    async fn load(&self, collection: &str) -> DeptCalResult<Collections> {
        let path = self.collection_path(collection);
        let mut collections = Collections::new();

        let docs = match tokio::fs::read_to_string(&path).await {
            Ok(content) if !content.trim().is_empty() => serde_json::from_str(&content)?,
            Ok(_) => Default::default(),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Default::default(),
            Err(e) => return Err(e.into()),
        };
        collections.insert(collection.to_string(), docs);

        Ok(collections)
    }

    async fn load_many<'a>(&self, names: impl Iterator<Item = &'a str>) -> DeptCalResult<Collections> {
        let mut collections = Collections::new();
        for name in names {
            if !collections.contains_key(name) {
                collections.extend(self.load(name).await?);
            }
        }
        Ok(collections)
    }

    async fn save(&self, collections: &Collections) -> DeptCalResult<()> {
        tokio::fs::create_dir_all(&self.dir).await?;

        for (name, docs) in collections {
            let path = self.collection_path(name);
            let temp = self.dir.join(format!("{}.json.tmp", name));

            let content = serde_json::to_string_pretty(docs)?;
            tokio::fs::write(&temp, content).await?;
            tokio::fs::rename(&temp, &path).await?;
        }

        Ok(())
    }

    fn documents(collections: Collections, collection: &str) -> Vec<Document> {
        collections
            .into_iter()
            .filter(|(name, _)| name == collection)
            .flat_map(|(_, docs)| docs)
            .map(|(id, data)| Document { id, data })
            .collect()
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn query(&self, collection: &str, field: &str, value: &Value) -> DeptCalResult<Vec<Document>> {
        let docs = Self::documents(self.load(collection).await?, collection);
        Ok(docs
            .into_iter()
            .filter(|doc| matches_field(&doc.data, field, value))
            .collect())
    }

    async fn get_all(&self, collection: &str) -> DeptCalResult<Vec<Document>> {
        Ok(Self::documents(self.load(collection).await?, collection))
    }

    async fn get(&self, collection: &str, id: &str) -> DeptCalResult<Option<Document>> {
        Ok(self
            .get_all(collection)
            .await?
            .into_iter()
            .find(|doc| doc.id == id))
    }

    async fn set(&self, collection: &str, id: &str, data: Value) -> DeptCalResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut collections = self.load(collection).await?;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.to_string(), data);
        self.save(&collections).await
    }

    async fn delete(&self, collection: &str, id: &str) -> DeptCalResult<()> {
        let _guard = self.write_lock.lock().await;
        let mut collections = self.load(collection).await?;
        if let Some(docs) = collections.get_mut(collection) {
            if docs.remove(id).is_none() {
                return Ok(());
            }
        }
        self.save(&collections).await
    }

    async fn commit_batch(&self, ops: &[WriteOp]) -> DeptCalResult<()> {
        check_batch_size(ops, self.batch_limit())?;
        if ops.is_empty() {
            return Ok(());
        }

        let _guard = self.write_lock.lock().await;
        let current = self
            .load_many(ops.iter().map(|op| op.collection.as_str()))
            .await?;
        let next = apply_ops(&current, ops)?;
        self.save(&next).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn missing_collection_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        assert!(store.get_all("events").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let ops = vec![
            WriteOp {
                collection: "events".to_string(),
                id: "a".to_string(),
                action: crate::diff::WriteAction::Create(json!({"departmentId": "math"})),
            },
            WriteOp {
                collection: "events".to_string(),
                id: "b".to_string(),
                action: crate::diff::WriteAction::Create(json!({"departmentId": "art"})),
            },
        ];
        JsonFileStore::new(dir.path()).commit_batch(&ops).await.unwrap();

        let reopened = JsonFileStore::new(dir.path());
        let docs = reopened
            .query("events", "departmentId", &json!("art"))
            .await
            .unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].id, "b");
        assert!(!dir.path().join("events.json.tmp").exists());
    }

    #[tokio::test]
    async fn failed_batch_leaves_file_unchanged() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        store.set("events", "a", json!({"title": "A"})).await.unwrap();

        let ops = vec![
            WriteOp::delete("events", "a"),
            WriteOp::patch("events", "missing", serde_json::Map::new()),
        ];
        assert!(store.commit_batch(&ops).await.is_err());
        assert!(store.get("events", "a").await.unwrap().is_some());
    }
}
