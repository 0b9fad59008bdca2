//! Chunked batch commits.
//!
//! A unit of work may hold more writes than the store accepts in one atomic
//! call. It is split into chunks of at most `max_chunk` operations, which are
//! committed one after another. Atomicity holds per chunk only: when a chunk
//! fails, earlier chunks stay committed and later ones are never attempted.

use tracing::{debug, error, trace};

use crate::constants::MAX_CHUNK;
use crate::diff::UnitOfWork;
use crate::error::{DeptCalError, DeptCalResult};
use crate::store::DocumentStore;

/// What a successful commit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CommitSummary {
    pub chunks: usize,
    pub ops: usize,
}

pub struct BatchCoordinator<'a> {
    store: &'a dyn DocumentStore,
    max_chunk: usize,
}

impl<'a> BatchCoordinator<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self::with_max_chunk(store, MAX_CHUNK)
    }

    /// `max_chunk` is clamped to `1..=MAX_CHUNK` and to the store's own limit.
    pub fn with_max_chunk(store: &'a dyn DocumentStore, max_chunk: usize) -> Self {
        let max_chunk = max_chunk.clamp(1, MAX_CHUNK).min(store.batch_limit().max(1));
        BatchCoordinator { store, max_chunk }
    }

    pub fn max_chunk(&self) -> usize {
        self.max_chunk
    }

    pub async fn commit(&self, work: UnitOfWork) -> DeptCalResult<CommitSummary> {
        let ops = work.into_ops();
        let mut summary = CommitSummary::default();

        if ops.is_empty() {
            debug!("Nothing to commit");
            return Ok(summary);
        }

        let total_chunks = ops.len().div_ceil(self.max_chunk);

        for (chunk, batch) in ops.chunks(self.max_chunk).enumerate() {
            trace!(chunk = chunk + 1, total_chunks, ops = batch.len(), "Committing chunk");
            for op in batch {
                trace!(chunk = chunk + 1, "{}", op);
            }

            if let Err(e) = self.store.commit_batch(batch).await {
                error!(
                    chunk = chunk + 1,
                    total_chunks,
                    committed_ops = summary.ops,
                    error = %e,
                    "Batch commit failed; earlier chunks remain committed"
                );
                return Err(DeptCalError::ChunkFailed {
                    chunk: chunk + 1,
                    committed_ops: summary.ops,
                    source: Box::new(e),
                });
            }

            summary.chunks += 1;
            summary.ops += batch.len();
        }

        debug!(chunks = summary.chunks, ops = summary.ops, "Unit of work committed");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diff::WriteOp;
    use crate::store::MemoryStore;
    use serde_json::json;

    async fn seeded_store(n: usize) -> MemoryStore {
        let store = MemoryStore::new();
        for i in 0..n {
            store
                .set("events", &format!("e{:04}", i), json!({"n": i}))
                .await
                .unwrap();
        }
        store
    }

    fn delete_all(n: usize) -> UnitOfWork {
        (0..n)
            .map(|i| WriteOp::delete("events", &format!("e{:04}", i)))
            .collect()
    }

    #[tokio::test]
    async fn splits_into_bounded_chunks_in_order() {
        let store = seeded_store(1200).await;
        let summary = BatchCoordinator::new(&store).commit(delete_all(1200)).await.unwrap();

        assert_eq!(summary, CommitSummary { chunks: 3, ops: 1200 });
        assert_eq!(store.committed_batches().await, vec![499, 499, 202]);
        assert!(store.get_all("events").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn small_unit_is_one_commit() {
        let store = seeded_store(3).await;
        BatchCoordinator::new(&store).commit(delete_all(3)).await.unwrap();
        assert_eq!(store.committed_batches().await, vec![3]);
    }

    #[tokio::test]
    async fn empty_unit_commits_nothing() {
        let store = MemoryStore::new();
        let summary = BatchCoordinator::new(&store).commit(UnitOfWork::new()).await.unwrap();
        assert_eq!(summary.chunks, 0);
        assert!(store.committed_batches().await.is_empty());
    }

    #[tokio::test]
    async fn failed_chunk_keeps_earlier_chunks_and_skips_later() {
        let store = seeded_store(1200).await;
        store.fail_on_commit(2).await;

        let err = BatchCoordinator::new(&store)
            .commit(delete_all(1200))
            .await
            .unwrap_err();

        match err {
            DeptCalError::ChunkFailed { chunk, committed_ops, .. } => {
                assert_eq!(chunk, 2);
                assert_eq!(committed_ops, 499);
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(store.committed_batches().await, vec![499]);
        assert_eq!(store.get_all("events").await.unwrap().len(), 1200 - 499);
    }

    #[tokio::test]
    async fn configured_chunk_size_is_clamped() {
        let store = MemoryStore::new();
        assert_eq!(BatchCoordinator::with_max_chunk(&store, 10_000).max_chunk(), MAX_CHUNK);
        assert_eq!(BatchCoordinator::with_max_chunk(&store, 0).max_chunk(), 1);
        assert_eq!(BatchCoordinator::with_max_chunk(&store, 50).max_chunk(), 50);
    }
}
