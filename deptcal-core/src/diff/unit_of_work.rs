use crate::diff::{WriteKind, WriteOp};

/// An ordered list of writes, built up by value and handed once to the
/// batch coordinator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UnitOfWork(Vec<WriteOp>);

impl UnitOfWork {
    pub fn new() -> Self {
        UnitOfWork(Vec::new())
    }

    pub fn with(mut self, op: WriteOp) -> Self {
        self.0.push(op);
        self
    }

    pub fn merge(mut self, other: UnitOfWork) -> Self {
        self.0.extend(other.0);
        self
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.0
    }

    pub fn into_ops(self) -> Vec<WriteOp> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Ids touched by writes of `kind`, in queue order.
    pub fn ids(&self, kind: WriteKind) -> Vec<&str> {
        self.0
            .iter()
            .filter(|op| op.kind() == kind)
            .map(|op| op.id.as_str())
            .collect()
    }

    /// (created, updated, deleted)
    pub fn counts(&self) -> (usize, usize, usize) {
        let mut created = 0;
        let mut updated = 0;
        let mut deleted = 0;

        for op in &self.0 {
            match op.kind() {
                WriteKind::Create => created += 1,
                WriteKind::Update => updated += 1,
                WriteKind::Delete => deleted += 1,
            }
        }

        (created, updated, deleted)
    }
}

impl FromIterator<WriteOp> for UnitOfWork {
    fn from_iter<I: IntoIterator<Item = WriteOp>>(iter: I) -> Self {
        UnitOfWork(iter.into_iter().collect())
    }
}

impl IntoIterator for UnitOfWork {
    type Item = WriteOp;
    type IntoIter = std::vec::IntoIter<WriteOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_by_kind() {
        let work = UnitOfWork::new()
            .with(WriteOp::delete("events", "a"))
            .with(WriteOp::patch("events", "b", Default::default()))
            .with(WriteOp::delete("events", "c"));

        assert_eq!(work.counts(), (0, 1, 2));
        assert_eq!(work.ids(WriteKind::Delete), vec!["a", "c"]);
    }

    #[test]
    fn merge_keeps_queue_order() {
        let first = UnitOfWork::new().with(WriteOp::delete("events", "a"));
        let second: UnitOfWork = ["b", "c"]
            .into_iter()
            .map(|id| WriteOp::delete("events", id))
            .collect();

        let merged = first.merge(second);
        let ids: Vec<_> = merged.ops().iter().map(|op| op.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }
}
