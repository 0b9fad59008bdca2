//! Sibling reconciliation.
//!
//! Editing an occurrence that already belongs to a linked group rewrites the
//! whole sibling set. Stored siblings whose department is still targeted keep
//! their document id, newly targeted departments get fresh documents, and
//! siblings for departments no longer targeted are deleted.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;
use tracing::{debug, warn};

use crate::constants::{FIELD_DEPARTMENT_ID, FIELD_RELATED_GROUP_ID};
use crate::diff::{UnitOfWork, WriteOp};
use crate::error::DeptCalResult;
use crate::event::Event;
use crate::fanout::plan_fanout;
use crate::store::{Document, DocumentStore};

/// A stored sibling: (department id, document id).
pub type StoredSibling = (String, String);

/// Outcome of reconciling one occurrence.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconciliation {
    pub work: UnitOfWork,
    /// True when no stored siblings were found and a fresh fan-out was planned.
    pub fell_back: bool,
}

pub struct SiblingReconciler<'a> {
    store: &'a dyn DocumentStore,
    collection: &'a str,
}

impl<'a> SiblingReconciler<'a> {
    pub fn new(store: &'a dyn DocumentStore, collection: &'a str) -> Self {
        SiblingReconciler { store, collection }
    }

    /// Plan the writes that move the stored sibling set of `template`'s
    /// linked group to one document per department in `targets`.
    ///
    /// `persisted` says whether `template` was saved before. It only matters
    /// when there is no stored group to diff against.
    pub async fn reconcile(
        &self,
        template: &Event,
        targets: &[String],
        persisted: bool,
    ) -> DeptCalResult<Reconciliation> {
        let Some(group_id) = template.related_group_id.as_deref() else {
            return Ok(Reconciliation {
                work: fresh_writes(self.collection, template, targets, persisted)?,
                fell_back: false,
            });
        };

        let docs = self
            .store
            .query(self.collection, FIELD_RELATED_GROUP_ID, &Value::from(group_id))
            .await?;
        let stored = stored_siblings(&docs);

        if stored.is_empty() {
            // The group id points at nothing: a concurrent delete or a
            // half-written save. Recreate the group from scratch.
            warn!(
                event_id = %template.id,
                related_group_id = group_id,
                "Linked group not found in store, falling back to fresh fan-out"
            );
            return Ok(Reconciliation {
                work: fresh_writes(self.collection, template, targets, persisted)?,
                fell_back: true,
            });
        }

        let work = diff_siblings(self.collection, template, targets, &stored)?;
        let (created, updated, deleted) = work.counts();
        debug!(
            event_id = %template.id,
            related_group_id = group_id,
            created,
            updated,
            deleted,
            "Reconciled linked group"
        );

        Ok(Reconciliation {
            work,
            fell_back: false,
        })
    }
}

fn stored_siblings(docs: &[Document]) -> Vec<StoredSibling> {
    docs.iter()
        .filter_map(|doc| match doc.data.get(FIELD_DEPARTMENT_ID).and_then(Value::as_str) {
            Some(department_id) => Some((department_id.to_string(), doc.id.clone())),
            None => {
                warn!(document_id = %doc.id, "Sibling without departmentId ignored");
                None
            }
        })
        .collect()
}

/// Writes for a fan-out with no stored siblings to reuse.
///
/// The document at the template's own id counts as an update when the
/// template was persisted before.
pub fn fresh_writes(
    collection: &str,
    template: &Event,
    targets: &[String],
    persisted: bool,
) -> DeptCalResult<UnitOfWork> {
    plan_fanout(template, &template.id, targets)
        .iter()
        .map(|doc| {
            if persisted && doc.id == template.id {
                WriteOp::update(collection, doc)
            } else {
                WriteOp::create(collection, doc)
            }
        })
        .collect()
}

/// Diff the desired sibling set against `stored`.
///
/// Sets come first in target order, then deletes in stored order. A stored
/// document that is also written by this diff is never deleted.
pub fn diff_siblings(
    collection: &str,
    template: &Event,
    targets: &[String],
    stored: &[StoredSibling],
) -> DeptCalResult<UnitOfWork> {
    let mut existing_by_dept: BTreeMap<&str, &str> = BTreeMap::new();
    for (department_id, doc_id) in stored {
        existing_by_dept.entry(department_id.as_str()).or_insert(doc_id.as_str());
    }

    let mut work = UnitOfWork::new();
    let mut written: HashSet<String> = HashSet::new();

    for mut doc in plan_fanout(template, &template.id, targets) {
        let op = match existing_by_dept.get(doc.department_id.as_str()) {
            Some(existing_id) => {
                doc.id = existing_id.to_string();
                WriteOp::update(collection, &doc)?
            }
            None => WriteOp::create(collection, &doc)?,
        };
        written.insert(doc.id);
        work = work.with(op);
    }

    for (department_id, doc_id) in stored {
        if written.contains(doc_id) {
            continue;
        }
        let orphaned = !targets.contains(department_id);
        let duplicate = existing_by_dept.get(department_id.as_str()) != Some(&doc_id.as_str());
        if orphaned || duplicate {
            work = work.with(WriteOp::delete(collection, doc_id));
        }
    }

    Ok(work)
}
