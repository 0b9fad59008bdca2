//! Deletion cascades.
//!
//! Deleting one occurrence can also remove its department siblings or the
//! rest of its series. Which one happens is decided by the user through a
//! `Confirmation` collaborator; the resolver only works out the document ids.

use serde_json::Value;
use tracing::debug;

use crate::constants::{FIELD_RECURRENCE_GROUP_ID, FIELD_RECURRENCE_INDEX, FIELD_RELATED_GROUP_ID};
use crate::error::DeptCalResult;
use crate::event::Event;
use crate::store::{Document, DocumentStore};

/// A question put to the user before widening a delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletePrompt {
    /// Yes: this occurrence and every later one. No: this occurrence only.
    FutureOccurrences { title: String, recurrence_index: u32 },
    /// Yes: every linked department copy. No: this department's copy only.
    LinkedSiblings { title: String, sibling_count: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Yes,
    No,
    Cancel,
}

/// Synchronous yes/no/cancel prompt.
pub trait Confirmation {
    fn confirm(&self, prompt: &DeletePrompt) -> Choice;
}

impl<F> Confirmation for F
where
    F: Fn(&DeletePrompt) -> Choice,
{
    fn confirm(&self, prompt: &DeletePrompt) -> Choice {
        self(prompt)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteScope {
    Single,
    LinkedGroup,
    FutureOccurrences,
    Cancelled,
}

/// Documents to delete, in delete order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionPlan {
    pub scope: DeleteScope,
    pub ids: Vec<String>,
}

impl DeletionPlan {
    fn single(id: &str) -> Self {
        DeletionPlan {
            scope: DeleteScope::Single,
            ids: vec![id.to_string()],
        }
    }

    fn cancelled() -> Self {
        DeletionPlan {
            scope: DeleteScope::Cancelled,
            ids: Vec::new(),
        }
    }
}

pub struct DeletionCascadeResolver<'a> {
    store: &'a dyn DocumentStore,
    collection: &'a str,
}

impl<'a> DeletionCascadeResolver<'a> {
    pub fn new(store: &'a dyn DocumentStore, collection: &'a str) -> Self {
        DeletionCascadeResolver { store, collection }
    }

    /// Work out what deleting document `id` removes.
    ///
    /// Without `event` only `id` itself is deleted.
    pub async fn resolve(
        &self,
        id: &str,
        event: Option<&Event>,
        confirm: &dyn Confirmation,
    ) -> DeptCalResult<DeletionPlan> {
        let Some(event) = event else {
            return Ok(DeletionPlan::single(id));
        };

        if let (true, Some(group_id), Some(index)) = (
            event.is_recurring_occurrence(),
            event.recurrence_group_id.as_deref(),
            event.recurrence_index,
        ) {
            debug!(event_id = id, recurrence_group_id = group_id, index, "Deleting recurring occurrence");

            let prompt = DeletePrompt::FutureOccurrences {
                title: event.title.clone(),
                recurrence_index: index,
            };
            match confirm.confirm(&prompt) {
                Choice::Yes => return self.future_occurrences(group_id, index).await,
                Choice::No => {}
                Choice::Cancel => return Ok(DeletionPlan::cancelled()),
            }
        }

        self.single_occurrence(id, event, confirm).await
    }

    async fn single_occurrence(
        &self,
        id: &str,
        event: &Event,
        confirm: &dyn Confirmation,
    ) -> DeptCalResult<DeletionPlan> {
        let Some(group_id) = event.related_group_id.as_deref() else {
            return Ok(DeletionPlan::single(id));
        };

        let group = self
            .store
            .query(self.collection, FIELD_RELATED_GROUP_ID, &Value::from(group_id))
            .await?;
        let sibling_count = group.iter().filter(|doc| doc.id != id).count();

        if sibling_count == 0 {
            debug!(event_id = id, related_group_id = group_id, "No linked siblings left");
            return Ok(DeletionPlan::single(id));
        }

        let prompt = DeletePrompt::LinkedSiblings {
            title: event.title.clone(),
            sibling_count,
        };
        match confirm.confirm(&prompt) {
            Choice::Yes => {
                let mut ids: Vec<String> = group.into_iter().map(|doc| doc.id).collect();
                if !ids.iter().any(|g| g == id) {
                    ids.insert(0, id.to_string());
                }
                Ok(DeletionPlan {
                    scope: DeleteScope::LinkedGroup,
                    ids,
                })
            }
            Choice::No => Ok(DeletionPlan::single(id)),
            Choice::Cancel => Ok(DeletionPlan::cancelled()),
        }
    }

    /// Every document of the series at or after `from_index`, department
    /// siblings included, ordered by index.
    async fn future_occurrences(&self, group_id: &str, from_index: u32) -> DeptCalResult<DeletionPlan> {
        let series = self
            .store
            .query(self.collection, FIELD_RECURRENCE_GROUP_ID, &Value::from(group_id))
            .await?;

        let mut doomed: Vec<(u32, String)> = series
            .iter()
            .map(|doc| (recurrence_index(doc), doc.id.clone()))
            .filter(|(index, _)| *index >= from_index)
            .collect();
        doomed.sort();

        debug!(
            recurrence_group_id = group_id,
            from_index,
            count = doomed.len(),
            "Deleting future occurrences"
        );

        Ok(DeletionPlan {
            scope: DeleteScope::FutureOccurrences,
            ids: doomed.into_iter().map(|(_, id)| id).collect(),
        })
    }
}

fn recurrence_index(doc: &Document) -> u32 {
    doc.data
        .get(FIELD_RECURRENCE_INDEX)
        .and_then(Value::as_u64)
        .and_then(|i| u32::try_from(i).ok())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use std::cell::RefCell;

    fn event(id: &str, department: &str) -> Event {
        let day = NaiveDate::from_ymd_opt(2026, 3, 2).unwrap();
        Event::new(id, "Mock exam", department, day, day)
    }

    fn answer(choice: Choice) -> impl Fn(&DeletePrompt) -> Choice {
        move |_: &DeletePrompt| choice
    }

    fn never_asked(prompt: &DeletePrompt) -> Choice {
        panic!("unexpected prompt: {prompt:?}")
    }

    async fn linked_pair(store: &MemoryStore) -> Event {
        let mut a = event("evt", "A");
        a.related_group_id = Some("group_1".to_string());
        a.department_ids = vec!["A".into(), "B".into()];
        let mut b = a.clone();
        b.id = "evt_B".to_string();
        b.department_id = "B".to_string();
        store.seed("events", &[a.clone(), b]).await.unwrap();
        a
    }

    #[tokio::test]
    async fn no_event_deletes_only_the_id() {
        let store = MemoryStore::new();
        let plan = DeletionCascadeResolver::new(&store, "events")
            .resolve("x", None, &never_asked)
            .await
            .unwrap();
        assert_eq!(plan, DeletionPlan::single("x"));
    }

    #[tokio::test]
    async fn standalone_event_is_deleted_without_prompt() {
        let store = MemoryStore::new();
        let e = event("evt", "A");
        let plan = DeletionCascadeResolver::new(&store, "events")
            .resolve("evt", Some(&e), &never_asked)
            .await
            .unwrap();
        assert_eq!(plan.ids, vec!["evt"]);
    }

    #[tokio::test]
    async fn linked_group_all_siblings() {
        let store = MemoryStore::new();
        let a = linked_pair(&store).await;

        let plan = DeletionCascadeResolver::new(&store, "events")
            .resolve("evt", Some(&a), &answer(Choice::Yes))
            .await
            .unwrap();
        assert_eq!(plan.scope, DeleteScope::LinkedGroup);
        assert_eq!(plan.ids, vec!["evt", "evt_B"]);
    }

    #[tokio::test]
    async fn linked_group_this_department_only() {
        let store = MemoryStore::new();
        let a = linked_pair(&store).await;

        let plan = DeletionCascadeResolver::new(&store, "events")
            .resolve("evt", Some(&a), &answer(Choice::No))
            .await
            .unwrap();
        assert_eq!(plan, DeletionPlan::single("evt"));
    }

    #[tokio::test]
    async fn cancel_deletes_nothing() {
        let store = MemoryStore::new();
        let a = linked_pair(&store).await;

        let plan = DeletionCascadeResolver::new(&store, "events")
            .resolve("evt", Some(&a), &answer(Choice::Cancel))
            .await
            .unwrap();
        assert_eq!(plan.scope, DeleteScope::Cancelled);
        assert!(plan.ids.is_empty());
    }

    #[tokio::test]
    async fn recurring_only_this_falls_through_to_linked_prompt() {
        let store = MemoryStore::new();
        let mut a = linked_pair(&store).await;
        a.recurrence_group_id = Some("evt".to_string());
        a.recurrence_index = Some(1);

        let asked = RefCell::new(Vec::new());
        let confirm = |prompt: &DeletePrompt| {
            asked.borrow_mut().push(prompt.clone());
            match prompt {
                DeletePrompt::FutureOccurrences { .. } => Choice::No,
                DeletePrompt::LinkedSiblings { .. } => Choice::Yes,
            }
        };

        let plan = DeletionCascadeResolver::new(&store, "events")
            .resolve("evt", Some(&a), &confirm)
            .await
            .unwrap();

        assert_eq!(plan.scope, DeleteScope::LinkedGroup);
        assert_eq!(asked.borrow().len(), 2);
    }

    #[tokio::test]
    async fn index_zero_is_treated_as_standalone() {
        let store = MemoryStore::new();
        let mut e = event("evt", "A");
        e.recurrence_group_id = Some("evt".to_string());
        e.recurrence_index = Some(0);

        let plan = DeletionCascadeResolver::new(&store, "events")
            .resolve("evt", Some(&e), &never_asked)
            .await
            .unwrap();
        assert_eq!(plan.scope, DeleteScope::Single);
    }
}
