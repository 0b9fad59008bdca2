//! The event persistence engine.
//!
//! `EventEngine` is the public entry point: it saves drafts (expanding
//! recurrence and department fan-out, or reconciling an existing linked
//! group), deletes events with their cascades, and applies attendance
//! changes across a series. Every operation builds one `UnitOfWork` and
//! hands it to the batch coordinator.
//!
//! The engine performs no authorization. Callers check permissions first.

use chrono::Utc;
use serde_json::{Map, Value};
use tracing::{debug, error, info, instrument};

use crate::batch::BatchCoordinator;
use crate::config::EngineConfig;
use crate::constants::{FIELD_ATTENDANCE, FIELD_RECURRENCE_GROUP_ID};
use crate::deletion::{Confirmation, DeleteScope, DeletionCascadeResolver};
use crate::diff::{UnitOfWork, WriteOp};
use crate::error::DeptCalResult;
use crate::event::{AttendanceStatus, Event, EventDraft};
use crate::fanout::plan_fanout;
use crate::ids::{check_distinct_dept_ids, occurrence_base_id};
use crate::recurrence;
use crate::reconcile::SiblingReconciler;
use crate::store::DocumentStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveOutcome {
    /// Documents written (created or overwritten).
    pub created_count: usize,
    /// Logical occurrences saved.
    pub occurrences: usize,
    /// Reconciliation found no stored group and planned a fresh fan-out.
    pub fell_back: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: usize,
    pub scope: DeleteScope,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttendanceOutcome {
    pub updated_count: usize,
}

pub struct EventEngine<S> {
    store: S,
    config: EngineConfig,
}

impl<S: DocumentStore> EventEngine<S> {
    pub fn new(store: S, config: EngineConfig) -> Self {
        EventEngine { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn coordinator(&self) -> BatchCoordinator<'_> {
        BatchCoordinator::with_max_chunk(&self.store, self.config.max_chunk)
    }

    /// Save a draft.
    ///
    /// With `recurrence_count > 1` and a recurring type the draft becomes a
    /// new series of that many occurrences. Otherwise it is saved as one
    /// occurrence, reconciling its linked group when it has one.
    #[instrument(skip_all, fields(event_id = %draft.event.id))]
    pub async fn save_event(&self, draft: EventDraft, recurrence_count: Option<usize>) -> DeptCalResult<SaveOutcome> {
        let result = self.try_save(draft, recurrence_count).await;
        if let Err(e) = &result {
            error!(error = %e, "Saving event failed");
        }
        result
    }

    async fn try_save(&self, draft: EventDraft, recurrence_count: Option<usize>) -> DeptCalResult<SaveOutcome> {
        let EventDraft {
            mut event,
            pending_bucket_id,
        } = draft;

        let targets = event.target_department_ids();
        check_distinct_dept_ids(&targets)?;

        if event.is_archived {
            self.store
                .delete(&self.config.archive_collection, &event.id)
                .await?;
            event.is_archived = false;
            debug!("Removed event from archive before saving");
        }
        let now = Utc::now().to_rfc3339();
        let persisted = event.created_at.is_some();
        if !persisted {
            event.created_at = Some(now.clone());
        }
        event.updated_at = Some(now);

        let count = recurrence_count.unwrap_or(1);

        let (work, occurrences, fell_back) = if count > 1 && event.recurrence_type.is_recurring() {
            debug!(count, recurrence_type = ?event.recurrence_type, departments = targets.len(), "Saving new series");
            let work = self.plan_series(&event, &targets, count)?;
            (work, count, false)
        } else {
            event.version += 1;
            debug!(departments = targets.len(), linked = event.related_group_id.is_some(), "Saving single occurrence");
            let reconciliation = SiblingReconciler::new(&self.store, &self.config.events_collection)
                .reconcile(&event, &targets, persisted)
                .await?;
            (reconciliation.work, 1, reconciliation.fell_back)
        };

        let (created, updated, _) = work.counts();
        self.coordinator().commit(work).await?;

        if let Some(bucket_id) = pending_bucket_id {
            self.store
                .delete(&self.config.bucket_collection, &bucket_id)
                .await?;
            debug!(bucket_id = %bucket_id, "Removed converted bucket item");
        }

        let created_count = created + updated;
        info!(created_count, occurrences, "Event saved");

        Ok(SaveOutcome {
            created_count,
            occurrences,
            fell_back,
        })
    }

    /// Creates for every department of every occurrence, occurrence-major.
    fn plan_series(&self, event: &Event, targets: &[String], count: usize) -> DeptCalResult<UnitOfWork> {
        let collection = &self.config.events_collection;
        let occurrences = recurrence::expand(event.start_date, event.end_date, event.recurrence_type, count)?;

        let mut work = UnitOfWork::new();
        for occurrence in &occurrences {
            let mut template = event.clone();
            template.id = occurrence_base_id(&event.id, occurrence.index);
            template.start_date = occurrence.start;
            template.end_date = occurrence.end;
            template.recurrence_group_id = Some(event.id.clone());
            template.recurrence_index = Some(occurrence.recurrence_index());
            template.related_group_id = None;

            for doc in plan_fanout(&template, &template.id, targets) {
                work = work.with(WriteOp::create(collection, &doc)?);
            }
        }

        Ok(work)
    }

    /// Delete `id`, widening to siblings or later occurrences as the user
    /// confirms.
    #[instrument(skip_all, fields(event_id = id))]
    pub async fn delete_event(
        &self,
        id: &str,
        event: Option<&Event>,
        confirm: &dyn Confirmation,
    ) -> DeptCalResult<DeleteOutcome> {
        let result = self.try_delete(id, event, confirm).await;
        if let Err(e) = &result {
            error!(error = %e, "Deleting event failed");
        }
        result
    }

    async fn try_delete(
        &self,
        id: &str,
        event: Option<&Event>,
        confirm: &dyn Confirmation,
    ) -> DeptCalResult<DeleteOutcome> {
        let collection = &self.config.events_collection;
        let plan = DeletionCascadeResolver::new(&self.store, collection)
            .resolve(id, event, confirm)
            .await?;

        if plan.scope == DeleteScope::Cancelled {
            info!("Delete cancelled");
            return Ok(DeleteOutcome {
                deleted_count: 0,
                scope: plan.scope,
            });
        }

        let work: UnitOfWork = plan
            .ids
            .iter()
            .map(|doc_id| WriteOp::delete(collection, doc_id))
            .collect();
        let deleted_count = work.len();
        self.coordinator().commit(work).await?;

        info!(deleted_count, scope = ?plan.scope, "Event deleted");
        Ok(DeleteOutcome {
            deleted_count,
            scope: plan.scope,
        })
    }

    /// Set one participant's attendance on every document of a series.
    #[instrument(skip_all, fields(recurrence_group_id = recurrence_group_id))]
    pub async fn batch_update_attendance(
        &self,
        recurrence_group_id: &str,
        participant_id: &str,
        status: AttendanceStatus,
    ) -> DeptCalResult<AttendanceOutcome> {
        let result = self
            .try_update_attendance(recurrence_group_id, participant_id, status)
            .await;
        if let Err(e) = &result {
            error!(error = %e, "Updating attendance failed");
        }
        result
    }

    async fn try_update_attendance(
        &self,
        recurrence_group_id: &str,
        participant_id: &str,
        status: AttendanceStatus,
    ) -> DeptCalResult<AttendanceOutcome> {
        let collection = &self.config.events_collection;
        let docs = self
            .store
            .query(collection, FIELD_RECURRENCE_GROUP_ID, &Value::from(recurrence_group_id))
            .await?;

        let mut work = UnitOfWork::new();
        for doc in &docs {
            let mut attendance = doc.to_event()?.attendance;
            attendance.insert(participant_id.to_string(), status);

            let mut fields = Map::new();
            fields.insert(FIELD_ATTENDANCE.to_string(), serde_json::to_value(&attendance)?);
            work = work.with(WriteOp::patch(collection, &doc.id, fields));
        }

        let updated_count = work.len();
        self.coordinator().commit(work).await?;

        info!(updated_count, ?status, "Attendance updated");
        Ok(AttendanceOutcome { updated_count })
    }
}
