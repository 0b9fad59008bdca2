//! Event data model.
//!
//! An `Event` is the persisted unit: one document per department per
//! occurrence. Documents are stored as camelCase JSON, so the field names
//! here double as store query fields (see `constants`).

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A calendar event document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: String,
    pub title: String,
    /// First day of the event (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the event (inclusive).
    pub end_date: NaiveDate,

    /// Department this document instance belongs to.
    #[serde(default)]
    pub department_id: String,
    /// Every department the logical event spans. Identical on all siblings.
    #[serde(default)]
    pub department_ids: Vec<String>,

    // Recurrence
    #[serde(default)]
    pub recurrence_type: RecurrenceType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_group_id: Option<String>,
    /// 1-based position within the series. Absent or 0 means not generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recurrence_index: Option<u32>,

    /// Shared by department siblings of one logical occurrence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_group_id: Option<String>,

    /// Advisory revision counter. Last write wins.
    #[serde(default)]
    pub version: u64,

    /// Participant id -> response.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attendance: BTreeMap<String, AttendanceStatus>,

    // Display
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_time: Option<String>,
    #[serde(default)]
    pub is_all_day: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    // Authorship
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,

    /// Set when the event was loaded from the archive collection.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_archived: bool,
}

impl Event {
    /// A minimal single-department event.
    pub fn new(id: &str, title: &str, department_id: &str, start: NaiveDate, end: NaiveDate) -> Self {
        Event {
            id: id.to_string(),
            title: title.to_string(),
            start_date: start,
            end_date: end,
            department_id: department_id.to_string(),
            department_ids: vec![department_id.to_string()],
            recurrence_type: RecurrenceType::None,
            recurrence_group_id: None,
            recurrence_index: None,
            related_group_id: None,
            version: 0,
            attendance: BTreeMap::new(),
            description: None,
            start_time: None,
            end_time: None,
            is_all_day: true,
            color: None,
            tags: Vec::new(),
            author_id: None,
            author_name: None,
            created_at: None,
            updated_at: None,
            is_archived: false,
        }
    }

    /// Departments this event should be written to.
    /// An empty `department_ids` falls back to the primary department.
    /// Repeated departments are dropped, keeping first-seen order.
    pub fn target_department_ids(&self) -> Vec<String> {
        if self.department_ids.is_empty() {
            return vec![self.department_id.clone()];
        }
        let mut targets: Vec<String> = Vec::with_capacity(self.department_ids.len());
        for id in &self.department_ids {
            if !targets.contains(id) {
                targets.push(id.clone());
            }
        }
        targets
    }

    /// True when this document is an occurrence of a generated series.
    ///
    /// Index 0 counts as "not part of a series"; generated indices start at 1.
    pub fn is_recurring_occurrence(&self) -> bool {
        self.recurrence_group_id.is_some() && self.recurrence_index.unwrap_or(0) > 0
    }

    /// Whole days between start and end.
    pub fn duration_days(&self) -> i64 {
        (self.end_date - self.start_date).num_days()
    }
}

/// How an event repeats. Unknown values deserialize to `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecurrenceType {
    Daily,
    Weekdays,
    Weekends,
    Weekly,
    Monthly,
    Yearly,
    #[default]
    #[serde(other)]
    None,
}

/// A participant's response to an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceStatus {
    Pending,
    Joined,
    Declined,
}

/// A user-edited event submitted for saving.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDraft {
    #[serde(flatten)]
    pub event: Event,

    /// Bucket item being converted into this event, removed after a successful save.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_bucket_id: Option<String>,
}

impl From<Event> for EventDraft {
    fn from(event: Event) -> Self {
        EventDraft {
            event,
            pending_bucket_id: None,
        }
    }
}
