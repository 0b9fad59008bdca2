//! Persistence engine for multi-department calendar events.
//!
//! Turns one user-edited event into a recurring series replicated across
//! departments, keeps the department siblings consistent on edit, and
//! deletes single occurrences, linked groups or the rest of a series.
//!
//! - `recurrence` expands a base date range into occurrences
//! - `fanout` plans one document per department for an occurrence
//! - `reconcile` diffs a desired sibling set against the store
//! - `batch` commits write lists in bounded atomic chunks
//! - `deletion` resolves what a delete request removes
//! - `engine` ties them together behind `EventEngine`

pub mod batch;
pub mod config;
pub mod constants;
pub mod deletion;
pub mod diff;
pub mod engine;
pub mod error;
pub mod event;
pub mod fanout;
pub mod ids;
pub mod reconcile;
pub mod recurrence;
pub mod store;

pub use engine::{AttendanceOutcome, DeleteOutcome, EventEngine, SaveOutcome};
pub use error::{DeptCalError, DeptCalResult};
pub use event::*;
