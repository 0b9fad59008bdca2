/// Largest number of writes committed in one atomic batch.
/// One below the store's 500-operation ceiling.
pub const MAX_CHUNK: usize = 499;

/// Hard ceiling on operations per atomic write enforced by the store.
pub const STORE_BATCH_LIMIT: usize = 500;

pub const DEFAULT_EVENTS_COLLECTION: &str = "events";
pub const DEFAULT_ARCHIVE_COLLECTION: &str = "archived_events";
pub const DEFAULT_BUCKET_COLLECTION: &str = "bucket_items";

// Document field names used for store queries.
pub const FIELD_RELATED_GROUP_ID: &str = "relatedGroupId";
pub const FIELD_RECURRENCE_GROUP_ID: &str = "recurrenceGroupId";
pub const FIELD_RECURRENCE_INDEX: &str = "recurrenceIndex";
pub const FIELD_DEPARTMENT_ID: &str = "departmentId";
pub const FIELD_ATTENDANCE: &str = "attendance";
