//! Canonical schema constants for structured logging and events
//!
//! Every engine operation logs with these keys so that log consumers can
//! correlate commits, snapshots and queries without parsing messages.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";
pub const FIELD_TRACE_ID: &str = "trace_id";

// Versioning identifiers
pub const FIELD_GLOBAL_ID: &str = "global_id";
pub const FIELD_COMMIT_ID: &str = "commit_id";
pub const FIELD_AUTHOR: &str = "author";

// Number of changes, snapshots or matches an operation returned
pub const FIELD_RESULT_COUNT: &str = "result_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
