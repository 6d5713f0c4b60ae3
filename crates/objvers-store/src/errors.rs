//! Error handling for objvers-store
//!
//! Wraps objvers-core ExError with store-specific helpers

use objvers_core::errors::{ExError, ExErrorKind};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Repository)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error for an already-applied migration
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Repository)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a schema file validation error
pub fn schema_validation(reason: &str) -> ExError {
    ExError::new(ExErrorKind::Validation)
        .with_op("schema_parse")
        .with_message(reason.to_string())
}

/// Create an object document error
pub fn document_error(reason: &str) -> ExError {
    ExError::new(ExErrorKind::Validation)
        .with_op("document_parse")
        .with_message(reason.to_string())
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Repository)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create a serialization error for a stored column
pub fn column_codec(column: &str, err: serde_json::Error) -> ExError {
    ExError::new(ExErrorKind::Serialization)
        .with_op("sqlite_codec")
        .with_message(format!("column {}: {}", column, err))
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Repository)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
