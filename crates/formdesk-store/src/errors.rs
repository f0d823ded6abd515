//! Error handling for formdesk-store
//!
//! Wraps formdesk-core ExError with store-specific helpers. Anything that
//! means "the backing storage cannot serve us right now" maps to
//! `StorageUnavailable`; integrity problems map to `Persistence`.

use formdesk_core::errors::{ExError, ExErrorKind};
use rusqlite::ErrorCode;
use std::time::Duration;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration_checksum")
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    let kind = match &err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked
            | ErrorCode::CannotOpen
            | ErrorCode::DiskFull
            | ErrorCode::ReadOnly
            | ErrorCode::PermissionDenied
            | ErrorCode::SystemIoFailure => ExErrorKind::StorageUnavailable,
            _ => ExErrorKind::Persistence,
        },
        _ => ExErrorKind::Persistence,
    };
    ExError::new(kind)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
///
/// Missing files map to `NotFound`; every other failure (permissions, disk
/// full, ...) means storage is unavailable.
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    let kind = match err.kind() {
        std::io::ErrorKind::NotFound => ExErrorKind::NotFound,
        _ => ExErrorKind::StorageUnavailable,
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create a lock wait timeout error
pub fn lock_timeout(lock_name: &str, waited: Duration) -> ExError {
    ExError::new(ExErrorKind::StorageUnavailable)
        .with_op("acquire_key_lock")
        .with_message(format!(
            "Timed out after {}ms waiting for {}",
            waited.as_millis(),
            lock_name
        ))
}

/// Create an invalid key error
pub fn invalid_key(op: &str, reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(op.to_string())
        .with_message(reason)
}

/// Create an error for an index row whose content file is gone
pub fn missing_content(rel_path: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("read_content")
        .with_message(format!("Indexed artifact has no content at {}", rel_path))
}

/// Create an error for a URI this store does not serve
pub fn unknown_uri(uri: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op("read_uri")
        .with_message(format!("URI is not served by this store: {}", uri))
}
