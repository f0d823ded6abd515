//! Formdesk Store - artifact persistence
//!
//! Provides:
//! - `ArtifactStore`: get-or-create, versioned submission and URI mapping
//! - SQLite index of stored versions and version counters, with migrations
//! - Atomic file writes for document content
//! - Per-key timed locks serializing read-modify-write on one key

pub mod artifacts;
pub mod db;
pub mod errors;
pub mod fs;
pub mod migrations;

// Re-export key types
pub use artifacts::{ArtifactStore, StoreOptions, VersionEntry};
pub use errors::Result;
