//! Artifact store
//!
//! - `store`: the public `ArtifactStore`
//! - `index`: SQL over the `artifacts` and `artifact_counters` tables
//! - `locks`: per-key timed locks

mod index;
mod locks;
mod store;

pub use index::VersionEntry;
pub use store::{ArtifactStore, StoreOptions};
