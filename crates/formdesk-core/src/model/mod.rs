//! Domain model
//!
//! - `ParsedInbound` / `OutboundReply`: envelopes exchanged with a transport adapter
//! - `Command`: the typed result of parsing one inbound message
//! - `Period`, `ProjectId`: command arguments
//! - `ArtifactKey` / `ArtifactRecord`: addressing and content of stored documents

pub mod artifact;
pub mod command;
pub mod envelope;
pub mod period;
pub mod project;

pub use artifact::{ArtifactKey, ArtifactKind, ArtifactRecord};
pub use command::{Command, CommandVerb};
pub use envelope::{AttachmentRef, OutboundReply, ParsedInbound};
pub use period::Period;
pub use project::ProjectId;
