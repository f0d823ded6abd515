//! Formdesk Core - command grammar, access policy and domain model
//!
//! This crate holds everything about the chat document workflow that does
//! not touch storage:
//! - Inbound/outbound envelopes exchanged with a transport adapter
//! - The typed `Command` produced by the grammar, with `Period` and `ProjectId`
//! - Artifact keys and records shared with the store
//! - The access policy seam
//! - YAML configuration
//! - The error and logging facilities used by every Formdesk crate

pub mod config;
pub mod errors;
pub mod grammar;
pub mod logging_facility;
pub mod model;
pub mod policy;

// Re-export commonly used types
pub use config::DeskConfig;
pub use errors::{DeskError, ExError, ExErrorKind, Result};
pub use grammar::Grammar;
pub use model::{
    ArtifactKey, ArtifactKind, ArtifactRecord, AttachmentRef, Command, CommandVerb,
    OutboundReply, ParsedInbound, Period, ProjectId,
};
pub use policy::{AccessPolicy, AllowListPolicy, DenyAllPolicy};

// Used by the exported logging macros.
#[doc(hidden)]
pub use formdesk_core_types as __types;
