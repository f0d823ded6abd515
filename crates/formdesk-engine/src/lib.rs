//! Formdesk Engine - Command handling
//!
//! Composes the grammar, the access policy and the artifact store into
//! replies:
//! - `Dispatcher`: one entry point per inbound message
//! - `handlers`: one handler per command kind
//! - `ingest`: fetching attachment bytes from the URIs a channel hands us
//! - `replies`: canned reply texts and the help table

pub mod dispatcher;
pub mod documents;
pub mod handlers;
pub mod ingest;
pub mod replies;

pub use dispatcher::Dispatcher;
pub use ingest::{AttachmentFetcher, UriFetcher};
