//! Replies that never touch the store

use crate::replies;
use formdesk_core::{Command, CommandVerb, DeskError, OutboundReply};

pub fn greeting() -> OutboundReply {
    OutboundReply::text(replies::GREETING)
}

pub fn help(topic: Option<CommandVerb>) -> OutboundReply {
    match topic {
        Some(verb) => OutboundReply::text(replies::help_topic(verb)),
        None => OutboundReply::text(replies::help_overview()),
    }
}

/// Reply explaining a domain error, `None` for `StorageUnavailable`
pub fn explain(err: &DeskError) -> Option<OutboundReply> {
    let text = match err {
        DeskError::ParseFailure { expected_format } => replies::parse_failure(expected_format),
        DeskError::InvalidPeriod { raw } => replies::invalid_period(raw),
        DeskError::UnsupportedAttachment { content_type } => {
            replies::unsupported_attachment(content_type)
        }
        DeskError::AccessDenied { .. } => replies::ACCESS_DENIED.to_string(),
        DeskError::StorageUnavailable { .. } => return None,
    };
    Some(OutboundReply::text(text))
}

/// Guidance for inputs that could not be turned into an action
///
/// Returns `None` for commands that have a real handler.
pub fn guidance(command: &Command) -> Option<OutboundReply> {
    match command {
        Command::Unrecognized { raw_text } => {
            Some(OutboundReply::text(replies::unrecognized(raw_text)))
        }
        _ => command.rejection().as_ref().and_then(explain),
    }
}
