//! Typed commands produced by the grammar
//!
//! One `Command` is produced per inbound message and consumed by exactly one
//! handler. Parse outcomes that need a specific reply (`ParseFailure`,
//! `InvalidPeriod`, `UnsupportedAttachment`) are variants too, so the
//! grammar never fails.

use crate::errors::DeskError;
use crate::model::{AttachmentRef, Period, ProjectId};

/// Canonical command verbs
///
/// Aliases (`form request`, `form submit`, `request report`) resolve to one
/// of these in the grammar's verb table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandVerb {
    RequestTimesheet,
    SubmitTimesheet,
    RequestReport,
}

impl CommandVerb {
    pub const ALL: [CommandVerb; 3] = [
        CommandVerb::RequestTimesheet,
        CommandVerb::SubmitTimesheet,
        CommandVerb::RequestReport,
    ];

    /// Canonical phrase a user types
    pub fn phrase(&self) -> &'static str {
        match self {
            CommandVerb::RequestTimesheet => "request timesheet",
            CommandVerb::SubmitTimesheet => "submit timesheet",
            CommandVerb::RequestReport => "report",
        }
    }

    /// Usage line echoed back when the fields do not fit
    pub fn expected_format(&self) -> &'static str {
        match self {
            CommandVerb::RequestTimesheet => "request timesheet, <project id>",
            CommandVerb::SubmitTimesheet => {
                "submit timesheet: send the filled-in timesheet as a document attachment"
            }
            CommandVerb::RequestReport => "report, <project id>, <weekly|monthly|yyyy>",
        }
    }

    /// Number of comma-separated fields including the verb, if fixed
    pub fn field_count(&self) -> Option<usize> {
        match self {
            CommandVerb::RequestTimesheet => Some(2),
            CommandVerb::SubmitTimesheet => None,
            CommandVerb::RequestReport => Some(3),
        }
    }
}

/// Result of parsing one inbound message
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    RequestTimesheet {
        project_id: ProjectId,
    },
    /// Classified by attachment type alone; message text is ignored
    SubmitTimesheet {
        attachment: AttachmentRef,
    },
    RequestReport {
        project_id: ProjectId,
        period: Period,
    },
    Help {
        topic: Option<CommandVerb>,
    },
    Greeting,
    /// Known verb, wrong shape
    ParseFailure {
        verb: CommandVerb,
        expected_format: &'static str,
    },
    InvalidPeriod {
        raw: String,
    },
    UnsupportedAttachment {
        content_type: String,
    },
    Unrecognized {
        raw_text: String,
    },
}

impl Command {
    /// Stable snake_case name used as the `op` of dispatch log events
    pub fn name(&self) -> &'static str {
        match self {
            Command::RequestTimesheet { .. } => "request_timesheet",
            Command::SubmitTimesheet { .. } => "submit_timesheet",
            Command::RequestReport { .. } => "request_report",
            Command::Help { .. } => "help",
            Command::Greeting => "greeting",
            Command::ParseFailure { .. } => "parse_failure",
            Command::InvalidPeriod { .. } => "invalid_period",
            Command::UnsupportedAttachment { .. } => "unsupported_attachment",
            Command::Unrecognized { .. } => "unrecognized",
        }
    }

    /// Project named in the message text, if any
    pub fn project_id(&self) -> Option<&ProjectId> {
        match self {
            Command::RequestTimesheet { project_id }
            | Command::RequestReport { project_id, .. } => Some(project_id),
            _ => None,
        }
    }

    /// Domain error for parse outcomes that are answered with guidance
    pub fn rejection(&self) -> Option<DeskError> {
        match self {
            Command::ParseFailure {
                expected_format, ..
            } => Some(DeskError::ParseFailure {
                expected_format: expected_format.to_string(),
            }),
            Command::InvalidPeriod { raw } => Some(DeskError::InvalidPeriod { raw: raw.clone() }),
            Command::UnsupportedAttachment { content_type } => {
                Some(DeskError::UnsupportedAttachment {
                    content_type: content_type.clone(),
                })
            }
            _ => None,
        }
    }
}
