//! Command grammar
//!
//! Turns one inbound message into a [`Command`]. Parsing never fails: shapes
//! that need a specific answer come back as dedicated variants.
//!
//! Classification order:
//! 1. attachments (type decides between submission and unsupported upload)
//! 2. greeting (empty text or a configured token)
//! 3. help (`?`, `? <topic>`)
//! 4. comma-separated command with a verb from [`verbs::VERB_ALIASES`]
//! 5. anything else is `Unrecognized`

pub mod verbs;

use crate::config::DeskConfig;
use crate::model::envelope::mime_essence;
use crate::model::{AttachmentRef, Command, CommandVerb, ParsedInbound, Period, ProjectId};

/// Parser for inbound messages
///
/// Holds only configuration; `parse` is a pure function of its input.
#[derive(Debug, Clone)]
pub struct Grammar {
    greeting_tokens: Vec<String>,
    document_content_type: String,
}

impl Grammar {
    /// `document_content_type` is compared without MIME parameters, ignoring case
    pub fn new(
        greeting_tokens: impl IntoIterator<Item = impl Into<String>>,
        document_content_type: impl Into<String>,
    ) -> Self {
        let document_content_type: String = document_content_type.into();
        Self {
            greeting_tokens: greeting_tokens
                .into_iter()
                .map(Into::<String>::into)
                .map(|t| verbs::normalize(&t))
                .filter(|t| !t.is_empty())
                .collect(),
            document_content_type: mime_essence(&document_content_type),
        }
    }

    pub fn from_config(config: &DeskConfig) -> Self {
        Self::new(
            config.greeting_tokens.iter().cloned(),
            config.document_content_type.clone(),
        )
    }

    /// Classify a full inbound message
    ///
    /// A message carrying a document attachment is a submission whatever its
    /// text says.
    pub fn parse(&self, inbound: &ParsedInbound) -> Command {
        if let Some(first) = inbound.attachments.first() {
            return match inbound
                .attachments
                .iter()
                .find(|a| self.is_document(a))
            {
                Some(document) => Command::SubmitTimesheet {
                    attachment: document.clone(),
                },
                None => Command::UnsupportedAttachment {
                    content_type: first.content_type.clone(),
                },
            };
        }
        self.parse_text(&inbound.raw_text)
    }

    /// Classify message text alone
    pub fn parse_text(&self, raw_text: &str) -> Command {
        let text = raw_text.trim();
        let normalized = verbs::normalize(text);

        if normalized.is_empty() || self.greeting_tokens.contains(&normalized) {
            return Command::Greeting;
        }

        if normalized == "?" {
            return Command::Help { topic: None };
        }

        // Topic help needs a space after the '?'
        if let Some(topic) = normalized.strip_prefix("? ") {
            return match verbs::match_topic(topic.trim()) {
                Some(verb) => Command::Help { topic: Some(verb) },
                None => Command::Unrecognized {
                    raw_text: raw_text.to_string(),
                },
            };
        }

        let fields: Vec<&str> = text.split(',').map(str::trim).collect();
        match verbs::match_verb(fields[0]) {
            Some(verb) => parse_fields(verb, &fields),
            None => Command::Unrecognized {
                raw_text: raw_text.to_string(),
            },
        }
    }

    /// Whether the attachment has the configured document type
    pub fn is_document(&self, attachment: &AttachmentRef) -> bool {
        attachment.essence() == self.document_content_type
    }
}

fn parse_fields(verb: CommandVerb, fields: &[&str]) -> Command {
    let usage = Command::ParseFailure {
        verb,
        expected_format: verb.expected_format(),
    };

    // Only reachable without an attachment: submissions are recognised by type
    let Some(count) = verb.field_count() else {
        return usage;
    };
    if fields.len() != count || fields[1].is_empty() {
        return usage;
    }

    let project_id = ProjectId::new(fields[1]);
    match verb {
        CommandVerb::RequestTimesheet => Command::RequestTimesheet { project_id },
        CommandVerb::RequestReport => match fields[2].parse::<Period>() {
            Ok(period) => Command::RequestReport { project_id, period },
            Err(_) => Command::InvalidPeriod {
                raw: fields[2].to_string(),
            },
        },
        CommandVerb::SubmitTimesheet => usage,
    }
}
