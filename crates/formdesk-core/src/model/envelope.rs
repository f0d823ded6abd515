//! Inbound and outbound message envelopes
//!
//! These are the only shapes a transport adapter has to produce and consume.
//! Channel specifics (webhook form fields, media URLs, reply markup) stay in
//! the adapter.

use serde::{Deserialize, Serialize};

/// Attachment descriptor as delivered by the channel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentRef {
    /// MIME type reported by the channel, possibly with parameters
    pub content_type: String,
    /// Where the attachment bytes can be fetched from
    pub source_uri: String,
}

impl AttachmentRef {
    pub fn new(content_type: impl Into<String>, source_uri: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            source_uri: source_uri.into(),
        }
    }

    /// Media type without parameters, see [`mime_essence`]
    pub fn essence(&self) -> String {
        mime_essence(&self.content_type)
    }
}

/// Media type without parameters, lowercased (`Text/Plain; charset=x` -> `text/plain`)
pub fn mime_essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase()
}

/// One received message
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ParsedInbound {
    pub sender: String,
    #[serde(default, alias = "text")]
    pub raw_text: String,
    #[serde(default)]
    pub attachments: Vec<AttachmentRef>,
}

impl ParsedInbound {
    /// Text-only message
    pub fn text(sender: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            raw_text: raw_text.into(),
            attachments: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, attachment: AttachmentRef) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Reply handed back to the transport adapter
///
/// Attachment order is preserved end to end.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutboundReply {
    pub text: String,
    #[serde(default)]
    pub attachment_uris: Vec<String>,
}

impl OutboundReply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            attachment_uris: Vec::new(),
        }
    }

    pub fn with_attachment(mut self, uri: impl Into<String>) -> Self {
        self.attachment_uris.push(uri.into());
        self
    }
}
