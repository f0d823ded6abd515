//! Send command
//!
//! Usage: formdesk send --sender <ID> [--text <TEXT>] [--attach <TYPE>=<URI>]... [--json]

use super::{dispatcher, CliResult};
use clap::Args;
use formdesk_core::{AttachmentRef, OutboundReply, ParsedInbound};
use formdesk_engine::Dispatcher;
use std::path::Path;

#[derive(Debug, Args)]
pub struct SendArgs {
    /// Sender id as the channel reports it
    #[arg(long)]
    pub sender: String,

    /// Message text
    #[arg(long, default_value = "")]
    pub text: String,

    /// Attachment as `<content type>=<uri>`, repeatable
    #[arg(long = "attach", value_parser = parse_attachment)]
    pub attachments: Vec<AttachmentRef>,

    /// Print the reply as JSON
    #[arg(long)]
    pub json: bool,
}

/// Split `<content type>=<uri>` at the first `=`
pub fn parse_attachment(raw: &str) -> Result<AttachmentRef, String> {
    match raw.split_once('=') {
        Some((content_type, uri)) if !content_type.trim().is_empty() && !uri.is_empty() => {
            Ok(AttachmentRef::new(content_type.trim(), uri))
        }
        _ => Err(format!("expected <content type>=<uri>, got {:?}", raw)),
    }
}

pub fn print_reply(reply: &OutboundReply, json: bool) -> CliResult {
    if json {
        println!("{}", serde_json::to_string(reply)?);
    } else {
        println!("{}", reply.text);
        for uri in &reply.attachment_uris {
            println!("📎 {}", uri);
        }
    }
    Ok(())
}

pub fn execute(config_path: Option<&Path>, args: SendArgs) -> CliResult {
    let config = super::config_from(config_path)?;
    let dispatcher = dispatcher(&config)?;

    let inbound = ParsedInbound {
        sender: args.sender,
        raw_text: args.text,
        attachments: args.attachments,
    };

    match dispatcher.handle(&inbound) {
        Ok(reply) => print_reply(&reply, args.json),
        Err(e) => {
            print_reply(&Dispatcher::failure_reply(), args.json)?;
            Err(e.into())
        }
    }
}
