//! Batch command
//!
//! Usage: formdesk batch [--input <FILE>] [--jobs <N>]
//!
//! Reads one JSON `ParsedInbound` per line (stdin by default), handles the
//! messages on up to `--jobs` threads and prints one JSON result per input
//! line, in input order:
//!
//! ```text
//! {"line":1,"reply":{"text":"...","attachment_uris":[...]}}
//! {"line":2,"error":{"code":"ERR_STORAGE_UNAVAILABLE","message":"..."}}
//! ```

use super::{dispatcher, CliResult};
use clap::Args;
use formdesk_core::{ExErrorKind, OutboundReply, ParsedInbound};
use formdesk_engine::Dispatcher;
use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct BatchArgs {
    /// JSON-lines input file; `-` or omitted reads stdin
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Messages handled at the same time
    #[arg(long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
    pub jobs: u16,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct BatchLine {
    pub line: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<OutboundReply>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

impl BatchLine {
    fn error(line: usize, code: &str, message: impl Into<String>) -> Self {
        Self {
            line,
            reply: None,
            error: Some(ErrorBody {
                code: code.to_string(),
                message: message.into(),
            }),
        }
    }
}

fn handle_line(dispatcher: &Dispatcher, line: usize, raw: &str) -> BatchLine {
    let inbound: ParsedInbound = match serde_json::from_str(raw) {
        Ok(inbound) => inbound,
        Err(e) => {
            return BatchLine::error(line, ExErrorKind::Serialization.code(), e.to_string())
        }
    };
    match dispatcher.handle(&inbound) {
        Ok(reply) => BatchLine {
            line,
            reply: Some(reply),
            error: None,
        },
        Err(e) => BatchLine::error(line, e.code(), e.message()),
    }
}

/// Handle every non-blank line, `jobs` at a time, keeping input order
pub fn run_batch(dispatcher: &Dispatcher, input: &str, jobs: usize) -> Vec<BatchLine> {
    let lines: Vec<(usize, &str)> = input
        .lines()
        .enumerate()
        .map(|(i, raw)| (i + 1, raw.trim()))
        .filter(|(_, raw)| !raw.is_empty())
        .collect();

    let mut results = Vec::with_capacity(lines.len());
    for chunk in lines.chunks(jobs.max(1)) {
        std::thread::scope(|s| {
            let handles: Vec<_> = chunk
                .iter()
                .map(|&(line, raw)| s.spawn(move || handle_line(dispatcher, line, raw)))
                .collect();
            for (handle, &(line, _)) in handles.into_iter().zip(chunk) {
                results.push(handle.join().unwrap_or_else(|_| {
                    BatchLine::error(line, ExErrorKind::Internal.code(), "handler panicked")
                }));
            }
        });
    }
    results
}

pub fn execute(config_path: Option<&Path>, args: BatchArgs) -> CliResult {
    let config = super::config_from(config_path)?;
    let dispatcher = dispatcher(&config)?;

    let input = match args.input.as_deref() {
        Some(path) if path != Path::new("-") => std::fs::read_to_string(path)?,
        _ => {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        }
    };

    for result in run_batch(&dispatcher, &input, usize::from(args.jobs)) {
        println!("{}", serde_json::to_string(&result)?);
    }
    Ok(())
}
