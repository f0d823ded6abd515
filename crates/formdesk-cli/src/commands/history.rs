//! History command
//!
//! Usage: formdesk history --project <ID> [--report <weekly|monthly|yyyy>] [--json]

use super::{open_store, CliResult};
use clap::Args;
use formdesk_core::{ArtifactKey, Period, ProjectId};
use std::path::Path;

#[derive(Debug, Args)]
pub struct HistoryArgs {
    #[arg(long)]
    pub project: String,

    /// List a report instead of the timesheet
    #[arg(long, value_parser = parse_period)]
    pub report: Option<Period>,

    /// Print entries as JSON lines
    #[arg(long)]
    pub json: bool,
}

fn parse_period(raw: &str) -> Result<Period, String> {
    raw.parse::<Period>().map_err(|e| e.to_string())
}

pub fn execute(config_path: Option<&Path>, args: HistoryArgs) -> CliResult {
    let config = super::config_from(config_path)?;
    let store = open_store(&config)?;

    let project_id = ProjectId::new(args.project);
    let key = match args.report {
        Some(period) => ArtifactKey::report(project_id, period),
        None => ArtifactKey::timesheet(project_id),
    };

    let entries = store.history(&key)?;
    if entries.is_empty() && !args.json {
        println!("No versions stored for {}", key);
    }
    for entry in &entries {
        if args.json {
            println!("{}", serde_json::to_string(entry)?);
        } else {
            println!(
                "v{}\t{}\t{} bytes\t{}\t{}",
                entry.version,
                entry.created_at.to_rfc3339(),
                entry.size_bytes,
                &entry.content_digest[..12.min(entry.content_digest.len())],
                store.entry_uri(entry)
            );
        }
    }
    Ok(())
}
