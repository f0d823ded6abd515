//! Fetch command
//!
//! Usage: formdesk fetch <URI> [--out <FILE>]

use super::{open_store, CliResult};
use clap::Args;
use std::io::Write;
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// URI from a reply's attachment list
    pub uri: String,

    /// Write to this file instead of stdout
    #[arg(long)]
    pub out: Option<PathBuf>,
}

pub fn execute(config_path: Option<&Path>, args: FetchArgs) -> CliResult {
    let config = super::config_from(config_path)?;
    let store = open_store(&config)?;
    let content = store.read_uri(&args.uri)?;

    match args.out {
        Some(path) => {
            std::fs::write(&path, &content)?;
            eprintln!("✓ Wrote {} bytes to {}", content.len(), path.display());
        }
        None => std::io::stdout().lock().write_all(&content)?,
    }
    Ok(())
}
