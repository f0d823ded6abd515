//! Init command
//!
//! Usage: formdesk init [--out formdesk.yaml] [--force]

use super::{open_store, CliResult};
use clap::Args;
use formdesk_core::config::{parse_config_str, DeskConfig};
use std::path::{Path, PathBuf};

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Where to write the config file
    #[arg(long, default_value = "formdesk.yaml")]
    pub out: PathBuf,

    /// Overwrite an existing config file
    #[arg(long)]
    pub force: bool,
}

pub fn execute(config_path: Option<&Path>, args: InitArgs) -> CliResult {
    // An existing --config is the template; otherwise the defaults
    let config = super::config_from(config_path)?;

    if args.out.exists() && !args.force {
        return Err(format!(
            "{} already exists (use --force to overwrite)",
            args.out.display()
        )
        .into());
    }

    let yaml = serde_yaml::to_string(&config)?;
    // Whatever we write must load back
    let reloaded: DeskConfig = parse_config_str(&yaml)?;
    std::fs::write(&args.out, yaml)?;

    let store = open_store(&reloaded)?;
    println!("✓ Wrote {}", args.out.display());
    println!("✓ Store ready at {}", store.root().display());
    Ok(())
}
