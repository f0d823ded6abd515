//! Formdesk CLI
//!
//! Local transport adapter: feeds messages to the dispatcher from the
//! command line and serves stored documents back.

use clap::{Parser, Subcommand};
use formdesk_core::logging_facility::{self, Profile};
use std::path::PathBuf;

mod commands;

#[derive(Debug, Parser)]
#[command(name = "formdesk")]
#[command(about = "Formdesk - chat-driven timesheets and reports", long_about = None)]
struct Cli {
    /// YAML config file; built-in defaults apply when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log profile (development, production, test); logs go to stderr
    #[arg(long, global = true, default_value = "production")]
    log: Profile,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Write a config file and create the store
    Init(commands::init::InitArgs),
    /// Handle one message and print the reply
    Send(commands::send::SendArgs),
    /// Handle JSON-lines messages concurrently, replies in input order
    Batch(commands::batch::BatchArgs),
    /// Print or save the document behind a URI
    Fetch(commands::fetch::FetchArgs),
    /// List stored versions of a timesheet or report
    History(commands::history::HistoryArgs),
}

fn main() {
    let cli = Cli::parse();
    logging_facility::init(cli.log);

    let config = cli.config.as_deref();
    let result = match cli.command {
        Commands::Init(args) => commands::init::execute(config, args),
        Commands::Send(args) => commands::send::execute(config, args),
        Commands::Batch(args) => commands::batch::execute(config, args),
        Commands::Fetch(args) => commands::fetch::execute(config, args),
        Commands::History(args) => commands::history::execute(config, args),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
