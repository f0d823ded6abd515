//! Subcommands and the wiring they share

pub mod batch;
pub mod fetch;
pub mod history;
pub mod init;
pub mod send;

use formdesk_core::config::{load_config, DeskConfig};
use formdesk_engine::Dispatcher;
use formdesk_store::{ArtifactStore, StoreOptions};
use std::path::Path;
use std::sync::Arc;

pub type CliResult = Result<(), Box<dyn std::error::Error>>;

/// Config from `path`, or the defaults
pub fn config_from(path: Option<&Path>) -> Result<DeskConfig, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(load_config(path)?),
        None => Ok(DeskConfig::default()),
    }
}

pub fn open_store(config: &DeskConfig) -> Result<ArtifactStore, Box<dyn std::error::Error>> {
    Ok(ArtifactStore::open(StoreOptions::from_config(config))?)
}

pub fn dispatcher(config: &DeskConfig) -> Result<Dispatcher, Box<dyn std::error::Error>> {
    let store = Arc::new(open_store(config)?);
    Ok(Dispatcher::from_config(config, store)?)
}
