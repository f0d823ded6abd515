//! Desk configuration
//!
//! Loaded from a YAML file at process start and passed explicitly to the
//! grammar, the access policy and the store. Every field has a default so an
//! empty document is a valid config.
//!
//! ```yaml
//! schema_version: 0
//! greeting_tokens: [start, join]
//! document_content_type: application/vnd.openxmlformats-officedocument.spreadsheetml.sheet
//! document_extension: xlsx
//! allowed_projects: [P1234]
//! sender_projects:
//!   "whatsapp:+15550001111": [P9000]
//! submit_project: P1234
//! storage:
//!   root: .formdesk
//!   public_base_url: http://localhost:5000/files
//!   io_timeout_ms: 5000
//!   max_attachment_bytes: 10485760
//!   ingest_dir: /var/spool/formdesk
//! ```

use crate::errors::{ExError, ExErrorKind, Result};
use crate::model::ProjectId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// MIME type of `.xlsx` workbooks
pub const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Default upper bound for one fetched attachment (10 MiB)
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 10 * 1024 * 1024;

/// Top-level configuration document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeskConfig {
    /// Schema version (must be 0 for this format)
    pub schema_version: u32,

    /// Texts answered with the welcome message, compared case-insensitively
    pub greeting_tokens: Vec<String>,

    /// The only attachment type accepted as a timesheet submission
    pub document_content_type: String,

    /// File extension for stored documents
    pub document_extension: String,

    /// Projects every sender may act on
    pub allowed_projects: Vec<String>,

    /// Extra projects granted to individual senders
    pub sender_projects: BTreeMap<String, Vec<String>>,

    /// Project every timesheet submission is filed under
    ///
    /// Submissions are classified by attachment alone and carry no project
    /// in their text, so the binding is configured here.
    pub submit_project: String,

    pub storage: StorageConfig,
}

/// Artifact store settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the index database and document files
    pub root: PathBuf,

    /// Prefix under which the transport adapter serves `root`
    pub public_base_url: String,

    /// Upper bound for lock waits, SQLite busy waits and attachment downloads
    pub io_timeout_ms: u64,

    /// Largest attachment accepted from any source
    pub max_attachment_bytes: u64,

    /// Directory local attachment paths must resolve into
    ///
    /// Unset means `file://` URIs and bare paths are refused.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ingest_dir: Option<PathBuf>,
}

impl Default for DeskConfig {
    fn default() -> Self {
        Self {
            schema_version: 0,
            greeting_tokens: vec!["start".to_string(), "join".to_string()],
            document_content_type: XLSX_CONTENT_TYPE.to_string(),
            document_extension: "xlsx".to_string(),
            allowed_projects: vec!["P1234".to_string()],
            sender_projects: BTreeMap::new(),
            submit_project: "P1234".to_string(),
            storage: StorageConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from(".formdesk"),
            public_base_url: "http://localhost:5000/files".to_string(),
            io_timeout_ms: 5_000,
            max_attachment_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
            ingest_dir: None,
        }
    }
}

impl StorageConfig {
    pub fn io_timeout(&self) -> Duration {
        Duration::from_millis(self.io_timeout_ms)
    }
}

fn config_error(reason: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidConfig)
        .with_op("load_config")
        .with_message(reason)
}

/// Load and validate a config file
pub fn load_config(path: &Path) -> Result<DeskConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        config_error(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;
    parse_config_str(&content)
}

/// Parse and validate a config document
pub fn parse_config_str(content: &str) -> Result<DeskConfig> {
    // An empty document deserializes as unit, not a map
    let config: DeskConfig = if content.trim().is_empty() {
        DeskConfig::default()
    } else {
        serde_yaml::from_str(content)
            .map_err(|e| config_error(format!("YAML parse error: {}", e)))?
    };

    validate_config(&config)?;
    Ok(config)
}

/// Validate a config built in code or parsed from YAML
pub fn validate_config(config: &DeskConfig) -> Result<()> {
    if config.schema_version != 0 {
        return Err(config_error(format!(
            "Unsupported schema_version: {}. Expected 0",
            config.schema_version
        )));
    }

    if config.submit_project.trim().is_empty() {
        return Err(config_error("submit_project must not be empty"));
    }

    // Project ids become directory names in the store
    let granted = config.sender_projects.values().flatten();
    for id in std::iter::once(&config.submit_project)
        .chain(&config.allowed_projects)
        .chain(granted)
    {
        if !ProjectId::new(id.as_str()).is_path_safe() {
            return Err(config_error(format!(
                "Project id {:?} may only contain letters, digits, '-', '_' and '.'",
                id
            )));
        }
    }

    if config.document_content_type.trim().is_empty() {
        return Err(config_error("document_content_type must not be empty"));
    }

    if config.document_extension.is_empty()
        || !config
            .document_extension
            .chars()
            .all(|c| c.is_ascii_alphanumeric())
    {
        return Err(config_error(format!(
            "document_extension must be alphanumeric, got {:?}",
            config.document_extension
        )));
    }

    if config.storage.io_timeout_ms == 0 {
        return Err(config_error("storage.io_timeout_ms must be positive"));
    }

    if config.storage.max_attachment_bytes == 0 {
        return Err(config_error("storage.max_attachment_bytes must be positive"));
    }

    let base = &config.storage.public_base_url;
    if !(base.starts_with("http://") || base.starts_with("https://")) {
        return Err(config_error(format!(
            "storage.public_base_url must be an http(s) URL, got {}",
            base
        )));
    }

    Ok(())
}
