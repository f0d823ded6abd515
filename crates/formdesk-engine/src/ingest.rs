//! Attachment ingestion
//!
//! Channels hand over attachments as URIs. `UriFetcher` understands:
//! - `http://` and `https://` (blocking client with the configured timeout)
//! - `data:` URIs, base64 or plain
//! - `file://` URIs and bare filesystem paths, only inside the configured
//!   ingest directory
//!
//! Every failure is reported as storage unavailable: the bytes could not be
//! obtained right now and the sender should try again. Bodies larger than
//! the configured limit are refused the same way.

#![allow(clippy::result_large_err)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use formdesk_core::config::{StorageConfig, DEFAULT_MAX_ATTACHMENT_BYTES};
use formdesk_core::errors::{ExError, ExErrorKind, Result};
use formdesk_core::{AttachmentRef, DeskError};
use std::fs::File;
use std::io::Read;
use std::path::PathBuf;
use std::time::Duration;

/// Source of attachment bytes
pub trait AttachmentFetcher: Send + Sync {
    /// Fetch the full content of `attachment`
    fn fetch(&self, attachment: &AttachmentRef) -> Result<Vec<u8>>;
}

/// Fetcher dispatching on the URI scheme
#[derive(Debug, Clone)]
pub struct UriFetcher {
    client: reqwest::blocking::Client,
    ingest_dir: Option<PathBuf>,
    max_bytes: u64,
}

/// Scheme part of a URI for log-safe error messages
fn scheme_of(uri: &str) -> &str {
    uri.split_once(':').map(|(scheme, _)| scheme).unwrap_or("path")
}

fn fetch_error(uri: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::from(DeskError::StorageUnavailable {
        reason: format!("Could not fetch {} attachment: {}", scheme_of(uri), reason),
    })
    .with_op("fetch_attachment")
}

/// Read at most `limit` bytes, failing when the source holds more
fn read_limited(uri: &str, reader: impl Read, limit: u64) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    reader
        .take(limit.saturating_add(1))
        .read_to_end(&mut buf)
        .map_err(|e| fetch_error(uri, e))?;
    check_size(uri, buf, limit)
}

fn check_size(uri: &str, bytes: Vec<u8>, limit: u64) -> Result<Vec<u8>> {
    if bytes.len() as u64 > limit {
        return Err(fetch_error(uri, format!("attachment exceeds {} bytes", limit)));
    }
    Ok(bytes)
}

impl UriFetcher {
    /// Fetcher for remote and `data:` URIs; local paths are refused
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("build_http_client")
                    .with_message(e.to_string())
            })?;
        Ok(Self {
            client,
            ingest_dir: None,
            max_bytes: DEFAULT_MAX_ATTACHMENT_BYTES,
        })
    }

    pub fn from_config(storage: &StorageConfig) -> Result<Self> {
        let fetcher = Self::new(storage.io_timeout())?.with_max_bytes(storage.max_attachment_bytes);
        Ok(match &storage.ingest_dir {
            Some(dir) => fetcher.with_ingest_dir(dir.clone()),
            None => fetcher,
        })
    }

    /// Accept local paths that resolve inside `dir`
    pub fn with_ingest_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.ingest_dir = Some(dir.into());
        self
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn fetch_http(&self, uri: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(uri)
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|e| fetch_error(uri, e))?;
        if response
            .content_length()
            .is_some_and(|len| len > self.max_bytes)
        {
            return Err(fetch_error(
                uri,
                format!("attachment exceeds {} bytes", self.max_bytes),
            ));
        }
        read_limited(uri, response, self.max_bytes)
    }

    fn fetch_file(&self, uri: &str, path: &str) -> Result<Vec<u8>> {
        let Some(dir) = &self.ingest_dir else {
            return Err(fetch_error(uri, "local paths are not accepted"));
        };
        let root = dir.canonicalize().map_err(|e| fetch_error(uri, e))?;
        // Relative paths are taken relative to the ingest directory
        let resolved = root
            .join(path)
            .canonicalize()
            .map_err(|e| fetch_error(uri, e))?;
        if !resolved.starts_with(&root) {
            return Err(fetch_error(uri, "path is outside the ingest directory"));
        }
        let file = File::open(&resolved).map_err(|e| fetch_error(uri, e))?;
        read_limited(uri, file, self.max_bytes)
    }
}

/// Decode a `data:[<mediatype>][;base64],<payload>` URI
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| fetch_error(uri, "not a data URI"))?;
    let (meta, payload) = rest
        .split_once(',')
        .ok_or_else(|| fetch_error(uri, "missing ',' separator"))?;

    if meta
        .split(';')
        .any(|param| param.trim().eq_ignore_ascii_case("base64"))
    {
        STANDARD
            .decode(payload.trim())
            .map_err(|e| fetch_error(uri, e))
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

impl AttachmentFetcher for UriFetcher {
    fn fetch(&self, attachment: &AttachmentRef) -> Result<Vec<u8>> {
        let uri = attachment.source_uri.trim();
        let lower = uri.to_ascii_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            self.fetch_http(uri)
        } else if lower.starts_with("data:") {
            check_size(uri, decode_data_uri(uri)?, self.max_bytes)
        } else if let Some(path) = uri.strip_prefix("file://") {
            self.fetch_file(uri, path)
        } else if uri.is_empty() {
            Err(fetch_error(uri, "empty source URI"))
        } else {
            self.fetch_file(uri, uri)
        }
    }
}
