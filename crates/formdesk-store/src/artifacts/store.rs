//! Name-addressed artifact store
//!
//! Content lives in files under the store root; the SQLite index records
//! every version and, for versioned kinds, the last assigned version number.
//!
//! ## Concurrency
//!
//! Read-modify-write on a key runs under that key's lock (bounded wait) and
//! inside an IMMEDIATE transaction on a fresh connection (bounded busy wait),
//! so writers in other threads and other processes are serialized. Cache
//! hits read without locking.
//!
//! ## Logging
//!
//! Every public write operation logs start and exactly one of end / error.

#![allow(clippy::result_large_err)]

use crate::artifacts::index::{self, VersionEntry};
use crate::artifacts::locks::KeyLocks;
use crate::db;
use crate::errors::{
    from_rusqlite, invalid_key, io_error, missing_content, unknown_uri, Result,
};
use crate::fs::{atomic_write, StoreLayout};
use crate::migrations::apply_migrations;
use chrono::{DateTime, Utc};
use formdesk_core::errors::ExErrorKind;
use formdesk_core::{log_op_end, log_op_error, log_op_start};
use formdesk_core::{ArtifactKey, ArtifactRecord, DeskConfig};
use rusqlite::{Connection, TransactionBehavior};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Settings for opening a store
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub root: PathBuf,
    pub public_base_url: String,
    pub document_extension: String,
    pub io_timeout: Duration,
}

impl StoreOptions {
    pub fn from_config(config: &DeskConfig) -> Self {
        Self {
            root: config.storage.root.clone(),
            public_base_url: config.storage.public_base_url.clone(),
            document_extension: config.document_extension.clone(),
            io_timeout: config.storage.io_timeout(),
        }
    }
}

/// Artifact store rooted at one directory
#[derive(Debug)]
pub struct ArtifactStore {
    layout: StoreLayout,
    public_base_url: String,
    io_timeout: Duration,
    locks: KeyLocks,
}

fn content_digest(content: &[u8]) -> String {
    hex::encode(Sha256::digest(content))
}

impl ArtifactStore {
    /// Open (creating if needed) the store and bring its index up to date
    pub fn open(options: StoreOptions) -> Result<Self> {
        fs::create_dir_all(&options.root).map_err(|e| io_error("create_store_root", e))?;

        let store = Self {
            layout: StoreLayout::new(options.root, options.document_extension),
            public_base_url: options.public_base_url.trim_end_matches('/').to_string(),
            io_timeout: options.io_timeout,
            locks: KeyLocks::new(),
        };

        let mut conn = store.connect()?;
        apply_migrations(&mut conn)?;

        Ok(store)
    }

    pub fn root(&self) -> &std::path::Path {
        self.layout.root()
    }

    fn connect(&self) -> Result<Connection> {
        let conn = db::open(self.layout.db_path())?;
        db::configure(&conn, self.io_timeout)?;
        Ok(conn)
    }

    fn check_key(op: &str, key: &ArtifactKey) -> Result<()> {
        if !key.project_id.is_path_safe() {
            return Err(invalid_key(
                op,
                format!("Project id {:?} cannot be stored", key.project_id.as_str()),
            )
            .with_project_id(key.project_id.as_str()));
        }
        if key.kind.is_versioned() == key.period.is_some() {
            return Err(invalid_key(op, format!("Malformed artifact key {}", key)));
        }
        Ok(())
    }

    fn load(&self, key: &ArtifactKey, entry: VersionEntry) -> Result<ArtifactRecord> {
        let path = self
            .layout
            .content_path(&entry.rel_path)
            .ok_or_else(|| missing_content(&entry.rel_path))?;
        let content = fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => missing_content(&entry.rel_path),
            _ => io_error("read_content", e),
        })?;
        Ok(ArtifactRecord {
            key: key.clone(),
            version: entry.version,
            content,
            created_at: entry.created_at,
        })
    }

    /// Write `content` as `version` of `key` and index it inside `conn`'s
    /// open transaction. Removes the file again if indexing fails.
    fn write_version(
        &self,
        conn: &Connection,
        key: &ArtifactKey,
        version: u32,
        content: &[u8],
        created_at: DateTime<Utc>,
    ) -> Result<VersionEntry> {
        let entry = VersionEntry {
            version,
            rel_path: self.layout.rel_path(key, version),
            content_digest: content_digest(content),
            size_bytes: content.len() as u64,
            created_at,
        };
        let path = self
            .layout
            .content_path(&entry.rel_path)
            .ok_or_else(|| invalid_key("write_version", format!("Bad path for {}", key)))?;

        atomic_write(&path, content)?;

        let indexed = index::insert_entry(conn, key, &entry).and_then(|()| {
            if key.kind.is_versioned() {
                index::write_counter(conn, key, version, created_at)
            } else {
                Ok(())
            }
        });
        if let Err(e) = indexed {
            let _ = fs::remove_file(&path);
            return Err(e);
        }

        Ok(entry)
    }

    /// Return the existing record for `key`, or generate and persist one
    ///
    /// For timesheets the existing record is the latest version. A miss
    /// stores the generated content as version 1. Duplicate concurrent
    /// requests for the same key generate content once.
    pub fn get_or_create<F>(&self, key: &ArtifactKey, generate: F) -> Result<ArtifactRecord>
    where
        F: FnOnce() -> Vec<u8>,
    {
        log_op_start!("get_or_create", project_id = key.project_id.as_str());
        let start = Instant::now();

        let result = self.get_or_create_impl(key, generate).map_err(|e| {
            let e = e.with_project_id(key.project_id.as_str());
            log_op_error!(
                "get_or_create",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "get_or_create",
            duration_ms = start.elapsed().as_millis() as u64,
            version = result.version
        );

        Ok(result)
    }

    fn get_or_create_impl<F>(&self, key: &ArtifactKey, generate: F) -> Result<ArtifactRecord>
    where
        F: FnOnce() -> Vec<u8>,
    {
        Self::check_key("get_or_create", key)?;

        if let Some(record) = self.latest(key)? {
            return Ok(record);
        }

        let _guard = self.locks.acquire(&key.lock_name(), self.io_timeout)?;

        // Another request may have created it while we waited
        if let Some(record) = self.latest(key)? {
            return Ok(record);
        }

        let content = generate();
        let created_at = Utc::now();

        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        // A writer in another process may have won between our check and BEGIN
        if let Some(entry) = index::latest_entry(&tx, key)? {
            drop(tx);
            return self.load(key, entry);
        }

        let entry = self.write_version(&tx, key, 1, &content, created_at)?;
        if let Err(e) = tx.commit() {
            self.discard(&entry);
            return Err(from_rusqlite(e));
        }

        Ok(ArtifactRecord {
            key: key.clone(),
            version: entry.version,
            content,
            created_at,
        })
    }

    /// Store `content` as the next version of a versioned key
    ///
    /// The counter advances only when the content file and the index row
    /// were both written; a failure leaves the previous version current.
    pub fn submit_new_version(&self, key: &ArtifactKey, content: &[u8]) -> Result<ArtifactRecord> {
        log_op_start!("submit_new_version", project_id = key.project_id.as_str());
        let start = Instant::now();

        let result = self.submit_new_version_impl(key, content).map_err(|e| {
            let e = e.with_project_id(key.project_id.as_str());
            log_op_error!(
                "submit_new_version",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "submit_new_version",
            duration_ms = start.elapsed().as_millis() as u64,
            version = result.version
        );

        Ok(result)
    }

    fn submit_new_version_impl(&self, key: &ArtifactKey, content: &[u8]) -> Result<ArtifactRecord> {
        Self::check_key("submit_new_version", key)?;
        if !key.kind.is_versioned() {
            return Err(invalid_key(
                "submit_new_version",
                format!("{} artifacts are not versioned", key.kind),
            ));
        }

        let _guard = self.locks.acquire(&key.lock_name(), self.io_timeout)?;

        let mut conn = self.connect()?;
        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(from_rusqlite)?;

        let version = index::read_counter(&tx, key)?.unwrap_or(0) + 1;
        let created_at = Utc::now();
        let entry = self.write_version(&tx, key, version, content, created_at)?;

        if let Err(e) = tx.commit() {
            self.discard(&entry);
            return Err(from_rusqlite(e));
        }

        Ok(ArtifactRecord {
            key: key.clone(),
            version,
            content: content.to_vec(),
            created_at,
        })
    }

    fn discard(&self, entry: &VersionEntry) {
        if let Some(path) = self.layout.content_path(&entry.rel_path) {
            let _ = fs::remove_file(path);
        }
    }

    /// Public URI of a record: `<public_base_url>/<relative path>`
    pub fn resolve_uri(&self, record: &ArtifactRecord) -> String {
        format!(
            "{}/{}",
            self.public_base_url,
            self.layout.rel_path(&record.key, record.version)
        )
    }

    /// Public URI of an indexed version, as listed by [`ArtifactStore::history`]
    pub fn entry_uri(&self, entry: &VersionEntry) -> String {
        format!("{}/{}", self.public_base_url, entry.rel_path)
    }

    /// Read the content behind a URI produced by [`ArtifactStore::resolve_uri`]
    ///
    /// Only indexed artifact paths under the public base URL are served.
    pub fn read_uri(&self, uri: &str) -> Result<Vec<u8>> {
        let rel = uri
            .strip_prefix(self.public_base_url.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
            .ok_or_else(|| unknown_uri(uri))?;
        let path = self.layout.content_path(rel).ok_or_else(|| unknown_uri(uri))?;

        let conn = self.connect()?;
        if !index::is_indexed_path(&conn, rel)? {
            return Err(unknown_uri(uri));
        }

        fs::read(&path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => missing_content(rel),
            _ => io_error("read_uri", e),
        })
    }

    /// Latest stored record of `key`, if any
    pub fn latest(&self, key: &ArtifactKey) -> Result<Option<ArtifactRecord>> {
        Self::check_key("latest", key)?;
        let conn = self.connect()?;
        match index::latest_entry(&conn, key)? {
            Some(entry) => self.load(key, entry).map(Some),
            None => Ok(None),
        }
    }

    /// Every indexed version of `key`, oldest first
    pub fn history(&self, key: &ArtifactKey) -> Result<Vec<VersionEntry>> {
        Self::check_key("history", key)?;
        let conn = self.connect()?;
        index::list_entries(&conn, key)
    }

    /// Whether an error from this store means "try again later"
    pub fn is_unavailable(err: &formdesk_core::ExError) -> bool {
        err.kind() == ExErrorKind::StorageUnavailable
    }
}
