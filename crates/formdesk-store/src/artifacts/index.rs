//! Artifact index queries
//!
//! All functions take a `&Connection` so they run inside whatever
//! transaction the caller holds (a `Transaction` derefs to `Connection`).

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use chrono::{DateTime, Utc};
use formdesk_core::errors::{ExError, ExErrorKind};
use formdesk_core::ArtifactKey;
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// One indexed version of an artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionEntry {
    pub version: u32,
    pub rel_path: String,
    /// SHA-256 of the content, hex encoded
    pub content_digest: String,
    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
}

fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| {
            ExError::new(ExErrorKind::Persistence)
                .with_op("parse_created_at")
                .with_message(format!("Bad timestamp {:?} in index: {}", raw, e))
        })
}

type RawEntry = (u32, String, String, i64, String);

fn into_entry(raw: RawEntry) -> Result<VersionEntry> {
    let (version, rel_path, content_digest, size_bytes, created_at) = raw;
    Ok(VersionEntry {
        version,
        rel_path,
        content_digest,
        size_bytes: u64::try_from(size_bytes).unwrap_or_default(),
        created_at: parse_timestamp(&created_at)?,
    })
}

/// Highest indexed version of `key`
pub fn latest_entry(conn: &Connection, key: &ArtifactKey) -> Result<Option<VersionEntry>> {
    let raw: Option<RawEntry> = conn
        .query_row(
            "SELECT version, rel_path, content_digest, size_bytes, created_at
             FROM artifacts
             WHERE kind = ?1 AND project_id = ?2 AND period = ?3
             ORDER BY version DESC
             LIMIT 1",
            params![key.kind.as_str(), key.project_id.as_str(), key.period_slug()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .optional()
        .map_err(from_rusqlite)?;

    raw.map(into_entry).transpose()
}

/// All indexed versions of `key`, oldest first
pub fn list_entries(conn: &Connection, key: &ArtifactKey) -> Result<Vec<VersionEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT version, rel_path, content_digest, size_bytes, created_at
             FROM artifacts
             WHERE kind = ?1 AND project_id = ?2 AND period = ?3
             ORDER BY version ASC",
        )
        .map_err(from_rusqlite)?;

    let rows: Vec<RawEntry> = stmt
        .query_map(
            params![key.kind.as_str(), key.project_id.as_str(), key.period_slug()],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    rows.into_iter().map(into_entry).collect()
}

/// Whether some row points at `rel_path`
pub fn is_indexed_path(conn: &Connection, rel_path: &str) -> Result<bool> {
    conn.query_row(
        "SELECT 1 FROM artifacts WHERE rel_path = ?1",
        [rel_path],
        |_| Ok(()),
    )
    .optional()
    .map(|found| found.is_some())
    .map_err(from_rusqlite)
}

pub fn insert_entry(conn: &Connection, key: &ArtifactKey, entry: &VersionEntry) -> Result<()> {
    conn.execute(
        "INSERT INTO artifacts
            (kind, project_id, period, version, rel_path, content_digest, size_bytes, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            key.kind.as_str(),
            key.project_id.as_str(),
            key.period_slug(),
            entry.version,
            entry.rel_path,
            entry.content_digest,
            i64::try_from(entry.size_bytes).unwrap_or(i64::MAX),
            entry.created_at.to_rfc3339(),
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}

/// Last assigned version for a versioned key
pub fn read_counter(conn: &Connection, key: &ArtifactKey) -> Result<Option<u32>> {
    conn.query_row(
        "SELECT last_version FROM artifact_counters WHERE kind = ?1 AND project_id = ?2",
        params![key.kind.as_str(), key.project_id.as_str()],
        |row| row.get(0),
    )
    .optional()
    .map_err(from_rusqlite)
}

pub fn write_counter(
    conn: &Connection,
    key: &ArtifactKey,
    version: u32,
    at: DateTime<Utc>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO artifact_counters (kind, project_id, last_version, updated_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT (kind, project_id)
         DO UPDATE SET last_version = excluded.last_version, updated_at = excluded.updated_at",
        params![
            key.kind.as_str(),
            key.project_id.as_str(),
            version,
            at.to_rfc3339()
        ],
    )
    .map_err(from_rusqlite)?;
    Ok(())
}
