//! Artifact addressing and records

use crate::model::{Period, ProjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kind of stored document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// Versioned: every submission gets the next version number
    Timesheet,
    /// Versionless: generated once per (project, period) and cached
    Report,
}

impl ArtifactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArtifactKind::Timesheet => "timesheet",
            ArtifactKind::Report => "report",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "timesheet" => Some(ArtifactKind::Timesheet),
            "report" => Some(ArtifactKind::Report),
            _ => None,
        }
    }

    /// Whether records of this kind carry a version counter
    pub fn is_versioned(&self) -> bool {
        matches!(self, ArtifactKind::Timesheet)
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Address of a document in the artifact store
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactKey {
    pub kind: ArtifactKind,
    pub project_id: ProjectId,
    pub period: Option<Period>,
}

impl ArtifactKey {
    pub fn timesheet(project_id: ProjectId) -> Self {
        Self {
            kind: ArtifactKind::Timesheet,
            project_id,
            period: None,
        }
    }

    pub fn report(project_id: ProjectId, period: Period) -> Self {
        Self {
            kind: ArtifactKind::Report,
            project_id,
            period: Some(period),
        }
    }

    /// Period component of the key; empty for keys without a period
    pub fn period_slug(&self) -> String {
        self.period.map(|p| p.slug()).unwrap_or_default()
    }

    /// Stable string form, e.g. `timesheet/P1234` or `report/P1234/2024`
    pub fn lock_name(&self) -> String {
        match self.period {
            Some(period) => format!("{}/{}/{}", self.kind, self.project_id, period.slug()),
            None => format!("{}/{}", self.kind, self.project_id),
        }
    }
}

impl std::fmt::Display for ArtifactKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.lock_name())
    }
}

/// A stored document version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactRecord {
    pub key: ArtifactKey,
    /// Always >= 1; fixed at 1 for versionless kinds
    pub version: u32,
    pub content: Vec<u8>,
    pub created_at: DateTime<Utc>,
}
