//! Artifact path layout
//!
//! ```text
//! <root>/index.db
//! <root>/timesheets/<project>/timesheet_<project>_v<N>.<ext>
//! <root>/reports/<project>/report_<project>_<period>.<ext>
//! ```
//!
//! Relative paths always use `/` and double as the URI suffix under the
//! public base URL.

use formdesk_core::{ArtifactKey, ArtifactKind};
use std::path::{Path, PathBuf};

const INDEX_FILE: &str = "index.db";
const CONTENT_DIRS: [&str; 2] = ["timesheets", "reports"];

#[derive(Debug, Clone)]
pub struct StoreLayout {
    root: PathBuf,
    extension: String,
}

impl StoreLayout {
    pub fn new(root: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            extension: extension.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn db_path(&self) -> PathBuf {
        self.root.join(INDEX_FILE)
    }

    /// Relative path of one version of `key`
    ///
    /// The project id must already have passed `ProjectId::is_path_safe`.
    pub fn rel_path(&self, key: &ArtifactKey, version: u32) -> String {
        let project = key.project_id.as_str();
        match key.kind {
            ArtifactKind::Timesheet => format!(
                "timesheets/{p}/timesheet_{p}_v{v}.{ext}",
                p = project,
                v = version,
                ext = self.extension
            ),
            ArtifactKind::Report => format!(
                "reports/{p}/report_{p}_{period}.{ext}",
                p = project,
                period = key.period_slug(),
                ext = self.extension
            ),
        }
    }

    /// Absolute path of a relative content path
    ///
    /// Returns `None` unless `rel` is a plain relative path inside one of the
    /// content directories.
    pub fn content_path(&self, rel: &str) -> Option<PathBuf> {
        let segments: Vec<&str> = rel.split('/').collect();
        let first = segments.first()?;
        if segments.len() < 2 || !CONTENT_DIRS.contains(first) {
            return None;
        }
        let safe = segments.iter().all(|s| {
            !s.is_empty() && *s != "." && *s != ".." && !s.contains('\\') && !s.contains(':')
        });
        if !safe {
            return None;
        }
        Some(segments.iter().fold(self.root.clone(), |p, s| p.join(s)))
    }
}
