//! Access policy trait and implementations
//!
//! The policy decides whether a sender may act on a project. It is consulted
//! before any store access tied to a project id. It answers `false` for ids
//! it has never heard of, so "not allowed" and "does not exist" look the same
//! to the sender.

use crate::config::DeskConfig;
use crate::model::ProjectId;
use std::collections::{HashMap, HashSet};

/// Policy deciding per (sender, project) access
pub trait AccessPolicy: Send + Sync {
    /// Check whether `sender` may read or write artifacts of `project_id`
    ///
    /// Never fails; unknown projects are simply not authorized.
    fn is_authorized(&self, sender: &str, project_id: &ProjectId) -> bool;
}

/// Static allow-list with optional per-sender grants
///
/// A project is authorized for a sender when it is in the global list or in
/// that sender's grant list.
///
/// # Example
/// ```
/// use formdesk_core::policy::{AccessPolicy, AllowListPolicy};
/// use formdesk_core::ProjectId;
///
/// let policy = AllowListPolicy::new(["P1234"])
///     .with_sender_grants("whatsapp:+15550001111", ["P9000"]);
///
/// assert!(policy.is_authorized("anyone", &ProjectId::new("P1234")));
/// assert!(policy.is_authorized("whatsapp:+15550001111", &ProjectId::new("P9000")));
/// assert!(!policy.is_authorized("anyone", &ProjectId::new("P9000")));
/// ```
#[derive(Debug, Clone, Default)]
pub struct AllowListPolicy {
    global: HashSet<ProjectId>,
    per_sender: HashMap<String, HashSet<ProjectId>>,
}

impl AllowListPolicy {
    /// Policy allowing the given projects for every sender
    pub fn new(projects: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            global: projects.into_iter().map(ProjectId::new).collect(),
            per_sender: HashMap::new(),
        }
    }

    /// Grant extra projects to one sender
    pub fn with_sender_grants(
        mut self,
        sender: impl Into<String>,
        projects: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.per_sender
            .entry(sender.into())
            .or_default()
            .extend(projects.into_iter().map(ProjectId::new));
        self
    }

    pub fn from_config(config: &DeskConfig) -> Self {
        config.sender_projects.iter().fold(
            Self::new(config.allowed_projects.iter().cloned()),
            |policy, (sender, projects)| {
                policy.with_sender_grants(sender.clone(), projects.iter().cloned())
            },
        )
    }
}

impl AccessPolicy for AllowListPolicy {
    fn is_authorized(&self, sender: &str, project_id: &ProjectId) -> bool {
        self.global.contains(project_id)
            || self
                .per_sender
                .get(sender)
                .is_some_and(|projects| projects.contains(project_id))
    }
}

/// Denies everything (lock-down mode and tests)
#[derive(Debug, Clone, Copy, Default)]
pub struct DenyAllPolicy;

impl AccessPolicy for DenyAllPolicy {
    fn is_authorized(&self, _sender: &str, _project_id: &ProjectId) -> bool {
        false
    }
}
