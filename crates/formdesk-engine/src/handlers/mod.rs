//! Command handlers
//!
//! One function per command kind. Handlers that touch the store check access
//! first and return `Err` only for failures the dispatcher has to surface;
//! every user mistake becomes a reply via [`recover`].

#![allow(clippy::result_large_err)]

pub mod conversation;
pub mod report;
pub mod timesheet;

use crate::ingest::AttachmentFetcher;
use formdesk_core::errors::{ExError, Result};
use formdesk_core::{AccessPolicy, DeskError, OutboundReply, ProjectId};
use formdesk_store::ArtifactStore;

/// What handlers need from the dispatcher
pub struct HandlerEnv<'a> {
    pub policy: &'a dyn AccessPolicy,
    pub store: &'a ArtifactStore,
    pub fetcher: &'a dyn AttachmentFetcher,
    /// Project every submission is filed under
    pub submit_project: &'a ProjectId,
}

impl HandlerEnv<'_> {
    /// `AccessDenied` when the sender may not touch `project_id`
    pub(crate) fn authorize(
        &self,
        sender: &str,
        project_id: &ProjectId,
    ) -> std::result::Result<(), DeskError> {
        if self.policy.is_authorized(sender, project_id) {
            Ok(())
        } else {
            Err(DeskError::AccessDenied {
                project_id: project_id.to_string(),
            })
        }
    }
}

/// Turn a domain error into the reply the sender sees
///
/// `StorageUnavailable` has no reply and is handed back as `Err`.
pub(crate) fn recover(err: DeskError) -> Result<OutboundReply> {
    let reply = conversation::explain(&err);
    let ex = ExError::from(err);
    match reply {
        Some(reply) => {
            tracing::warn!(
                op = ex.op().unwrap_or("handle"),
                err_kind = ?ex.kind(),
                err_code = ex.code(),
                project_id = ex.project_id().unwrap_or(""),
                "request rejected"
            );
            Ok(reply)
        }
        None => Err(ex),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::replies;
    use formdesk_core::ExErrorKind;

    #[test]
    fn test_recover_access_denied_does_not_echo_project() {
        let reply = recover(DeskError::AccessDenied {
            project_id: "P404".to_string(),
        })
        .unwrap();
        assert_eq!(reply.text, replies::ACCESS_DENIED);
        assert!(!reply.text.contains("P404"));
    }

    #[test]
    fn test_recover_passes_storage_unavailable_through() {
        let err = recover(DeskError::StorageUnavailable {
            reason: "disk".to_string(),
        })
        .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::StorageUnavailable);
    }
}
