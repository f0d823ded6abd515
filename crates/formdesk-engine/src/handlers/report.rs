//! Report requests

#![allow(clippy::result_large_err)]

use super::{recover, HandlerEnv};
use crate::documents::placeholder_report;
use crate::replies;
use formdesk_core::errors::Result;
use formdesk_core::{ArtifactKey, OutboundReply, Period, ProjectId};

/// Hand out the report for `(project_id, period)`, generating it once
pub fn request(
    env: &HandlerEnv<'_>,
    sender: &str,
    project_id: &ProjectId,
    period: Period,
) -> Result<OutboundReply> {
    if let Err(denied) = env.authorize(sender, project_id) {
        return recover(denied);
    }

    let key = ArtifactKey::report(project_id.clone(), period);
    let record = env
        .store
        .get_or_create(&key, || placeholder_report(project_id, period))?;

    Ok(OutboundReply::text(replies::report_ready(project_id, period))
        .with_attachment(env.store.resolve_uri(&record)))
}
