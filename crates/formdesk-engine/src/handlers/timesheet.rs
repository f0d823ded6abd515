//! Timesheet request and submission

#![allow(clippy::result_large_err)]

use super::{recover, HandlerEnv};
use crate::documents::blank_timesheet;
use crate::replies;
use chrono::SecondsFormat;
use formdesk_core::errors::Result;
use formdesk_core::{ArtifactKey, AttachmentRef, OutboundReply, ProjectId};

/// Hand out the current timesheet of `project_id`, creating a blank one first
pub fn request(env: &HandlerEnv<'_>, sender: &str, project_id: &ProjectId) -> Result<OutboundReply> {
    if let Err(denied) = env.authorize(sender, project_id) {
        return recover(denied);
    }

    let key = ArtifactKey::timesheet(project_id.clone());
    let record = env
        .store
        .get_or_create(&key, || blank_timesheet(project_id))?;

    Ok(
        OutboundReply::text(replies::timesheet_ready(project_id, record.version))
            .with_attachment(env.store.resolve_uri(&record)),
    )
}

/// Store a submitted timesheet as the next version of the submit project
pub fn submit(env: &HandlerEnv<'_>, sender: &str, attachment: &AttachmentRef) -> Result<OutboundReply> {
    let project_id = env.submit_project;
    if let Err(denied) = env.authorize(sender, project_id) {
        return recover(denied);
    }

    let content = env.fetcher.fetch(attachment)?;
    let key = ArtifactKey::timesheet(project_id.clone());
    let record = env.store.submit_new_version(&key, &content)?;

    let at = record.created_at.to_rfc3339_opts(SecondsFormat::Secs, true);
    Ok(OutboundReply::text(replies::submission_received(
        sender,
        project_id,
        &at,
        record.version,
    )))
}
