//! Placeholder document content
//!
//! Stands in for real workbook generation. Content is deterministic for a
//! given key so regenerated placeholders compare equal.

use formdesk_core::{Period, ProjectId};

/// Blank timesheet handed out on the first request for a project
pub fn blank_timesheet(project_id: &ProjectId) -> Vec<u8> {
    format!(
        "Formdesk timesheet\nproject: {}\nentries:\n",
        project_id
    )
    .into_bytes()
}

/// Report for one project and period
pub fn placeholder_report(project_id: &ProjectId, period: Period) -> Vec<u8> {
    format!(
        "Formdesk report\nproject: {}\nperiod: {}\n",
        project_id,
        period.slug()
    )
    .into_bytes()
}
