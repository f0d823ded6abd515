//! Canned reply texts and the help table

use formdesk_core::grammar::verbs::aliases_of;
use formdesk_core::{CommandVerb, Period, ProjectId};

pub const GREETING: &str = "Welcome to Formdesk! Send '?' to see what I can do.";

/// Same text whether the project is off-limits or does not exist
pub const ACCESS_DENIED: &str =
    "Illegal request: this project does not exist or you are not allowed to use it.";

pub const TEMPORARY_FAILURE: &str =
    "Sorry, I could not complete your request right now. Please try again in a moment.";

fn describe(verb: CommandVerb) -> &'static str {
    match verb {
        CommandVerb::RequestTimesheet => {
            "Get the current timesheet for a project. The first request creates a blank one."
        }
        CommandVerb::SubmitTimesheet => {
            "Send back the filled-in timesheet as a document. Each submission becomes a new version."
        }
        CommandVerb::RequestReport => {
            "Get a project report for this week, this month or a whole year."
        }
    }
}

/// Full command list, answer to a bare `?`
pub fn help_overview() -> String {
    let mut text = String::from("Available commands:");
    for verb in CommandVerb::ALL {
        text.push_str("\n- ");
        text.push_str(verb.expected_format());
    }
    text.push_str("\nSend '? <command>' for details, e.g. '? report'.");
    text
}

/// Answer to `? <topic>`
pub fn help_topic(verb: CommandVerb) -> String {
    let mut text = format!("{}\nUsage: {}", describe(verb), verb.expected_format());
    let aliases = aliases_of(verb);
    if aliases.len() > 1 {
        text.push_str("\nAlso accepted: ");
        text.push_str(&aliases[1..].join(", "));
    }
    text
}

pub fn timesheet_ready(project_id: &ProjectId, version: u32) -> String {
    format!(
        "Here is the timesheet for project {} (version {}).",
        project_id, version
    )
}

pub fn report_ready(project_id: &ProjectId, period: Period) -> String {
    format!(
        "Here is the {} report for project {}.",
        period.slug(),
        project_id
    )
}

/// `at` is an ISO-8601 timestamp
pub fn submission_received(sender: &str, project_id: &ProjectId, at: &str, version: u32) -> String {
    format!(
        "Timesheet received from {} for project {} at {} (version {}).",
        sender, project_id, at, version
    )
}

pub fn parse_failure(expected_format: &str) -> String {
    format!("Invalid format. Expected: {}", expected_format)
}

pub fn invalid_period(raw: &str) -> String {
    format!(
        "Invalid period '{}'. Use weekly, monthly or a 4-digit year such as 2024.",
        raw
    )
}

pub fn unsupported_attachment(content_type: &str) -> String {
    format!(
        "Unsupported attachment type '{}'. Only filled-in timesheet documents are accepted.",
        content_type
    )
}

pub fn unrecognized(raw_text: &str) -> String {
    format!(
        "Sorry, I did not understand \"{}\". Send '?' for the list of commands.",
        raw_text.trim()
    )
}
