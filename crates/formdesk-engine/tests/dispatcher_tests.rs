// Integration tests for the dispatcher
// Drives full inbound messages through grammar, policy, ingestion and store

use formdesk_core::config::XLSX_CONTENT_TYPE;
use formdesk_core::logging_facility::init_test_capture;
use formdesk_core::{
    AllowListPolicy, ArtifactKey, AttachmentRef, DeskConfig, ExErrorKind, Grammar, ParsedInbound,
    ProjectId,
};
use formdesk_core_types::schema::{FIELD_COMMAND, FIELD_REQUEST_ID, FIELD_SENDER};
use formdesk_core_types::{RequestContext, RequestId};
use formdesk_engine::{Dispatcher, UriFetcher};
use formdesk_store::{ArtifactStore, StoreOptions};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const SENDER: &str = "whatsapp:+15550001111";

fn setup(dir: &TempDir) -> Dispatcher {
    let mut config = DeskConfig {
        allowed_projects: vec!["P1234".to_string()],
        ..DeskConfig::default()
    };
    config
        .sender_projects
        .insert("whatsapp:+15550002222".to_string(), vec!["P9000".to_string()]);
    config.storage.root = dir.path().to_path_buf();

    let store = ArtifactStore::open(StoreOptions::from_config(&config)).unwrap();
    Dispatcher::from_config(&config, Arc::new(store)).unwrap()
}

fn text(body: &str) -> ParsedInbound {
    ParsedInbound::text(SENDER, body)
}

/// Workbook attachment carrying `b64` as a data URI
fn xlsx(b64: &str) -> ParsedInbound {
    text("").with_attachment(AttachmentRef::new(
        XLSX_CONTENT_TYPE,
        format!("data:{};base64,{}", XLSX_CONTENT_TYPE, b64),
    ))
}

#[test]
fn test_greeting_and_help_need_no_store() {
    // Given: A dispatcher
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);

    // When: Greeting and help messages arrive
    let hello = d.handle(&text("  START ")).unwrap();
    let help = d.handle(&text("?")).unwrap();
    let topic = d.handle(&text("? form request")).unwrap();

    // Then: Canned replies come back without attachments
    assert!(hello.text.starts_with("Welcome"));
    assert!(help.text.contains("report, <project id>, <weekly|monthly|yyyy>"));
    assert!(topic.text.contains("request timesheet, <project id>"));
    assert!(hello.attachment_uris.is_empty() && help.attachment_uris.is_empty());
}

#[test]
fn test_repeated_timesheet_requests_are_idempotent() {
    // Given: A fresh store
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);

    // When: The same timesheet is requested twice
    let first = d.handle(&text("request timesheet, P1234")).unwrap();
    let second = d.handle(&text("Form Request, P1234")).unwrap();

    // Then: Both replies carry the same single URI
    assert_eq!(first.attachment_uris.len(), 1);
    assert_eq!(first.attachment_uris, second.attachment_uris);
    assert!(first.text.contains("version 1"));
}

#[test]
fn test_submission_advances_version_and_changes_uri() {
    // Given: A timesheet handed out once
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);
    let before = d.handle(&text("request timesheet, P1234")).unwrap();

    // When: A filled-in timesheet is submitted
    let receipt = d.handle(&xlsx("djI=")).unwrap(); // "v2"
    let after = d.handle(&text("request timesheet, P1234")).unwrap();

    // Then: The receipt names sender, project and new version
    assert!(receipt.text.contains(SENDER));
    assert!(receipt.text.contains("project P1234"));
    assert!(receipt.text.contains("(version 2)"));

    // And: The next request hands out the submitted bytes
    assert_ne!(before.attachment_uris, after.attachment_uris);
    assert_eq!(d.store().read_uri(&after.attachment_uris[0]).unwrap(), b"v2");
}

#[test]
fn test_unauthorized_and_nonexistent_projects_reply_identically() {
    // Given: P9000 exists but is granted to another sender only
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);

    // When: Our sender asks for P9000 and for a project nobody knows
    let foreign = d.handle(&text("request timesheet, P9000")).unwrap();
    let missing = d.handle(&text("request timesheet, P0000")).unwrap();
    let foreign_report = d.handle(&text("report, P9000, weekly")).unwrap();

    // Then: The replies cannot be told apart
    assert_eq!(foreign, missing);
    assert_eq!(foreign.text, foreign_report.text);
    assert!(foreign.text.starts_with("Illegal request"));
    assert!(foreign.attachment_uris.is_empty());
}

#[test]
fn test_report_periods_are_cached_separately() {
    // Given: A dispatcher
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);

    // When: Reports for different periods are requested, one of them twice
    let yearly = d.handle(&text("report, P1234, 2024")).unwrap();
    let yearly_again = d.handle(&text("request report, P1234, 2024")).unwrap();
    let weekly = d.handle(&text("report, P1234, WEEKLY")).unwrap();

    // Then: Same period gives the same URI, different periods differ
    assert_eq!(yearly.attachment_uris, yearly_again.attachment_uris);
    assert_ne!(yearly.attachment_uris, weekly.attachment_uris);
    assert!(yearly.attachment_uris[0].ends_with("report_P1234_2024.xlsx"));
}

#[test]
fn test_bad_input_gets_guidance_and_stores_nothing() {
    // Given: A dispatcher
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);

    // When: Malformed and unsupported messages arrive
    let bad_period = d.handle(&text("report, P1234, 20245")).unwrap();
    let missing_field = d.handle(&text("report, P1234")).unwrap();
    let submit_text = d.handle(&text("submit timesheet")).unwrap();
    let pdf = d
        .handle(&text("").with_attachment(AttachmentRef::new(
            "application/pdf",
            "data:application/pdf;base64,eA==",
        )))
        .unwrap();
    let nonsense = d.handle(&text("make me a sandwich")).unwrap();

    // Then: Each reply explains the problem
    assert!(bad_period.text.contains("20245"));
    assert!(missing_field.text.starts_with("Invalid format. Expected: report"));
    assert!(submit_text.text.contains("attachment"));
    assert!(pdf.text.contains("application/pdf"));
    assert!(nonsense.text.contains("make me a sandwich"));

    // And: Nothing was stored
    let key = ArtifactKey::timesheet(ProjectId::new("P1234"));
    assert!(d.store().history(&key).unwrap().is_empty());
}

#[test]
fn test_unfetchable_attachment_propagates_storage_unavailable() {
    // Given: A submission whose bytes cannot be fetched
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);
    let inbound = text("").with_attachment(AttachmentRef::new(
        XLSX_CONTENT_TYPE,
        "file:///nonexistent/sheet.xlsx",
    ));

    // When: It is handled
    let err = d.handle(&inbound).unwrap_err();

    // Then: The error is transient and carries the request id
    assert_eq!(err.kind(), ExErrorKind::StorageUnavailable);
    assert!(err.request_id().is_some());
    assert!(Dispatcher::failure_reply().text.contains("try again"));
}

#[test]
fn test_server_paths_are_not_ingested_under_default_config() {
    // Given: The default config, which names no ingest directory
    let dir = TempDir::new().unwrap();
    let mut config = DeskConfig::default();
    config.storage.root = dir.path().to_path_buf();
    let store = ArtifactStore::open(StoreOptions::from_config(&config)).unwrap();
    let d = Dispatcher::from_config(&config, Arc::new(store)).unwrap();

    for uri in ["/etc/passwd", "file:///etc/passwd"] {
        // When: A sender allowed on the submit project attaches a server path
        let inbound = ParsedInbound::text("anyone", "")
            .with_attachment(AttachmentRef::new(XLSX_CONTENT_TYPE, uri));
        let err = d.handle(&inbound).unwrap_err();

        // Then: The fetch is refused without reading the file
        assert_eq!(err.kind(), ExErrorKind::StorageUnavailable, "uri {}", uri);
        assert!(!err.message().contains("passwd"));
    }

    // And: No timesheet version was stored
    let key = ArtifactKey::timesheet(ProjectId::new("P1234"));
    assert!(d.store().history(&key).unwrap().is_empty());
}

#[test]
fn test_dispatch_logs_start_and_end_with_request_id() {
    // Given: Log capture and a known request id
    let capture = init_test_capture();
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);
    let request_id = RequestId::new();
    let ctx = RequestContext::with_request_id(request_id.clone());

    // When: A message is handled
    d.handle_with_context(&ctx, &text("request timesheet, P1234"))
        .unwrap();

    // Then: One start and one end event carry the request id
    let ours = |event: &str| {
        capture.count_events(|e| {
            e.op.as_deref() == Some("dispatch")
                && e.event.as_deref() == Some(event)
                && e.field(FIELD_REQUEST_ID) == Some(request_id.as_str())
        })
    };
    assert_eq!(ours("start"), 1);
    assert_eq!(ours("end"), 1);
    assert_eq!(ours("end_error"), 0);

    // And: The sender is masked
    let start = capture
        .events_for_op("dispatch")
        .into_iter()
        .find(|e| e.field(FIELD_REQUEST_ID) == Some(request_id.as_str()))
        .unwrap();
    assert_eq!(start.field(FIELD_SENDER), Some("***1111"));
    assert_eq!(start.field(FIELD_COMMAND), Some("request_timesheet"));
}

#[test]
fn test_concurrent_submissions_through_dispatcher() {
    // Given: A fresh store behind one shared dispatcher
    let dir = TempDir::new().unwrap();
    let d = setup(&dir);
    const N: usize = 12;

    // When: N submissions are handled on N threads
    let replies: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..N)
            .map(|_| {
                let d = &d;
                s.spawn(move || d.handle(&xlsx("eA==")).unwrap().text)
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Then: Every version 1..=N was handed out exactly once
    for v in 1..=N {
        let tag = format!("(version {})", v);
        assert_eq!(replies.iter().filter(|r| r.contains(&tag)).count(), 1, "{}", tag);
    }
}

#[test]
fn test_custom_wiring_with_explicit_parts() {
    // Given: A dispatcher assembled by hand with a per-sender grant
    let dir = TempDir::new().unwrap();
    let store = ArtifactStore::open(StoreOptions {
        root: dir.path().to_path_buf(),
        public_base_url: "https://cdn.test/docs".to_string(),
        document_extension: "xlsx".to_string(),
        io_timeout: Duration::from_secs(2),
    })
    .unwrap();
    let policy = AllowListPolicy::new(Vec::<String>::new()).with_sender_grants(SENDER, ["ACME"]);
    let d = Dispatcher::new(
        Grammar::new(["hi"], XLSX_CONTENT_TYPE),
        Arc::new(policy),
        Arc::new(store),
        Arc::new(UriFetcher::new(Duration::from_secs(1)).unwrap()),
        ProjectId::new("ACME"),
    );

    // When: The granted sender greets and requests
    let hi = d.handle(&text("Hi")).unwrap();
    let sheet = d.handle(&text("request timesheet, ACME")).unwrap();

    // Then: The custom greeting token and base URL are honoured
    assert!(hi.text.starts_with("Welcome"));
    assert!(sheet.attachment_uris[0].starts_with("https://cdn.test/docs/timesheets/ACME/"));
}
