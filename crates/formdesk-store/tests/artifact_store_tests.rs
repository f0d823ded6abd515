// Integration tests for the artifact store
// Covers versioning, idempotent lookups, URI round trips and concurrent writers

use formdesk_core::{ArtifactKey, ExErrorKind, Period, ProjectId};
use formdesk_store::{ArtifactStore, StoreOptions};
use std::time::Duration;
use tempfile::TempDir;

const BASE_URL: &str = "http://localhost:5000/files";

fn setup_store(dir: &TempDir) -> ArtifactStore {
    ArtifactStore::open(StoreOptions {
        root: dir.path().to_path_buf(),
        public_base_url: BASE_URL.to_string(),
        document_extension: "xlsx".to_string(),
        io_timeout: Duration::from_secs(10),
    })
    .expect("Failed to open store")
}

#[test]
fn test_submitted_content_reads_back_byte_identical() {
    // Given: A fresh store
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1234"));
    let content: Vec<u8> = (0..=255u8).cycle().take(4096).collect();

    // When: Content is submitted and its URI resolved
    let record = store.submit_new_version(&key, &content).unwrap();
    let uri = store.resolve_uri(&record);

    // Then: Reading the URI returns the exact bytes
    assert!(uri.starts_with(BASE_URL));
    assert_eq!(store.read_uri(&uri).unwrap(), content);
}

#[test]
fn test_repeated_requests_yield_same_uri() {
    // Given: A store with a generated report
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::report(ProjectId::new("P1234"), Period::Yearly { year: 2024 });
    let first = store.get_or_create(&key, || b"report 2024".to_vec()).unwrap();

    // When: The same report is requested again
    let second = store.get_or_create(&key, || b"regenerated".to_vec()).unwrap();

    // Then: The cached record and URI are returned
    assert_eq!(store.resolve_uri(&first), store.resolve_uri(&second));
    assert_eq!(second.content, b"report 2024");
}

#[test]
fn test_submission_changes_timesheet_uri() {
    // Given: A blank timesheet handed out once
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1234"));
    let blank = store.get_or_create(&key, || b"blank".to_vec()).unwrap();

    // When: A filled-in timesheet is submitted
    store.submit_new_version(&key, b"filled").unwrap();
    let after = store.get_or_create(&key, || b"blank".to_vec()).unwrap();

    // Then: The next request points at the new version
    assert_ne!(store.resolve_uri(&blank), store.resolve_uri(&after));
    assert_eq!(after.version, 2);
}

#[test]
fn test_concurrent_submissions_yield_contiguous_versions() {
    // Given: A fresh store and N writers for one project
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1234"));
    const N: u32 = 16;

    // When: All writers submit at once
    let mut versions: Vec<u32> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..N)
            .map(|i| {
                let store = &store;
                let key = &key;
                s.spawn(move || {
                    store
                        .submit_new_version(key, format!("sheet {}", i).as_bytes())
                        .unwrap()
                        .version
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Then: Versions are exactly 1..=N with no gaps or duplicates
    versions.sort_unstable();
    assert_eq!(versions, (1..=N).collect::<Vec<_>>());

    // And: The index agrees
    let history = store.history(&key).unwrap();
    assert_eq!(history.len(), N as usize);
    assert_eq!(history.last().unwrap().version, N);
}

#[test]
fn test_concurrent_duplicate_requests_create_once() {
    // Given: A fresh store
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::report(ProjectId::new("P1234"), Period::Weekly);

    // When: Many threads request the same report at once
    let uris: Vec<String> = std::thread::scope(|s| {
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = &store;
                let key = &key;
                s.spawn(move || {
                    let record = store
                        .get_or_create(key, || format!("report {}", i).into_bytes())
                        .unwrap();
                    store.resolve_uri(&record)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    // Then: Every caller got the same URI and one version exists
    assert!(uris.windows(2).all(|w| w[0] == w[1]));
    assert_eq!(store.history(&key).unwrap().len(), 1);
}

#[test]
fn test_two_store_instances_share_counter() {
    // Given: Two stores opened on the same root (as two processes would)
    let dir = TempDir::new().unwrap();
    let a = setup_store(&dir);
    let b = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1234"));

    // When: Both submit concurrently
    let mut versions: Vec<u32> = std::thread::scope(|s| {
        let ha = s.spawn(|| {
            (0..5)
                .map(|_| a.submit_new_version(&key, b"a").unwrap().version)
                .collect::<Vec<_>>()
        });
        let hb = s.spawn(|| {
            (0..5)
                .map(|_| b.submit_new_version(&key, b"b").unwrap().version)
                .collect::<Vec<_>>()
        });
        let mut all = ha.join().unwrap();
        all.extend(hb.join().unwrap());
        all
    });

    // Then: SQLite serializes them into one contiguous sequence
    versions.sort_unstable();
    assert_eq!(versions, (1..=10).collect::<Vec<_>>());
}

#[test]
fn test_history_records_digests() {
    // Given: Two submissions
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1"));
    store.submit_new_version(&key, b"one").unwrap();
    store.submit_new_version(&key, b"two").unwrap();

    // When: History is listed
    let history = store.history(&key).unwrap();

    // Then: Entries are ordered with distinct SHA-256 digests
    assert_eq!(history[0].version, 1);
    assert_eq!(history[1].version, 2);
    assert_eq!(history[0].content_digest.len(), 64);
    assert_ne!(history[0].content_digest, history[1].content_digest);
    assert_eq!(history[1].size_bytes, 3);
}

#[test]
fn test_traversal_uri_is_not_served() {
    // Given: A store with one artifact
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1"));
    store.submit_new_version(&key, b"x").unwrap();

    // When: A URI tries to climb out of the content tree
    let err = store
        .read_uri(&format!("{}/timesheets/../index.db", BASE_URL))
        .unwrap_err();

    // Then: It is treated as unknown
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_failed_content_write_does_not_advance_counter() {
    // Given: A plain file squatting on the project's timesheet directory
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1"));
    let blocker = dir.path().join("timesheets").join("P1");
    std::fs::create_dir_all(blocker.parent().unwrap()).unwrap();
    std::fs::write(&blocker, b"not a directory").unwrap();

    // When: A submission is attempted
    let err = store.submit_new_version(&key, b"lost").unwrap_err();

    // Then: The write fails as unavailable and nothing is indexed
    assert_eq!(err.kind(), ExErrorKind::StorageUnavailable);
    assert!(store.history(&key).unwrap().is_empty());

    // When: The blocker is removed and the submission retried
    std::fs::remove_file(&blocker).unwrap();
    let record = store.submit_new_version(&key, b"kept").unwrap();

    // Then: The retry takes version 1 and its bytes read back
    assert_eq!(record.version, 1);
    assert_eq!(store.read_uri(&store.resolve_uri(&record)).unwrap(), b"kept");
}

#[test]
fn test_mixed_requests_and_submissions_keep_history_contiguous() {
    // Given: One store shared by readers and writers of the same timesheet
    let dir = TempDir::new().unwrap();
    let store = setup_store(&dir);
    let key = ArtifactKey::timesheet(ProjectId::new("P1234"));

    // When: Threads interleave get_or_create and submit_new_version
    std::thread::scope(|s| {
        for t in 0..8 {
            let (store, key) = (&store, &key);
            s.spawn(move || {
                for round in 0..10 {
                    if (t + round) % 2 == 0 {
                        store.get_or_create(key, || b"blank".to_vec()).unwrap();
                    } else {
                        store.submit_new_version(key, b"filled").unwrap();
                    }
                }
            });
        }
    });

    // Then: Versions form a gap-free run starting at 1
    let versions: Vec<u32> = store
        .history(&key)
        .unwrap()
        .iter()
        .map(|e| e.version)
        .collect();
    let expected: Vec<u32> = (1..=versions.len() as u32).collect();
    assert_eq!(versions, expected);
    assert!(versions.len() >= 40);
}
