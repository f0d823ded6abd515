// Integration tests for the embedded migration runner

use rusqlite::Connection;
use tempfile::TempDir;

#[test]
fn test_fresh_file_database_migrates() {
    // Given: An empty database file
    let dir = TempDir::new().unwrap();
    let mut conn = formdesk_store::db::open(dir.path().join("index.db")).unwrap();

    // When: Migrations are applied
    formdesk_store::migrations::apply_migrations(&mut conn).unwrap();

    // Then: Both migrations are recorded with checksums
    let rows: Vec<(String, String)> = conn
        .prepare("SELECT migration_id, checksum FROM schema_version ORDER BY id")
        .unwrap()
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].0, "001_artifact_index");
    assert_eq!(rows[1].0, "002_version_counters");
    assert!(rows.iter().all(|(_, sum)| sum.len() == 64));
}

#[test]
fn test_reopen_is_idempotent() {
    // Given: A migrated database
    let mut conn = Connection::open_in_memory().unwrap();
    formdesk_store::migrations::apply_migrations(&mut conn).unwrap();

    // When: Migrations run again
    let result = formdesk_store::migrations::apply_migrations(&mut conn);

    // Then: Nothing fails
    assert!(result.is_ok());
}
