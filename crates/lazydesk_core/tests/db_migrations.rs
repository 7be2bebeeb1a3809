use lazydesk_core::db::migrations::latest_version;
use lazydesk_core::db::{open_db, open_db_in_memory, DbError, Gateway};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), latest_version());
    for table in [
        "emails",
        "notifications",
        "study_sessions",
        "learning_resources",
        "coding_projects",
        "nlp_tasks",
    ] {
        assert_table_exists(&conn, table);
    }
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("assistant.db");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first), latest_version());
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    assert_table_exists(&conn_second, "notifications");
}

#[test]
fn gateway_connections_see_each_others_writes() {
    let dir = tempfile::tempdir().unwrap();
    let gateway = Gateway::open(dir.path().join("assistant.db")).unwrap();

    let writer = gateway.connect().unwrap();
    writer
        .execute(
            "INSERT INTO coding_projects (name, language, status, created_date)
             VALUES ('Parser', 'rust', 'active', '2026-06-10');",
            [],
        )
        .unwrap();
    drop(writer);

    let reader = gateway.clone().connect().unwrap();
    let count: i64 = reader
        .query_row("SELECT COUNT(*) FROM coding_projects;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = Gateway::open(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
