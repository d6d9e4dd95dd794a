use quotesync_core::db::migrations::{migrate, stored_schema_version, supported_schema_version};
use quotesync_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn), supported_schema_version());
    assert_table_exists(&conn, "kv_store");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("quotes.sqlite3");

    let conn_first = open_db(&path).unwrap();
    conn_first
        .execute(
            "INSERT INTO kv_store (key, value) VALUES ('probe', 'kept');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_second), supported_schema_version());
    let value: String = conn_second
        .query_row("SELECT value FROM kv_store WHERE key = 'probe';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(value, "kept");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    match open_db(&path).unwrap_err() {
        DbError::SchemaTooNew { found, supported } => {
            assert_eq!(found, 999);
            assert_eq!(supported, supported_schema_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn migrate_upgrades_raw_connection_and_is_repeatable() {
    let mut conn = Connection::open_in_memory().unwrap();
    assert_eq!(stored_schema_version(&conn).unwrap(), 0);

    migrate(&mut conn).unwrap();
    migrate(&mut conn).unwrap();

    assert_eq!(stored_schema_version(&conn).unwrap(), supported_schema_version());
    assert_table_exists(&conn, "kv_store");
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
