use quotesync_core::db::open_db_in_memory;
use quotesync_core::repo::quote_store::QUOTES_KEY;
use quotesync_core::{Quote, QuoteCollection, QuoteStore, RepoError, SqliteQuoteStore};
use rusqlite::{params, Connection};

#[test]
fn empty_database_loads_empty_collection() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteQuoteStore::try_new(&conn).unwrap();

    assert!(store.load_quotes().unwrap().is_empty());
    assert_eq!(store.load_last_viewed().unwrap(), None);
}

#[test]
fn save_then_load_preserves_order_and_metadata() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteQuoteStore::try_new(&conn).unwrap();

    let quotes = QuoteCollection::from_quotes(vec![
        Quote::new_local("Second to none", "Wisdom", 10).unwrap(),
        Quote::new_local("First among equals", "Humor", 20).unwrap(),
    ])
    .unwrap();
    store.save_quotes(&quotes).unwrap();

    let loaded = store.load_quotes().unwrap();
    assert_eq!(loaded, quotes);
    assert_eq!(loaded.as_slice()[0].text, "Second to none");
    assert!(loaded.as_slice()[1].dirty);
}

#[test]
fn save_overwrites_previous_blob() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteQuoteStore::try_new(&conn).unwrap();

    let first =
        QuoteCollection::from_quotes(vec![Quote::new_local("one", "x", 0).unwrap()]).unwrap();
    store.save_quotes(&first).unwrap();
    store.save_quotes(&QuoteCollection::new()).unwrap();

    assert!(store.load_quotes().unwrap().is_empty());
    let rows: i64 = conn
        .query_row("SELECT COUNT(*) FROM kv_store;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn persisted_blob_uses_camel_case_wire_fields() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteQuoteStore::try_new(&conn).unwrap();
    let quote = Quote::new_local("Wire check", "Format", 1_700_000_000_000).unwrap();
    store
        .save_quotes(&QuoteCollection::from_quotes(vec![quote.clone()]).unwrap())
        .unwrap();

    let blob: String = conn
        .query_row(
            "SELECT value FROM kv_store WHERE key = ?1;",
            params![QUOTES_KEY],
            |row| row.get(0),
        )
        .unwrap();
    let json: serde_json::Value = serde_json::from_str(&blob).unwrap();
    assert_eq!(json[0]["id"], quote.id);
    assert_eq!(json[0]["updatedAt"], 1_700_000_000_000_i64);
    assert_eq!(json[0]["origin"], "local");
    assert_eq!(json[0]["dirty"], true);
}

#[test]
fn corrupted_blob_is_reported_as_invalid_data() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, 'not json');",
        params![QUOTES_KEY],
    )
    .unwrap();
    let store = SqliteQuoteStore::try_new(&conn).unwrap();

    let err = store.load_quotes().unwrap_err();
    assert!(matches!(err, RepoError::InvalidData(_)));
}

#[test]
fn blob_with_dirty_remote_quote_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES (?1, ?2);",
        params![
            QUOTES_KEY,
            r#"[{"id":"s-1","text":"t","category":"c","updatedAt":0,"origin":"remote","dirty":true}]"#
        ],
    )
    .unwrap();
    let store = SqliteQuoteStore::try_new(&conn).unwrap();

    assert!(matches!(
        store.load_quotes().unwrap_err(),
        RepoError::InvalidData(_)
    ));
}

#[test]
fn last_viewed_is_overwritten_in_place() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteQuoteStore::try_new(&conn).unwrap();

    store.save_last_viewed("local-1").unwrap();
    store.save_last_viewed("s-2").unwrap();

    assert_eq!(store.load_last_viewed().unwrap().as_deref(), Some("s-2"));
}

#[test]
fn store_rejects_unmigrated_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteQuoteStore::try_new(&conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert!(expected_version > 0),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}
