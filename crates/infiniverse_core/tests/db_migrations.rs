use infiniverse_core::db::migrations::{current_user_version, latest_version};
use infiniverse_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

const TABLES: [&str; 5] = ["lands", "deposits", "registry_meta", "polys", "persistents"];

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(current_user_version(&conn).unwrap(), latest_version());
    for table in TABLES {
        assert_table_exists(&conn, table);
    }
    assert_index_exists(&conn, "idx_lands_lat_north");
    assert_index_exists(&conn, "idx_persistents_source");
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_first).unwrap(), latest_version());
    conn_first
        .execute(
            "INSERT INTO deposits (owner, balance, symbol, payer) VALUES ('alice', 7, 'INF', 'alice');",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&path).unwrap();
    assert_eq!(current_user_version(&conn_second).unwrap(), latest_version());
    let balance: i64 = conn_second
        .query_row("SELECT balance FROM deposits WHERE owner = 'alice';", [], |row| {
            row.get(0)
        })
        .unwrap();
    assert_eq!(balance, 7);
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
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

#[test]
fn schema_rejects_negative_balances_and_inverted_parcels() {
    let conn = open_db_in_memory().unwrap();

    let negative = conn.execute(
        "INSERT INTO deposits (owner, balance, symbol, payer) VALUES ('alice', -1, 'INF', 'alice');",
        [],
    );
    assert!(negative.is_err());

    let inverted = conn.execute(
        "INSERT INTO lands (id, owner, lat_north_edge, long_east_edge, lat_south_edge, long_west_edge, reg_end_date, payer)
         VALUES (0, 'alice', 1.0, 2.0, 1.5, 1.0, 0, 'alice');",
        [],
    );
    assert!(inverted.is_err());
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    assert_schema_object(conn, "table", table_name);
}

fn assert_index_exists(conn: &Connection, index_name: &str) {
    assert_schema_object(conn, "index", index_name);
}

fn assert_schema_object(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
