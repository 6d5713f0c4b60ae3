// Integration tests for the migration framework

use rusqlite::Connection;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name")
        .unwrap();
    stmt.query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap()
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let result = objvers_store::migrations::apply_migrations(&mut conn);
    assert!(
        result.is_ok(),
        "Migrations should succeed: {:?}",
        result.err()
    );

    let tables = get_table_names(&conn);
    for expected in ["schema_version", "commits", "snapshots", "sqlite_sequence"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migrations_recorded_with_checksum() {
    let mut conn = setup_test_db();
    objvers_store::migrations::apply_migrations(&mut conn).unwrap();

    let checksum: String = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = '001_initial_schema'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(checksum.len(), 64);
}

#[test]
fn test_duplicate_commit_id_rejected_by_schema() {
    let mut conn = setup_test_db();
    objvers_store::migrations::apply_migrations(&mut conn).unwrap();

    conn.execute(
        "INSERT INTO commits (major, minor, author, committed_at) VALUES (1, 0, 'ann', 'x')",
        [],
    )
    .unwrap();
    let duplicate = conn.execute(
        "INSERT INTO commits (major, minor, author, committed_at) VALUES (1, 0, 'bob', 'y')",
        [],
    );
    assert!(duplicate.is_err());
}
