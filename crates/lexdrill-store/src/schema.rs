use rusqlite::Connection;

use crate::error::Result;

pub const SCHEMA_VERSION: i64 = 2;

pub fn initialize(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA journal_mode = WAL;")?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update(None, "busy_timeout", 5000)?;

    // Create tables — for fresh databases this includes definition.
    // For existing v1 databases, CREATE TABLE IF NOT EXISTS is a no-op,
    // so we ALTER TABLE below to add the missing column.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS metadata (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS words (
            id            TEXT PRIMARY KEY,
            term          TEXT NOT NULL,
            definition    TEXT,
            status        TEXT NOT NULL DEFAULT 'new',
            interval      REAL NOT NULL DEFAULT 0,
            ease_factor   REAL NOT NULL,
            repetitions   INTEGER NOT NULL DEFAULT 0,
            next_review   INTEGER NOT NULL,
            last_reviewed INTEGER
        );

        CREATE TABLE IF NOT EXISTS session (
            id    INTEGER PRIMARY KEY CHECK (id = 1),
            state TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS study_history (
            day   TEXT PRIMARY KEY,
            count INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS enrichment (
            term       TEXT PRIMARY KEY,
            definition TEXT NOT NULL,
            fetched_at TEXT NOT NULL DEFAULT ''
        );

        CREATE INDEX IF NOT EXISTS idx_words_next_review ON words(next_review);
        CREATE INDEX IF NOT EXISTS idx_words_term ON words(term);
        ",
    )?;

    // Add definition to v1 databases that lack it
    if conn.prepare("SELECT definition FROM words LIMIT 0").is_err() {
        conn.execute_batch("ALTER TABLE words ADD COLUMN definition TEXT;")?;
    }

    conn.execute(
        "INSERT OR REPLACE INTO metadata (key, value) VALUES ('schema_version', ?1)",
        [SCHEMA_VERSION.to_string()],
    )?;

    Ok(())
}

pub fn get_schema_version(conn: &Connection) -> Result<Option<i64>> {
    let mut stmt = conn.prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
    let version = stmt
        .query_row([], |row| {
            let v: String = row.get(0)?;
            Ok(v.parse::<i64>().unwrap_or(0))
        })
        .ok();
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initialize_creates_tables() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        for table in &["words", "session", "study_history", "enrichment", "metadata"] {
            let count: i64 = conn
                .query_row(&format!("SELECT count(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .unwrap();
            assert!(count >= 0, "table {table} should exist");
        }
    }

    #[test]
    fn test_schema_version_set() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let version = get_schema_version(&conn).unwrap();
        assert_eq!(version, Some(SCHEMA_VERSION));
    }

    #[test]
    fn test_idempotent_initialize() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();
        initialize(&conn).unwrap(); // should not error
    }

    #[test]
    fn test_busy_timeout_set() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        let timeout: i64 = conn
            .query_row("PRAGMA busy_timeout", [], |row| row.get(0))
            .unwrap();
        assert_eq!(timeout, 5000, "busy_timeout should be 5000ms");
    }

    #[test]
    fn test_session_single_row_constraint() {
        let conn = Connection::open_in_memory().unwrap();
        initialize(&conn).unwrap();

        conn.execute("INSERT INTO session (id, state) VALUES (1, '{}')", [])
            .unwrap();
        let err = conn.execute("INSERT INTO session (id, state) VALUES (2, '{}')", []);
        assert!(err.is_err(), "only row id=1 is allowed");
    }

    #[test]
    fn test_upgrade_v1_adds_definition() {
        let conn = Connection::open_in_memory().unwrap();

        // Simulate v1 schema: no definition column
        conn.execute_batch(
            "
            CREATE TABLE metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL);
            INSERT INTO metadata (key, value) VALUES ('schema_version', '1');

            CREATE TABLE words (
                id            TEXT PRIMARY KEY,
                term          TEXT NOT NULL,
                status        TEXT NOT NULL DEFAULT 'new',
                interval      REAL NOT NULL DEFAULT 0,
                ease_factor   REAL NOT NULL,
                repetitions   INTEGER NOT NULL DEFAULT 0,
                next_review   INTEGER NOT NULL,
                last_reviewed INTEGER
            );
            INSERT INTO words (id, term, ease_factor, next_review)
            VALUES ('w1', 'sonder', 2.5, 0);
            ",
        )
        .unwrap();

        initialize(&conn).unwrap();

        let def: Option<String> = conn
            .query_row("SELECT definition FROM words WHERE id = 'w1'", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert!(def.is_none());
        assert_eq!(get_schema_version(&conn).unwrap(), Some(SCHEMA_VERSION));
    }
}
