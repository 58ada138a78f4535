use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{Connection, OptionalExtension, params};
use uuid::Uuid;

use lexdrill_core::{SessionState, Status, Vocabulary, WordRecord};

use crate::error::{Result, StoreError};
use crate::schema;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        schema::initialize(&conn)?;
        Ok(Self { conn })
    }

    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    // --- Metadata ---

    pub fn get_metadata(&self, key: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = ?1")?;
        let result = stmt.query_row([key], |row| row.get(0)).ok();
        Ok(result)
    }

    pub fn set_metadata(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO metadata (key, value) VALUES (?1, ?2)",
            params![key, value],
        )?;
        Ok(())
    }

    // --- Words ---

    /// Replace the whole word collection in one transaction.
    pub fn save_words(&self, vocab: &Vocabulary) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM words;")?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO words (id, term, definition, status, interval, ease_factor, repetitions, next_review, last_reviewed)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            )?;
            for word in vocab.iter() {
                stmt.execute(params![
                    word.id.to_string(),
                    word.term,
                    word.definition,
                    word.status.as_str(),
                    word.interval,
                    word.ease_factor,
                    word.repetitions,
                    word.next_review,
                    word.last_reviewed,
                ])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Load all words in insertion (rowid) order.
    pub fn load_words(&self) -> Result<Vocabulary> {
        let mut stmt = self.conn.prepare(
            "SELECT id, term, definition, status, interval, ease_factor, repetitions, next_review, last_reviewed
             FROM words ORDER BY rowid",
        )?;

        let rows: Vec<(String, String, Option<String>, String, f64, f64, u32, i64, Option<i64>)> =
            stmt.query_map([], |row| {
                Ok((
                    row.get(0)?,
                    row.get(1)?,
                    row.get(2)?,
                    row.get(3)?,
                    row.get(4)?,
                    row.get(5)?,
                    row.get(6)?,
                    row.get(7)?,
                    row.get(8)?,
                ))
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut words = Vec::with_capacity(rows.len());
        for (id_str, term, definition, status, interval, ease_factor, repetitions, next_review, last_reviewed) in rows {
            words.push(WordRecord {
                id: parse_uuid(&id_str)?,
                term,
                definition,
                status: Status::from_str_lossy(&status),
                interval,
                ease_factor,
                repetitions,
                next_review,
                last_reviewed,
            });
        }

        Ok(Vocabulary::from_records(words))
    }

    /// Append a single word without rewriting the collection.
    pub fn insert_word(&self, word: &WordRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO words (id, term, definition, status, interval, ease_factor, repetitions, next_review, last_reviewed)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                word.id.to_string(),
                word.term,
                word.definition,
                word.status.as_str(),
                word.interval,
                word.ease_factor,
                word.repetitions,
                word.next_review,
                word.last_reviewed,
            ],
        )?;
        Ok(())
    }

    /// Targeted scheduling update after a judgment (no full rewrite).
    pub fn update_word(&self, word: &WordRecord) -> Result<()> {
        let rows = self.conn.execute(
            "UPDATE words SET definition = ?1, status = ?2, interval = ?3, ease_factor = ?4,
                              repetitions = ?5, next_review = ?6, last_reviewed = ?7
             WHERE id = ?8",
            params![
                word.definition,
                word.status.as_str(),
                word.interval,
                word.ease_factor,
                word.repetitions,
                word.next_review,
                word.last_reviewed,
                word.id.to_string(),
            ],
        )?;
        if rows == 0 {
            return Err(StoreError::InvalidData(format!(
                "word not found: {}",
                word.id
            )));
        }
        Ok(())
    }

    pub fn delete_word(&self, id: Uuid) -> Result<bool> {
        let rows = self
            .conn
            .execute("DELETE FROM words WHERE id = ?1", [id.to_string()])?;
        Ok(rows > 0)
    }

    // --- Session ---

    /// Persist the active session. Called after every mutation so a
    /// reload can resume mid-sitting.
    pub fn save_session(&self, session: &SessionState) -> Result<()> {
        let state = serde_json::to_string(session)?;
        self.conn.execute(
            "INSERT OR REPLACE INTO session (id, state) VALUES (1, ?1)",
            [state],
        )?;
        Ok(())
    }

    /// Load the persisted session, if any. An absent row is the normal
    /// "no active session" state; an unparseable row is corrupt persisted
    /// state and degrades to the same thing with a warning.
    pub fn load_session(&self) -> Result<Option<SessionState>> {
        let state: Option<String> = self
            .conn
            .query_row("SELECT state FROM session WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?;

        let Some(state) = state else {
            return Ok(None);
        };

        match serde_json::from_str(&state) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("discarding corrupt session state: {e}");
                Ok(None)
            }
        }
    }

    pub fn clear_session(&self) -> Result<()> {
        self.conn.execute("DELETE FROM session WHERE id = 1", [])?;
        Ok(())
    }

    // --- Study history ---

    /// Bump the judgment counter for a calendar date (one per judgment,
    /// regardless of outcome).
    pub fn increment_history(&self, day: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO study_history (day, count) VALUES (?1, 1)
             ON CONFLICT(day) DO UPDATE SET count = count + 1",
            [day],
        )?;
        Ok(())
    }

    pub fn history(&self) -> Result<BTreeMap<String, u32>> {
        let mut stmt = self
            .conn
            .prepare("SELECT day, count FROM study_history ORDER BY day")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, u32>(1)?)))?
            .collect::<std::result::Result<_, _>>()?;
        Ok(rows)
    }

    pub fn set_history(&self, history: &BTreeMap<String, u32>) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute_batch("DELETE FROM study_history;")?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO study_history (day, count) VALUES (?1, ?2)")?;
            for (day, count) in history {
                stmt.execute(params![day, count])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // --- Points ledger ---

    pub fn points(&self) -> Result<u64> {
        Ok(self
            .get_metadata("points")?
            .and_then(|v| v.parse().ok())
            .unwrap_or(0))
    }

    pub fn add_points(&self, amount: u64) -> Result<u64> {
        let total = self.points()? + amount;
        self.set_metadata("points", &total.to_string())?;
        Ok(total)
    }

    pub fn set_points(&self, total: u64) -> Result<()> {
        self.set_metadata("points", &total.to_string())
    }

    // --- Enrichment cache ---

    /// Cache an async enrichment result, keyed by term. Last write wins —
    /// there is no ordering guarantee between in-flight fetches.
    pub fn put_enrichment(&self, term: &str, definition: &str, fetched_at: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO enrichment (term, definition, fetched_at) VALUES (?1, ?2, ?3)",
            params![term, definition, fetched_at],
        )?;
        Ok(())
    }

    pub fn get_enrichment(&self, term: &str) -> Result<Option<String>> {
        let result = self
            .conn
            .query_row(
                "SELECT definition FROM enrichment WHERE term = ?1",
                [term],
                |row| row.get(0),
            )
            .optional()?;
        Ok(result)
    }

    /// Wipe everything — words, session, history, points, caches.
    pub fn clear_all(&self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM words;
             DELETE FROM session;
             DELETE FROM study_history;
             DELETE FROM enrichment;
             DELETE FROM metadata WHERE key != 'schema_version';",
        )?;
        Ok(())
    }
}

fn parse_uuid(s: &str) -> Result<Uuid> {
    Uuid::parse_str(s).map_err(|e| StoreError::InvalidData(format!("invalid UUID '{s}': {e}")))
}
