use std::fs;
use std::path::Path;

use lexdrill_core::serde_compat::{WireExport, import_json};
use lexdrill_core::time::unix_ms_to_iso8601;

use crate::error::{Result, StoreError};
use crate::store::Store;

impl Store {
    /// Export the full store (words, active session, history, points)
    /// as a wire-format JSON string.
    pub fn export_json_string(&self, now_ms: i64) -> Result<String> {
        let vocab = self.load_words()?;
        let session = self.load_session()?;
        let history = self.history()?;
        let points = self.points()?;

        let mut wire = WireExport::from_parts(&vocab, session.as_ref(), &history, points);
        wire.timestamp = unix_ms_to_iso8601(now_ms);
        Ok(serde_json::to_string_pretty(&wire)?)
    }

    pub fn export_json_file(&self, path: &Path, now_ms: i64) -> Result<()> {
        let json = self.export_json_string(now_ms)?;
        fs::write(path, json).map_err(|e| {
            StoreError::InvalidData(format!("failed to write {}: {e}", path.display()))
        })
    }

    /// Import a wire-format JSON string, replacing all current state.
    pub fn import_json_str(&self, json: &str) -> Result<()> {
        let export = import_json(json)?;
        let (vocab, session, history, points) = export.into_parts();

        self.save_words(&vocab)?;
        match &session {
            Some(s) => self.save_session(s)?,
            None => self.clear_session()?,
        }
        self.set_history(&history)?;
        self.set_points(points)?;
        Ok(())
    }

    pub fn import_json_file(&self, path: &Path) -> Result<()> {
        let json = fs::read_to_string(path).map_err(|e| {
            StoreError::InvalidData(format!("failed to read {}: {e}", path.display()))
        })?;
        self.import_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexdrill_core::{Judgment, Selection, SessionState, Vocabulary, WordRecord, advance};
    use rand::SeedableRng;
    use rand::rngs::SmallRng;
    use uuid::Uuid;

    const NOW: i64 = 1_771_632_000_000;

    fn seed_store() -> Store {
        let store = Store::open_in_memory().unwrap();

        let mut vocab = Vocabulary::new();
        let w1 = WordRecord::new("sonder", NOW).with_definition("awareness of other lives");
        let w2 = WordRecord::new("petrichor", NOW);
        let reviewed = advance(&w1, Judgment::Mastered, NOW);
        vocab.add(reviewed);
        vocab.add(w2);

        store.save_words(&vocab).unwrap();
        store.increment_history("2026-02-21").unwrap();
        store.add_points(60).unwrap();
        store
    }

    #[test]
    fn test_export_import_roundtrip() {
        let store = seed_store();
        let json = store.export_json_string(NOW).unwrap();

        let store2 = Store::open_in_memory().unwrap();
        store2.import_json_str(&json).unwrap();

        let vocab = store2.load_words().unwrap();
        assert_eq!(vocab.len(), 2);
        let sonder = vocab.find_by_term("sonder").unwrap();
        assert_eq!(sonder.interval, 1.0);
        assert_eq!(
            sonder.definition.as_deref(),
            Some("awareness of other lives")
        );

        assert_eq!(store2.points().unwrap(), 60);
        assert_eq!(store2.history().unwrap().get("2026-02-21"), Some(&1));
    }

    #[test]
    fn test_export_embeds_active_session() {
        let store = seed_store();
        let vocab = store.load_words().unwrap();
        let ids: Vec<Uuid> = vocab.iter().map(|w| w.id).collect();

        let session = SessionState::start(
            Selection::Ids(ids),
            &[],
            false,
            &mut SmallRng::seed_from_u64(42),
        )
        .unwrap();
        store.save_session(&session).unwrap();

        let json = store.export_json_string(NOW).unwrap();
        let store2 = Store::open_in_memory().unwrap();
        store2.import_json_str(&json).unwrap();

        let loaded = store2.load_session().unwrap().unwrap();
        assert_eq!(loaded, session);
    }

    #[test]
    fn test_import_without_session_clears_existing() {
        let store = seed_store();
        let json = store.export_json_string(NOW).unwrap();

        let store2 = Store::open_in_memory().unwrap();
        let stale = SessionState::start(
            Selection::Ids(vec![Uuid::new_v4()]),
            &[],
            false,
            &mut SmallRng::seed_from_u64(42),
        )
        .unwrap();
        store2.save_session(&stale).unwrap();

        store2.import_json_str(&json).unwrap();
        assert!(store2.load_session().unwrap().is_none());
    }

    #[test]
    fn test_import_invalid_json_is_serde_error() {
        let store = Store::open_in_memory().unwrap();
        let err = store.import_json_str("not valid json").unwrap_err();
        assert!(matches!(err, StoreError::Serde(_)));
        assert!(err.to_string().starts_with("unreadable stored state"));
    }

    #[test]
    fn test_file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("export.json");

        let store = seed_store();
        store.export_json_file(&path, NOW).unwrap();
        assert!(path.exists());

        let store2 = Store::open_in_memory().unwrap();
        store2.import_json_file(&path).unwrap();
        assert_eq!(store2.load_words().unwrap().len(), 2);
    }
}
