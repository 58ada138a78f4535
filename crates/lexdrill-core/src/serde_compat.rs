//! JSON serde for the legacy web-app wire format.
//!
//! The wire format uses camelCase field names and lowercase status
//! strings, matching what the original app kept in localStorage. Export
//! and import must round-trip every scheduling field exactly, fractional
//! intervals included.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionState;
use crate::word::{Status, Vocabulary, WordRecord};

pub const CURRENT_VERSION: &str = "0.3.2";

// --- Wire format types ---

#[derive(Serialize, Deserialize, Debug)]
pub struct WireExport {
    pub version: String,
    pub timestamp: String,
    pub words: Vec<WireWord>,
    /// Active session, or null when the learner is idle.
    #[serde(default)]
    pub session: Option<SessionState>,
    /// Calendar-date key → judgment count for that day.
    #[serde(rename = "studyHistory", default)]
    pub study_history: BTreeMap<String, u32>,
    #[serde(default)]
    pub points: u64,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct WireWord {
    pub id: String,
    pub term: String,
    #[serde(default)]
    pub definition: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default)]
    pub interval: f64,
    pub ease_factor: f64,
    #[serde(default)]
    pub repetitions: u32,
    pub next_review: i64,
    #[serde(default)]
    pub last_reviewed: Option<i64>,
}

fn default_status() -> String {
    "new".to_string()
}

// --- Conversion: Wire → Domain ---

impl WireExport {
    pub fn into_parts(self) -> (Vocabulary, Option<SessionState>, BTreeMap<String, u32>, u64) {
        let words = self.words.into_iter().map(wire_word_to_domain).collect();
        (
            Vocabulary::from_records(words),
            self.session,
            self.study_history,
            self.points,
        )
    }

    pub fn from_parts(
        vocab: &Vocabulary,
        session: Option<&SessionState>,
        study_history: &BTreeMap<String, u32>,
        points: u64,
    ) -> Self {
        WireExport {
            version: CURRENT_VERSION.to_string(),
            timestamp: String::new(),
            words: vocab.iter().map(domain_word_to_wire).collect(),
            session: session.cloned(),
            study_history: study_history.clone(),
            points,
        }
    }
}

fn wire_word_to_domain(wire: WireWord) -> WordRecord {
    WordRecord {
        id: Uuid::parse_str(&wire.id).unwrap_or_else(|_| Uuid::new_v4()),
        term: wire.term,
        definition: wire.definition,
        status: Status::from_str_lossy(&wire.status),
        interval: wire.interval,
        ease_factor: wire.ease_factor,
        repetitions: wire.repetitions,
        next_review: wire.next_review,
        last_reviewed: wire.last_reviewed,
    }
}

fn domain_word_to_wire(word: &WordRecord) -> WireWord {
    WireWord {
        id: word.id.to_string(),
        term: word.term.clone(),
        definition: word.definition.clone(),
        status: word.status.as_str().to_string(),
        interval: word.interval,
        ease_factor: word.ease_factor,
        repetitions: word.repetitions,
        next_review: word.next_review,
        last_reviewed: word.last_reviewed,
    }
}

/// Deserialize a wire-format JSON export.
pub fn import_json(json: &str) -> Result<WireExport, serde_json::Error> {
    serde_json::from_str(json)
}

/// Serialize vocabulary + session + history to wire-format JSON.
pub fn export_json(
    vocab: &Vocabulary,
    session: Option<&SessionState>,
    study_history: &BTreeMap<String, u32>,
    points: u64,
) -> Result<String, serde_json::Error> {
    let wire = WireExport::from_parts(vocab, session, study_history, points);
    serde_json::to_string_pretty(&wire)
}
