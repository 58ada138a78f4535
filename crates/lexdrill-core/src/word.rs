use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::MASTERED_INTERVAL;

/// Coarse memory status of a word. Derived from `interval` and
/// `repetitions` after every judgment — never authoritative on its own.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    New,
    Learning,
    Mastered,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::New => "new",
            Status::Learning => "learning",
            Status::Mastered => "mastered",
        }
    }

    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "learning" => Status::Learning,
            "mastered" => Status::Mastered,
            _ => Status::New,
        }
    }
}

/// One vocabulary item's long-term memory record.
///
/// The scheduler mutates `interval`, `ease_factor`, `repetitions`,
/// `next_review`, `last_reviewed` and the derived `status` on every
/// judgment. `interval` is kept as f64 because the Uncertain halving
/// produces fractional days, and those fractions feed back into later
/// interval growth verbatim.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WordRecord {
    pub id: Uuid,
    pub term: String,
    pub definition: Option<String>,
    pub status: Status,
    pub interval: f64,
    pub ease_factor: f64,
    pub repetitions: u32,
    /// Unix milliseconds when the word becomes due.
    pub next_review: i64,
    /// Unix milliseconds of the most recent judgment, if any.
    pub last_reviewed: Option<i64>,
}

impl WordRecord {
    /// Fresh record: due immediately, never reviewed.
    pub fn new(term: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            term: term.into(),
            definition: None,
            status: Status::New,
            interval: 0.0,
            ease_factor: 2.5,
            repetitions: 0,
            next_review: now_ms,
            last_reviewed: None,
        }
    }

    pub fn with_definition(mut self, definition: impl Into<String>) -> Self {
        self.definition = Some(definition.into());
        self
    }

    /// Whether the word is due at `now_ms`.
    pub fn is_due(&self, now_ms: i64) -> bool {
        self.next_review <= now_ms
    }
}

/// Derive status from interval and repetitions.
/// Mastered wins at interval >= 21 even when repetitions were just reset.
pub fn derive_status(interval: f64, repetitions: u32) -> Status {
    if interval >= MASTERED_INTERVAL {
        Status::Mastered
    } else if repetitions > 0 {
        Status::Learning
    } else {
        Status::New
    }
}

/// The global word collection: insertion-ordered records plus a by-id index.
///
/// Owns the records. Sessions reference them by id only, so a session can
/// outlive deletions — lookups for vanished ids simply return None.
#[derive(Clone, Debug, Default)]
pub struct Vocabulary {
    words: Vec<WordRecord>,
    index: HashMap<Uuid, usize>,
}

impl Vocabulary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records(words: Vec<WordRecord>) -> Self {
        let index = words.iter().enumerate().map(|(i, w)| (w.id, i)).collect();
        Self { words, index }
    }

    pub fn add(&mut self, word: WordRecord) -> Uuid {
        let id = word.id;
        self.index.insert(id, self.words.len());
        self.words.push(word);
        id
    }

    pub fn get(&self, id: Uuid) -> Option<&WordRecord> {
        self.index.get(&id).map(|&i| &self.words[i])
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut WordRecord> {
        self.index.get(&id).map(|&i| &mut self.words[i])
    }

    pub fn contains(&self, id: Uuid) -> bool {
        self.index.contains_key(&id)
    }

    pub fn find_by_term(&self, term: &str) -> Option<&WordRecord> {
        self.words.iter().find(|w| w.term == term)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WordRecord> {
        self.words.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WordRecord> {
        self.words.iter_mut()
    }

    /// Remove a record. Store-level operation — the scheduler never deletes.
    pub fn remove(&mut self, id: Uuid) -> Option<WordRecord> {
        let i = self.index.remove(&id)?;
        let word = self.words.remove(i);
        // Reindex everything after the removal point
        for (j, w) in self.words.iter().enumerate().skip(i) {
            self.index.insert(w.id, j);
        }
        Some(word)
    }

    /// Count of records per status, in (new, learning, mastered) order.
    pub fn status_counts(&self) -> (usize, usize, usize) {
        let mut counts = (0, 0, 0);
        for w in &self.words {
            match w.status {
                Status::New => counts.0 += 1,
                Status::Learning => counts.1 += 1,
                Status::Mastered => counts.2 += 1,
            }
        }
        counts
    }
}
