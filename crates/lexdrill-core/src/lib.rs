//! Spaced-repetition scheduler and session queue engine for vocabulary
//! drilling.
//!
//! Two layers: a pure per-word scheduler ([`advance`]) that turns a recall
//! judgment into the word's next interval/ease/due state, and a session
//! engine ([`SessionState`]) that sequences one sitting's words, replaying
//! misses through a streak-based penalty loop until mastered.
//!
//! Zero I/O — no clock, no storage, no opinions about transport. Hosts
//! pass `now` in and persist the serializable state out.

pub mod constants;
pub mod due;
pub mod scheduler;
pub mod serde_compat;
pub mod session;
pub mod time;
pub mod word;

pub use constants::{DAY_MS, EASE_STEP, MASTERED_INTERVAL, MIN_EASE, STREAK_TARGET};
pub use due::{due_count, due_words};
pub use scheduler::{Judgment, advance};
pub use serde_compat::{CURRENT_VERSION, WireExport, WireWord, export_json, import_json};
pub use session::{JudgmentOutcome, Selection, SessionError, SessionState};
pub use time::{date_key, now_unix_ms, unix_ms_to_iso8601};
pub use word::{Status, Vocabulary, WordRecord, derive_status};
