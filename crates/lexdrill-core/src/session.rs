//! Session queue engine: orders one sitting's words and replays misses.
//!
//! A word that is mastered on first sight exits immediately. A word that
//! ever fails enters the penalty loop and must bank three consecutive
//! Mastered judgments before it can leave — a single slip resets the
//! streak and keeps it cycling. This is deliberately stricter than the
//! long-term scheduler: one lucky guess after a genuine miss is not
//! mastery.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;

use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::STREAK_TARGET;
use crate::scheduler::{Judgment, advance};
use crate::word::Vocabulary;

/// How the words for a sitting are chosen.
#[derive(Clone, Debug)]
pub enum Selection {
    /// Take the first N words from the due-list ordering.
    Count(usize),
    /// An explicit id list, e.g. replaying a past batch.
    Ids(Vec<Uuid>),
}

#[derive(Debug, PartialEq, Eq)]
pub enum SessionError {
    /// The selection resolved to zero ids — nothing to study.
    EmptySelection,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::EmptySelection => write!(f, "nothing to study"),
        }
    }
}

impl std::error::Error for SessionError {}

/// What a single judgment triggered. Reward sinks key off the two
/// bonus flags; `session_completed` fires exactly once per session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct JudgmentOutcome {
    /// The word left the queue for good this sitting.
    pub exited: bool,
    /// Mastered without ever failing this session.
    pub first_try_mastery: bool,
    /// The queue just drained — completion bonus trigger.
    pub session_completed: bool,
    /// The judgment was dropped (stale id or inactive session).
    pub skipped: bool,
}

/// One study sitting. Fully serializable so a process restart can resume
/// mid-session; owns no word records, only ids.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Words still awaiting a judgment, head is the word on screen.
    pub queue: VecDeque<Uuid>,
    /// Queue size at session start. Progress display only, never mutated.
    pub initial_count: usize,
    /// The original, un-reordered selection — basis for "review again".
    pub last_session_ids: Vec<Uuid>,
    /// Penalty-loop streaks. A key is present iff the word has failed at
    /// least once this session; value 0 means "failed, not yet recovering".
    pub learning_streaks: BTreeMap<Uuid, u32>,
    /// Judgments made per word this session (analytics, not scheduling).
    pub attempt_counts: BTreeMap<Uuid, u32>,
    pub finished: bool,
    /// The size the learner last requested; default for the next batch.
    pub last_batch_size: usize,
}

impl SessionState {
    /// Start a sitting from a selection against the live due order.
    ///
    /// With `cram`, the resolved ids are shuffled uniformly before they
    /// become the queue (reviewing outside the due cadence, or randomized
    /// retries). Fails without side effects when nothing resolves.
    pub fn start(
        selection: Selection,
        due_order: &[Uuid],
        cram: bool,
        rng: &mut impl Rng,
    ) -> Result<Self, SessionError> {
        let (mut ids, requested) = match selection {
            Selection::Count(n) => {
                let ids: Vec<Uuid> = due_order.iter().copied().take(n).collect();
                (ids, n)
            }
            Selection::Ids(ids) => {
                let n = ids.len();
                (ids, n)
            }
        };

        if ids.is_empty() {
            return Err(SessionError::EmptySelection);
        }

        let last_session_ids = ids.clone();
        if cram {
            ids.shuffle(rng);
        }

        Ok(Self {
            initial_count: ids.len(),
            queue: ids.into(),
            last_session_ids,
            learning_streaks: BTreeMap::new(),
            attempt_counts: BTreeMap::new(),
            finished: false,
            last_batch_size: requested,
        })
    }

    /// The word currently on screen.
    pub fn current_word(&self) -> Option<Uuid> {
        self.queue.front().copied()
    }

    /// Words judged at least once this sitting.
    pub fn attempted(&self) -> usize {
        self.attempt_counts.len()
    }

    /// Words done this sitting (each queue slot is one pending word).
    pub fn completed_count(&self) -> usize {
        self.initial_count.saturating_sub(self.queue.len())
    }

    /// Apply one judgment: update the word's long-term record through the
    /// scheduler, then the queue and streak bookkeeping.
    ///
    /// An id absent from `vocab` (deleted since the session was persisted)
    /// is skipped: purged from the queue, never an error. Judgments against
    /// a finished session are inert — completion can only fire once.
    pub fn record_judgment(
        &mut self,
        vocab: &mut Vocabulary,
        word_id: Uuid,
        judgment: Judgment,
        now_ms: i64,
    ) -> JudgmentOutcome {
        let mut out = JudgmentOutcome::default();

        if self.finished {
            out.skipped = true;
            return out;
        }

        if !vocab.contains(word_id) {
            // Stale reference to a deleted word: drop it and move on
            self.queue.retain(|&id| id != word_id);
            self.learning_streaks.remove(&word_id);
            out.skipped = true;
            self.check_drained(&mut out);
            return out;
        }

        if self.current_word() != Some(word_id) {
            // Judgments only apply to the head word
            out.skipped = true;
            return out;
        }

        *self.attempt_counts.entry(word_id).or_insert(0) += 1;

        // Long-term state first — independent of queue bookkeeping
        if let Some(word) = vocab.get(word_id) {
            let updated = advance(word, judgment, now_ms);
            if let Some(slot) = vocab.get_mut(word_id) {
                *slot = updated;
            }
        }

        match judgment {
            Judgment::Mastered => match self.learning_streaks.get_mut(&word_id) {
                None => {
                    // Never failed this session: exits immediately
                    self.queue.pop_front();
                    out.exited = true;
                    out.first_try_mastery = true;
                    self.check_drained(&mut out);
                }
                Some(streak) => {
                    *streak += 1;
                    if *streak >= STREAK_TARGET {
                        self.queue.pop_front();
                        out.exited = true;
                        self.check_drained(&mut out);
                    } else {
                        self.rotate_head();
                    }
                }
            },
            Judgment::Forgot | Judgment::Uncertain => {
                self.learning_streaks.insert(word_id, 0);
                self.rotate_head();
            }
        }

        out
    }

    /// Head goes to the tail: the word must be seen again this sitting.
    fn rotate_head(&mut self) {
        if let Some(id) = self.queue.pop_front() {
            self.queue.push_back(id);
        }
    }

    /// Flip `finished` the moment the queue drains. The flag guards the
    /// completion trigger so it cannot double-fire.
    fn check_drained(&mut self, out: &mut JudgmentOutcome) {
        if !self.finished && self.queue.is_empty() {
            self.finished = true;
            out.session_completed = true;
        }
    }

    /// Start the next batch from the live due order, defaulting to the
    /// size the learner last requested.
    pub fn continue_with_next_batch(
        &self,
        size: Option<usize>,
        due_order: &[Uuid],
        rng: &mut impl Rng,
    ) -> Result<SessionState, SessionError> {
        let n = size.unwrap_or(self.last_batch_size);
        SessionState::start(Selection::Count(n), due_order, false, rng)
    }

    /// Restart from this session's original selection, shuffled.
    pub fn review_same_batch(&self, rng: &mut impl Rng) -> Result<SessionState, SessionError> {
        SessionState::start(Selection::Ids(self.last_session_ids.clone()), &[], true, rng)
    }
}
