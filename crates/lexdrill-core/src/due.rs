//! Due-list filtering and ordering.
//!
//! The ordering decides default batch composition for ordinary sessions,
//! so it must be deterministic: unscheduled words (interval 0) always
//! outrank scheduled ones, then most-overdue first within each group.

use std::cmp::Ordering;

use uuid::Uuid;

use crate::word::{Vocabulary, WordRecord};

/// Ids of all words due at `now_ms`, in drill priority order.
pub fn due_words(vocab: &Vocabulary, now_ms: i64) -> Vec<Uuid> {
    let mut due: Vec<&WordRecord> = vocab.iter().filter(|w| w.is_due(now_ms)).collect();
    due.sort_by(compare_due);
    due.into_iter().map(|w| w.id).collect()
}

/// Count of due words, for display.
pub fn due_count(vocab: &Vocabulary, now_ms: i64) -> usize {
    vocab.iter().filter(|w| w.is_due(now_ms)).count()
}

fn compare_due(a: &&WordRecord, b: &&WordRecord) -> Ordering {
    let a_scheduled = a.interval != 0.0;
    let b_scheduled = b.interval != 0.0;
    // interval == 0 group first, regardless of timestamps
    a_scheduled
        .cmp(&b_scheduled)
        .then(a.next_review.cmp(&b.next_review))
}
