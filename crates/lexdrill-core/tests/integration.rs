//! Integration tests exercising the full drill pipeline:
//! vocabulary → due list → session → judgments → export/resume.

use std::collections::BTreeMap;

use lexdrill_core::{
    Judgment, MIN_EASE, Selection, SessionState, Status, Vocabulary, WordRecord, advance,
    due_words, export_json, import_json,
};
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::SmallRng;

const NOW: i64 = 1_771_632_000_000;
const DAY: i64 = 86_400_000;

fn rng() -> SmallRng {
    SmallRng::seed_from_u64(42)
}

fn seed_vocab(terms: &[&str]) -> Vocabulary {
    let mut vocab = Vocabulary::new();
    for t in terms {
        vocab.add(WordRecord::new(*t, NOW));
    }
    vocab
}

/// Test 1: a fresh vocabulary drills to completion and every first-try
/// mastered word lands on a one-day interval.
#[test]
fn fresh_batch_drills_to_completion() {
    let mut vocab = seed_vocab(&["sonder", "petrichor", "vellichor"]);
    let due = due_words(&vocab, NOW);
    assert_eq!(due.len(), 3, "fresh words are due immediately");

    let mut session = SessionState::start(Selection::Count(10), &due, false, &mut rng()).unwrap();
    assert_eq!(session.initial_count, 3);

    let mut completed = false;
    while let Some(id) = session.current_word() {
        let out = session.record_judgment(&mut vocab, id, Judgment::Mastered, NOW);
        completed |= out.session_completed;
    }
    assert!(completed);
    assert!(session.finished);

    for w in vocab.iter() {
        assert_eq!(w.interval, 1.0);
        assert_eq!(w.status, Status::Learning);
        assert_eq!(w.next_review, NOW + DAY);
    }

    // Nothing is due any more → next batch reports empty
    let due = due_words(&vocab, NOW);
    assert!(due.is_empty());
    assert!(session.continue_with_next_batch(None, &due, &mut rng()).is_err());
}

/// Test 2: a failed word cycles until three consecutive masteries while
/// the rest of the batch exits around it.
#[test]
fn mixed_batch_penalty_loop() {
    let mut vocab = seed_vocab(&["easy1", "hard", "easy2"]);
    let due = due_words(&vocab, NOW);
    let mut session = SessionState::start(Selection::Count(3), &due, false, &mut rng()).unwrap();

    let hard = vocab.find_by_term("hard").unwrap().id;
    let mut judgments: i64 = 0;
    let mut hard_fails = 0;
    while let Some(id) = session.current_word() {
        let j = if id == hard && hard_fails < 2 {
            hard_fails += 1;
            Judgment::Forgot
        } else {
            Judgment::Mastered
        };
        session.record_judgment(&mut vocab, id, j, NOW + judgments * 1000);
        judgments += 1;
    }

    assert!(session.finished);
    // easy words: 1 attempt each; hard word: 2 failures + 3 masteries
    assert_eq!(session.attempt_counts.len(), 3);
    assert_eq!(session.attempt_counts.get(&hard), Some(&5));
    assert_eq!(session.learning_streaks.get(&hard), Some(&3));

    let hard_rec = vocab.get(hard).unwrap();
    assert!(
        (hard_rec.ease_factor - (MIN_EASE + 0.3)).abs() < 1e-9,
        "two resets then three bumps: {}",
        hard_rec.ease_factor
    );
}

/// Test 3: scheduling across simulated days — due list shrinks and
/// regrows as intervals mature.
#[test]
fn multi_day_scheduling() {
    let mut vocab = seed_vocab(&["w"]);
    let id = vocab.iter().next().unwrap().id;

    // Day 0: master from scratch → due tomorrow
    let w = advance(vocab.get(id).unwrap(), Judgment::Mastered, NOW);
    *vocab.get_mut(id).unwrap() = w;
    assert!(due_words(&vocab, NOW).is_empty());
    assert_eq!(due_words(&vocab, NOW + DAY).len(), 1);

    // Day 1: master again → interval round(1 * 2.6) = 3 days out
    let w = advance(vocab.get(id).unwrap(), Judgment::Mastered, NOW + DAY);
    *vocab.get_mut(id).unwrap() = w;
    let w = vocab.get(id).unwrap();
    assert_eq!(w.interval, 3.0);
    assert!(due_words(&vocab, NOW + 3 * DAY).is_empty());
    assert_eq!(due_words(&vocab, NOW + 4 * DAY).len(), 1);
}

/// Test 4: export mid-session, import, and finish the sitting in the
/// restored state — restart-resume with no replay logic.
#[test]
fn export_import_resumes_mid_session() {
    let mut vocab = seed_vocab(&["alpha", "beta"]);
    let due = due_words(&vocab, NOW);
    let mut session = SessionState::start(Selection::Count(2), &due, false, &mut rng()).unwrap();

    let alpha = session.current_word().unwrap();
    session.record_judgment(&mut vocab, alpha, Judgment::Uncertain, NOW);

    let mut history = BTreeMap::new();
    history.insert("2026-02-21".to_string(), 1u32);
    let json = export_json(&vocab, Some(&session), &history, 10).unwrap();

    // Simulated restart: last serialized state loaded verbatim
    let (mut vocab2, session2, history2, points2) = import_json(&json).unwrap().into_parts();
    let mut session2 = session2.unwrap();
    assert_eq!(session2, session);
    assert_eq!(history2.get("2026-02-21"), Some(&1));
    assert_eq!(points2, 10);

    // beta is now at the head; alpha still owes three masteries
    let beta = session2.current_word().unwrap();
    assert_ne!(beta, alpha);
    session2.record_judgment(&mut vocab2, beta, Judgment::Mastered, NOW);
    for _ in 0..3 {
        assert!(!session2.finished);
        session2.record_judgment(&mut vocab2, alpha, Judgment::Mastered, NOW);
    }
    assert!(session2.finished);
}

/// Test 5: cram replay of a finished batch touches every word again.
#[test]
fn cram_replay_of_finished_batch() {
    let mut vocab = seed_vocab(&["a", "b", "c", "d"]);
    let due = due_words(&vocab, NOW);
    let mut session = SessionState::start(Selection::Count(4), &due, false, &mut rng()).unwrap();

    while let Some(id) = session.current_word() {
        session.record_judgment(&mut vocab, id, Judgment::Mastered, NOW);
    }
    assert!(session.finished);

    // None are due, but the replay works from the recorded batch
    assert!(due_words(&vocab, NOW).is_empty());
    let mut replay = session.review_same_batch(&mut rng()).unwrap();
    assert_eq!(replay.initial_count, 4);

    let mut seen = 0;
    while let Some(id) = replay.current_word() {
        replay.record_judgment(&mut vocab, id, Judgment::Mastered, NOW);
        seen += 1;
    }
    assert_eq!(seen, 4);
    assert!(replay.finished);
}

proptest! {
    /// Ease factor never drops below the floor across any judgment
    /// sequence, and intervals never go negative.
    #[test]
    fn ease_never_below_floor(seq in prop::collection::vec(0u8..3, 0..100)) {
        let mut word = WordRecord::new("prop", NOW);
        for (i, code) in seq.iter().enumerate() {
            let judgment = match code {
                0 => Judgment::Forgot,
                1 => Judgment::Uncertain,
                _ => Judgment::Mastered,
            };
            word = advance(&word, judgment, NOW + i as i64 * DAY);
            prop_assert!(word.ease_factor >= MIN_EASE - 1e-12);
            prop_assert!(word.interval >= 0.0);
            prop_assert!(word.next_review >= NOW);
        }
    }

    /// Status derivation is consistent with the invariants after any
    /// single judgment from any reachable-ish state.
    #[test]
    fn status_matches_invariants(
        interval in 0.0f64..200.0,
        ease in 1.3f64..3.5,
        reps in 0u32..20,
        code in 0u8..3,
    ) {
        let mut w = WordRecord::new("prop", NOW);
        w.interval = interval;
        w.ease_factor = ease;
        w.repetitions = reps;

        let judgment = match code {
            0 => Judgment::Forgot,
            1 => Judgment::Uncertain,
            _ => Judgment::Mastered,
        };
        let next = advance(&w, judgment, NOW);

        let expected = if next.interval >= 21.0 {
            Status::Mastered
        } else if next.repetitions > 0 {
            Status::Learning
        } else {
            Status::New
        };
        prop_assert_eq!(next.status, expected);
    }
}
