//! Per-word interval/ease update.
//!
//! This is the product's idiosyncratic take on SM-2, reproduced exactly:
//! Uncertain halves the interval without rounding, so intervals can carry
//! fractional days; a later Mastered judgment feeds that fraction back
//! through `round(interval * ease)`. Faithful behavior matters more here
//! than textbook fidelity.

use crate::constants::{DAY_MS, EASE_STEP, MIN_EASE};
use crate::word::{WordRecord, derive_status};

/// The learner's self-reported recall outcome for one presentation.
///
/// Distinct from [`crate::word::Status`]: a judgment is an input, status
/// is derived state. (The product UI labels these New/Learning/Mastered
/// too, which is why they are easy to conflate.)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Judgment {
    Forgot,
    Uncertain,
    Mastered,
}

/// Compute the word's next memory state for a judgment at `now_ms`.
///
/// Pure function: no clock, no I/O, callable outside any session. All new
/// fields derive from the old snapshot — in particular a Mastered interval
/// uses the ease factor from *before* this judgment's ease bump.
pub fn advance(word: &WordRecord, judgment: Judgment, now_ms: i64) -> WordRecord {
    let mut next = word.clone();

    match judgment {
        Judgment::Forgot => {
            next.ease_factor = MIN_EASE;
            next.repetitions = 0;
            next.interval = 0.0;
        }
        Judgment::Uncertain => {
            next.ease_factor = (word.ease_factor - EASE_STEP).max(MIN_EASE);
            next.repetitions = 0;
            // Halved, not rounded — fractional days are intentional here
            next.interval = if word.interval == 0.0 {
                0.0
            } else {
                word.interval * 0.5
            };
        }
        Judgment::Mastered => {
            next.ease_factor = word.ease_factor + EASE_STEP;
            next.repetitions = word.repetitions + 1;
            next.interval = if word.interval == 0.0 {
                1.0
            } else {
                (word.interval * word.ease_factor).round()
            };
        }
    }

    next.next_review = if next.interval == 0.0 {
        now_ms
    } else {
        now_ms + (next.interval * DAY_MS as f64) as i64
    };
    next.status = derive_status(next.interval, next.repetitions);
    next.last_reviewed = Some(now_ms);

    next
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::word::Status;
    use approx::assert_relative_eq;

    const NOW: i64 = 1_771_632_000_000;

    fn word(interval: f64, ease: f64, reps: u32) -> WordRecord {
        let mut w = WordRecord::new("test", 0);
        w.interval = interval;
        w.ease_factor = ease;
        w.repetitions = reps;
        w
    }

    #[test]
    fn test_forgot_resets_everything() {
        let w = word(13.0, 2.8, 4);
        let next = advance(&w, Judgment::Forgot, NOW);

        assert_eq!(next.ease_factor, 1.3);
        assert_eq!(next.repetitions, 0);
        assert_eq!(next.interval, 0.0);
        assert_eq!(next.next_review, NOW);
        assert_eq!(next.status, Status::New);
        assert_eq!(next.last_reviewed, Some(NOW));
    }

    #[test]
    fn test_mastered_from_zero_interval() {
        let w = word(0.0, 2.5, 0);
        let next = advance(&w, Judgment::Mastered, NOW);

        assert_eq!(next.interval, 1.0);
        assert_eq!(next.repetitions, 1);
        assert_relative_eq!(next.ease_factor, 2.6, epsilon = 1e-9);
        assert_eq!(next.next_review, NOW + 86_400_000);
        assert_eq!(next.status, Status::Learning);
    }

    #[test]
    fn test_mastered_multiplies_by_old_ease() {
        // interval 4, ease 2.5 → round(4 * 2.5) = 10, ease bumped after
        let w = word(4.0, 2.5, 2);
        let next = advance(&w, Judgment::Mastered, NOW);

        assert_eq!(next.interval, 10.0);
        assert_relative_eq!(next.ease_factor, 2.6, epsilon = 1e-9);
        assert_eq!(next.repetitions, 3);
    }

    #[test]
    fn test_mastered_rounds_half_up() {
        // round(5 * 2.5) = round(12.5) = 13 with f64::round (half away from zero)
        let w = word(5.0, 2.5, 1);
        let next = advance(&w, Judgment::Mastered, NOW);
        assert_eq!(next.interval, 13.0);
    }

    #[test]
    fn test_mastered_crosses_into_mastered_status() {
        let w = word(10.0, 2.5, 3);
        let next = advance(&w, Judgment::Mastered, NOW);

        assert_eq!(next.interval, 25.0);
        assert_eq!(next.status, Status::Mastered);
    }

    #[test]
    fn test_uncertain_halves_without_rounding() {
        let w = word(5.0, 2.5, 3);
        let next = advance(&w, Judgment::Uncertain, NOW);

        assert_eq!(next.interval, 2.5);
        assert_eq!(next.repetitions, 0);
        assert_relative_eq!(next.ease_factor, 2.4, epsilon = 1e-9);
        // Fractional interval → sub-day next_review offset
        assert_eq!(next.next_review, NOW + (2.5 * 86_400_000.0) as i64);
        // repetitions reset and interval < 21 → New, the product's quirk
        assert_eq!(next.status, Status::New);
    }

    #[test]
    fn test_uncertain_on_zero_interval_stays_zero() {
        let w = word(0.0, 2.0, 0);
        let next = advance(&w, Judgment::Uncertain, NOW);

        assert_eq!(next.interval, 0.0);
        assert_eq!(next.next_review, NOW);
    }

    #[test]
    fn test_uncertain_clamps_ease() {
        let w = word(2.0, 1.35, 1);
        let next = advance(&w, Judgment::Uncertain, NOW);
        assert_eq!(next.ease_factor, 1.3);

        let again = advance(&next, Judgment::Uncertain, NOW);
        assert_eq!(again.ease_factor, 1.3);
    }

    #[test]
    fn test_fractional_interval_carries_through_mastered() {
        // 5 → Uncertain → 2.5 → Mastered → round(2.5 * 2.4) = 6
        let w = word(5.0, 2.5, 3);
        let halved = advance(&w, Judgment::Uncertain, NOW);
        let next = advance(&halved, Judgment::Mastered, NOW);

        assert_eq!(next.interval, 6.0);
    }

    #[test]
    fn test_uncertain_keeps_mastered_status_above_threshold() {
        // 50 days halves to 25, still >= 21 → stays Mastered
        let w = word(50.0, 2.5, 6);
        let next = advance(&w, Judgment::Uncertain, NOW);

        assert_eq!(next.interval, 25.0);
        assert_eq!(next.status, Status::Mastered);
    }

    #[test]
    fn test_advance_does_not_mutate_input() {
        let w = word(5.0, 2.5, 3);
        let _ = advance(&w, Judgment::Forgot, NOW);
        assert_eq!(w.interval, 5.0);
        assert_eq!(w.repetitions, 3);
    }
}
