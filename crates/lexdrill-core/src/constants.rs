//! Product constants for the scheduler and session engine.

/// Floor for the ease factor. Every update clamps to this.
pub const MIN_EASE: f64 = 1.3;

/// How much a single judgment moves the ease factor (up on Mastered,
/// down on Uncertain).
pub const EASE_STEP: f64 = 0.1;

/// Interval (in days) at or above which a word counts as Mastered.
pub const MASTERED_INTERVAL: f64 = 21.0;

/// One day in milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// Consecutive in-session Mastered judgments required to leave the
/// penalty loop.
pub const STREAK_TARGET: u32 = 3;
