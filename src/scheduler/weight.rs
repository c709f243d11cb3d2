//! Priority weight of a single card.
//!
//! The weight is a Laplace-smoothed failure ratio, amplified by an exponent,
//! boosted for cards that have barely been seen and strongly dampened for
//! cards graded within the last few seconds:
//!
//! ```text
//! weight = clamp(((r + 1) / (g + 1))^1.5 * novelty * recency, 0.0001, 1000)
//! ```
//!
//! Weights are only comparable with other weights computed at the same `now`.

use crate::models::ProgressRecord;

/// Exponent applied to the failure ratio.
pub const RATIO_EXPONENT: f64 = 1.5;
/// Multiplier for cards graded fewer than [`NOVELTY_THRESHOLD`] times.
pub const NOVELTY_BOOST: f64 = 2.0;
pub const NOVELTY_THRESHOLD: u32 = 2;
/// Window after a grading event in which the card is dampened, in milliseconds.
pub const RECENCY_WINDOW_MS: i64 = 30_000;
pub const RECENCY_DAMPING: f64 = 0.05;
pub const MIN_WEIGHT: f64 = 0.0001;
pub const MAX_WEIGHT: f64 = 1000.0;

/// Weight of a card with the given history at `now`.
pub fn weight(record: &ProgressRecord, now: i64) -> f64 {
    let base = (f64::from(record.r) + 1.0) / (f64::from(record.g) + 1.0);
    let mut weight = base.powf(RATIO_EXPONENT);

    if record.total() < NOVELTY_THRESHOLD {
        weight *= NOVELTY_BOOST;
    }

    if now - record.last_seen < RECENCY_WINDOW_MS {
        weight *= RECENCY_DAMPING;
    }

    weight.clamp(MIN_WEIGHT, MAX_WEIGHT)
}
