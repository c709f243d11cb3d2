use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Cooldown applied after a successful recall, in milliseconds.
pub const COOLDOWN_AFTER_SUCCESS_MS: i64 = 120_000;
/// Cooldown applied after a failed recall, in milliseconds.
pub const COOLDOWN_AFTER_FAILURE_MS: i64 = 20_000;

/// Per-card review history.
///
/// A card without a stored record behaves exactly like
/// [`ProgressRecord::default()`], but nothing is persisted for it until the
/// card is graded for the first time. Timestamps are epoch milliseconds;
/// `0` means "never".
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    /// Successful recalls.
    pub g: u32,
    /// Failed recalls.
    pub r: u32,
    pub last_seen: i64,
    /// The card should not be re-served before this instant.
    pub cooldown_until: i64,
}

/// Snapshot of history keyed by card id.
pub type ProgressMap = HashMap<String, ProgressRecord>;

/// The user's self-assessment after revealing a card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Grade {
    Remembered,
    Forgot,
}

impl ProgressRecord {
    /// Record for `id` in `map`, or the zeroed record if there is none.
    pub fn lookup(map: &ProgressMap, id: &str) -> Self {
        match map.get(id) {
            Some(record) => *record,
            None => Self::default(),
        }
    }

    pub fn total(&self) -> u32 {
        self.g.saturating_add(self.r)
    }

    /// The record that results from grading this card at `now`.
    pub fn graded(&self, grade: Grade, now: i64) -> Self {
        match grade {
            Grade::Remembered => Self {
                g: self.g.saturating_add(1),
                r: self.r,
                last_seen: now,
                cooldown_until: now + COOLDOWN_AFTER_SUCCESS_MS,
            },
            Grade::Forgot => Self {
                g: self.g,
                r: self.r.saturating_add(1),
                last_seen: now,
                cooldown_until: now + COOLDOWN_AFTER_FAILURE_MS,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_persisted_field_names() {
        let record = ProgressRecord {
            g: 2,
            r: 1,
            last_seen: 1_700_000_000_000,
            cooldown_until: 1_700_000_120_000,
        };
        let json = serde_json::to_value(record).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "g": 2,
                "r": 1,
                "lastSeen": 1_700_000_000_000i64,
                "cooldownUntil": 1_700_000_120_000i64
            })
        );
    }

    #[test]
    fn remembered_grade_sets_long_cooldown() {
        let now = 1_000_000;
        let next = ProgressRecord::default().graded(Grade::Remembered, now);
        assert_eq!(next.g, 1);
        assert_eq!(next.r, 0);
        assert_eq!(next.last_seen, now);
        assert_eq!(next.cooldown_until, now + 120_000);
    }

    #[test]
    fn forgot_grade_sets_short_cooldown() {
        let now = 1_000_000;
        let prev = ProgressRecord {
            g: 3,
            r: 1,
            last_seen: 10,
            cooldown_until: 20,
        };
        let next = prev.graded(Grade::Forgot, now);
        assert_eq!((next.g, next.r), (3, 2));
        assert_eq!(next.cooldown_until, now + 20_000);
    }

    #[test]
    fn lookup_defaults_missing_ids() {
        let map = ProgressMap::new();
        assert_eq!(ProgressRecord::lookup(&map, "nope"), ProgressRecord::default());
    }
}
