//! SM-2 Spaced Repetition Algorithm
//!
//! Computes the next review interval, repetition count and ease factor for a
//! vocabulary item from a recall quality rating.
//!
//! Quality ratings (0-5):
//! - 0: Complete blackout, no recall
//! - 1: Incorrect, but upon seeing answer, remembered
//! - 2: Incorrect, but answer seemed easy to recall
//! - 3: Correct response with serious difficulty
//! - 4: Correct response after hesitation
//! - 5: Perfect response with no hesitation

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::vocabulary::models::{VocabularyItem, WordStatus};

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Ease factor used when a stored value is unusable
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Lowest quality that counts as a successful recall
pub const PASSING_QUALITY: u8 = 3;

/// Longest interval the scheduler hands out (about a century)
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// Repetitions after which a word moves up a learning level
const PROMOTE_AT_REPETITIONS: u32 = 2;

/// Repetitions after which a word is mastered
const MASTER_AT_REPETITIONS: u32 = 4;

/// Result of calculating the next review
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReviewOutcome {
    pub interval: u32,
    pub repetitions: u32,
    pub ease_factor: f64,
    pub next_review_date: DateTime<Utc>,
}

/// Clamp any integer grade into the 0-5 quality scale
pub fn clamp_quality(quality: i32) -> u8 {
    quality.clamp(0, 5) as u8
}

fn sanitize_ease_factor(ease_factor: f64) -> f64 {
    if ease_factor.is_finite() {
        ease_factor.max(MIN_EASE_FACTOR)
    } else {
        DEFAULT_EASE_FACTOR
    }
}

/// Calculate the next SRS state using SM-2.
///
/// Total over its domain: out-of-range quality is clamped into 0-5 and an
/// unusable ease factor is replaced before use.
pub fn compute_next_state(
    quality: i32,
    repetitions: u32,
    ease_factor: f64,
    interval_days: u32,
    now: DateTime<Utc>,
) -> ReviewOutcome {
    let quality = clamp_quality(quality);
    let ease_factor = sanitize_ease_factor(ease_factor);

    let (interval, repetitions, ease_factor) = if quality < PASSING_QUALITY {
        // Failed recall: start over, ease unchanged
        (1, 0, ease_factor)
    } else {
        let interval = match repetitions {
            0 => 1,
            1 => 6,
            _ => (interval_days as f64 * ease_factor).round() as u32,
        }
        .min(MAX_INTERVAL_DAYS);

        // EF' = EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02))
        let miss = (5 - quality) as f64;
        let next_ease = (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR);

        (interval, repetitions.saturating_add(1), next_ease)
    };

    ReviewOutcome {
        interval,
        repetitions,
        ease_factor,
        next_review_date: now
            .checked_add_signed(Duration::days(i64::from(interval)))
            .unwrap_or(DateTime::<Utc>::MAX_UTC),
    }
}

/// Scheduler step for a stored item
pub fn next_state_for(item: &VocabularyItem, quality: i32, now: DateTime<Utc>) -> ReviewOutcome {
    compute_next_state(
        quality,
        item.repetitions,
        item.ease_factor,
        item.interval_days,
        now,
    )
}

/// Learning status after a review.
///
/// A failed review drops one level but never below New; otherwise four
/// repetitions master the word and two move it up a level, capped at the
/// last learning level.
pub fn derive_status(current: WordStatus, quality: i32, new_repetitions: u32) -> WordStatus {
    let code = current.code();
    if clamp_quality(quality) < PASSING_QUALITY {
        WordStatus::from_code((code - 1).max(1))
    } else if new_repetitions >= MASTER_AT_REPETITIONS {
        WordStatus::Mastered
    } else if new_repetitions >= PROMOTE_AT_REPETITIONS {
        WordStatus::from_code((code + 1).min(4))
    } else {
        current
    }
}

/// The four answer buttons offered after revealing a card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReviewGrade {
    Again,
    Hard,
    Good,
    Easy,
}

impl ReviewGrade {
    pub const ALL: [ReviewGrade; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// SM-2 quality for this grade
    pub fn quality(self) -> i32 {
        match self {
            Self::Again => 1,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "again" | "a" => Some(Self::Again),
            "hard" | "h" => Some(Self::Hard),
            "good" | "g" => Some(Self::Good),
            "easy" | "e" => Some(Self::Easy),
            _ => None,
        }
    }
}

/// Intervals each grade would give, in Again/Hard/Good/Easy order
pub fn preview_intervals(item: &VocabularyItem, now: DateTime<Utc>) -> [u32; 4] {
    ReviewGrade::ALL.map(|grade| next_state_for(item, grade.quality(), now).interval)
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
    match days {
        0 => "now".to_string(),
        1..=6 => format!("{}d", days),
        7..=29 => format!("{}w", days / 7),
        30..=364 => format!("{}mo", days / 30),
        _ => format!("{}y", days / 365),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 6, 15, 18, 45, 0).unwrap()
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_failure_resets() {
        for quality in 0..=2 {
            let result = compute_next_state(quality, 7, 2.1, 40, now());
            assert_eq!(result.repetitions, 0);
            assert_eq!(result.interval, 1);
            assert!(close(result.ease_factor, 2.1));
        }
    }

    #[test]
    fn test_first_and_second_success() {
        for quality in 3..=5 {
            assert_eq!(compute_next_state(quality, 0, 2.5, 0, now()).interval, 1);
            assert_eq!(compute_next_state(quality, 1, 2.5, 6, now()).interval, 6);
        }
    }

    #[test]
    fn test_subsequent_success_multiplies() {
        for quality in 3..=5 {
            let result = compute_next_state(quality, 2, 2.5, 6, now());
            assert_eq!(result.interval, 15);
            assert_eq!(result.repetitions, 3);

            let result = compute_next_state(quality, 4, 1.7, 11, now());
            assert_eq!(result.interval, (11.0_f64 * 1.7).round() as u32);
        }
    }

    #[test]
    fn test_good_answer_adjusts_ease() {
        let result = compute_next_state(4, 2, 2.5, 6, now());
        assert_eq!(result.interval, 15);
        assert!(close(result.ease_factor, 2.5));

        let perfect = compute_next_state(5, 2, 2.5, 6, now());
        assert!(close(perfect.ease_factor, 2.6));

        let hard = compute_next_state(3, 2, 2.5, 6, now());
        assert!(close(hard.ease_factor, 2.36));
    }

    #[test]
    fn test_failure_at_floor_keeps_floor() {
        let result = compute_next_state(0, 3, 1.3, 10, now());
        assert_eq!(result.repetitions, 0);
        assert_eq!(result.interval, 1);
        assert!(close(result.ease_factor, 1.3));
    }

    #[test]
    fn test_ease_factor_minimum() {
        let mut ease = 1.4;
        let mut repetitions = 5;
        let mut interval = 10;
        for quality in [3, 0, 3, 3, 0, 3, 3, 3] {
            let result = compute_next_state(quality, repetitions, ease, interval, now());
            assert!(result.ease_factor >= MIN_EASE_FACTOR);
            ease = result.ease_factor;
            repetitions = result.repetitions;
            interval = result.interval;
        }
        assert!(close(ease, MIN_EASE_FACTOR));

        assert!(compute_next_state(0, 0, 0.2, 0, now()).ease_factor >= MIN_EASE_FACTOR);
        assert!(close(compute_next_state(2, 0, f64::NAN, 0, now()).ease_factor, DEFAULT_EASE_FACTOR));
    }

    #[test]
    fn test_quality_is_clamped() {
        assert_eq!(
            compute_next_state(42, 2, 2.5, 6, now()),
            compute_next_state(5, 2, 2.5, 6, now())
        );
        assert_eq!(
            compute_next_state(-3, 2, 2.5, 6, now()),
            compute_next_state(0, 2, 2.5, 6, now())
        );
    }

    #[test]
    fn test_deterministic() {
        let a = compute_next_state(4, 3, 2.2, 9, now());
        let b = compute_next_state(4, 3, 2.2, 9, now());
        assert_eq!(a, b);
    }

    #[test]
    fn test_next_review_date_adds_days() {
        let result = compute_next_state(4, 1, 2.5, 1, now());
        assert_eq!(result.next_review_date, now() + Duration::days(6));
    }

    #[test]
    fn test_huge_interval_is_capped() {
        let result = compute_next_state(5, 2, 2.5, 100_000_000, now());
        assert_eq!(result.interval, MAX_INTERVAL_DAYS);
        assert_eq!(result.next_review_date, now() + Duration::days(i64::from(MAX_INTERVAL_DAYS)));

        let huge_ease = compute_next_state(4, 3, 1e300, 30, now());
        assert_eq!(huge_ease.interval, MAX_INTERVAL_DAYS);
    }

    #[test]
    fn test_date_overflow_saturates() {
        let latest = DateTime::<Utc>::MAX_UTC;
        let result = compute_next_state(5, 0, 2.5, 0, latest);
        assert_eq!(result.interval, 1);
        assert_eq!(result.next_review_date, latest);
    }

    #[test]
    fn test_fresh_item_status() {
        let result = compute_next_state(5, 0, 2.3, 0, now());
        assert_eq!(result.interval, 1);
        assert_eq!(result.repetitions, 1);
        assert_eq!(derive_status(WordStatus::New, 5, result.repetitions), WordStatus::New);

        let second = compute_next_state(5, result.repetitions, result.ease_factor, result.interval, now());
        assert_eq!(derive_status(WordStatus::New, 5, second.repetitions), WordStatus::Learning1);
    }

    #[test]
    fn test_derive_status_thresholds() {
        assert_eq!(derive_status(WordStatus::Learning2, 1, 0), WordStatus::Learning1);
        assert_eq!(derive_status(WordStatus::New, 0, 0), WordStatus::New);
        assert_eq!(derive_status(WordStatus::Learning1, 4, 4), WordStatus::Mastered);
        assert_eq!(derive_status(WordStatus::Learning3, 4, 3), WordStatus::Learning3);
        assert_eq!(derive_status(WordStatus::Learning1, 3, 2), WordStatus::Learning2);
        assert_eq!(derive_status(WordStatus::Learning2, 4, 1), WordStatus::Learning2);
    }

    #[test]
    fn test_preview_intervals() {
        let mut item = VocabularyItem::new("u1", "es", "rojo", WordStatus::Learning1, now());
        item.repetitions = 2;
        item.interval_days = 6;
        item.ease_factor = 2.5;
        assert_eq!(preview_intervals(&item, now()), [1, 15, 15, 15]);
    }

    #[test]
    fn test_grade_parse() {
        assert_eq!(ReviewGrade::parse(" Good "), Some(ReviewGrade::Good));
        assert_eq!(ReviewGrade::parse("e"), Some(ReviewGrade::Easy));
        assert_eq!(ReviewGrade::parse("maybe"), None);
    }

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "now");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(5), "5d");
        assert_eq!(format_interval(7), "1w");
        assert_eq!(format_interval(14), "2w");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(90), "3mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
