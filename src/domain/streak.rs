/// Streak calculation over completion dates
///
/// This module turns the set of calendar days a habit was completed on into
/// the current consecutive-day streak and the longest streak ever achieved.
/// The functions here are pure: no storage access, no hidden state, always
/// safe to recompute on every request.

use std::collections::BTreeSet;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Calculated streak information for a habit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streaks {
    /// Consecutive days ending at today or yesterday with no gap
    pub current_streak: u32,
    /// Longest run of consecutive completion days in the whole history
    pub longest_streak: u32,
}

impl Streaks {
    /// Compute both streaks from completion dates, relative to `today`
    ///
    /// Duplicate same-day dates collapse before computation, so timestamps
    /// reduced with `date_naive()` can be passed straight in. An empty
    /// history yields `(0, 0)`.
    pub fn compute(dates: &[NaiveDate], today: NaiveDate) -> Self {
        let days: BTreeSet<NaiveDate> = dates.iter().copied().collect();

        Self {
            current_streak: current_streak(&days, today),
            longest_streak: longest_streak(&days),
        }
    }
}

/// Count consecutive completion days walking backward from today
///
/// If today has no completion the walk anchors at yesterday instead; if
/// neither day has one, the streak is 0.
fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);

    let mut expected = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut streak = 0;
    while days.contains(&expected) {
        streak += 1;
        expected -= Duration::days(1);
    }

    streak
}

/// Longest run of consecutive days over the entire history
///
/// Single ascending scan; the running length restarts at 1 on any gap.
fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    for &day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }

    longest
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    const TODAY: (i32, u32, u32) = (2024, 6, 15);

    fn today() -> NaiveDate {
        d(TODAY.0, TODAY.1, TODAY.2)
    }

    #[test]
    fn test_empty_history() {
        let streaks = Streaks::compute(&[], today());
        assert_eq!(streaks.current_streak, 0);
        assert_eq!(streaks.longest_streak, 0);
    }

    #[test]
    fn test_single_completion_today() {
        let streaks = Streaks::compute(&[today()], today());
        assert_eq!(streaks.current_streak, 1);
        assert_eq!(streaks.longest_streak, 1);
    }

    #[test]
    fn test_single_completion_yesterday() {
        let streaks = Streaks::compute(&[today() - Duration::days(1)], today());
        assert_eq!(streaks.current_streak, 1);
    }

    #[test]
    fn test_stale_completion_breaks_current_streak() {
        // Two days ago only: neither today nor yesterday, so current is 0
        let streaks = Streaks::compute(&[today() - Duration::days(2)], today());
        assert_eq!(streaks.current_streak, 0);
        assert_eq!(streaks.longest_streak, 1);
    }

    #[test]
    fn test_backward_walk_stops_at_gap() {
        let dates = vec![
            today(),
            today() - Duration::days(1),
            today() - Duration::days(2),
            // gap at -3
            today() - Duration::days(4),
        ];
        let streaks = Streaks::compute(&dates, today());
        assert_eq!(streaks.current_streak, 3);
        assert_eq!(streaks.longest_streak, 3);
    }

    #[test]
    fn test_longest_streak_in_history() {
        // Recent run of 3 plus an older, longer run of 5
        let mut dates = vec![
            today(),
            today() - Duration::days(1),
            today() - Duration::days(2),
        ];
        for offset in 10..15 {
            dates.push(today() - Duration::days(offset));
        }
        let streaks = Streaks::compute(&dates, today());
        assert_eq!(streaks.current_streak, 3);
        assert_eq!(streaks.longest_streak, 5);
    }

    #[test]
    fn test_gap_then_isolated_old_day() {
        // Days {D, D-1, D-2} then a gap, then {D-10}
        let dates = vec![
            today(),
            today() - Duration::days(1),
            today() - Duration::days(2),
            today() - Duration::days(10),
        ];
        let streaks = Streaks::compute(&dates, today());
        assert_eq!(streaks.longest_streak, 3);
        assert_eq!(streaks.current_streak, 3);
    }

    #[test]
    fn test_duplicate_days_collapse() {
        let dates = vec![today(), today(), today() - Duration::days(1)];
        let streaks = Streaks::compute(&dates, today());
        assert_eq!(streaks.current_streak, 2);
        assert_eq!(streaks.longest_streak, 2);
    }

    #[test]
    fn test_longest_at_least_current() {
        // Holds for a spread of shapes, including month boundaries
        let samples: Vec<Vec<NaiveDate>> = vec![
            vec![],
            vec![today()],
            vec![d(2024, 5, 31), d(2024, 6, 1), d(2024, 6, 2)],
            (0..30).map(|n| today() - Duration::days(n)).collect(),
            vec![today(), today() - Duration::days(5), today() - Duration::days(6)],
        ];
        for dates in samples {
            let streaks = Streaks::compute(&dates, today());
            assert!(streaks.longest_streak >= streaks.current_streak);
        }
    }

    #[test]
    fn test_idempotent() {
        let dates = vec![today(), today() - Duration::days(1)];
        assert_eq!(
            Streaks::compute(&dates, today()),
            Streaks::compute(&dates, today()),
        );
    }
}
