/// Goal period resolution
///
/// Maps a goal type and a reference day to the canonical half-open
/// [period_start, period_end) window the goal is evaluated over. Streak
/// goals have no period; the resolver returns None for them and callers
/// must branch rather than invent a pseudo-period.

use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use crate::domain::GoalType;

/// A half-open, day-aligned goal evaluation window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalPeriod {
    /// First day inside the window
    pub start: NaiveDate,
    /// First day after the window
    pub end: NaiveDate,
}

impl GoalPeriod {
    /// Whether a calendar day falls inside this window
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day < self.end
    }

    /// Window length in days
    pub fn len_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }
}

/// Resolve the current goal period for a goal type on a given day
///
/// - `count`: that calendar day
/// - `weekly`: the Sunday-Saturday week containing the day
/// - `monthly`: the calendar month containing the day
/// - `streak`: None (not period-based)
pub fn goal_period(goal_type: GoalType, on: NaiveDate) -> Option<GoalPeriod> {
    match goal_type {
        GoalType::Streak => None,
        GoalType::Count => Some(GoalPeriod {
            start: on,
            end: on + Duration::days(1),
        }),
        GoalType::Weekly => {
            let start = on - Duration::days(on.weekday().num_days_from_sunday() as i64);
            Some(GoalPeriod {
                start,
                end: start + Duration::days(7),
            })
        }
        GoalType::Monthly => {
            let start = on.with_day(1)?;
            Some(GoalPeriod {
                start,
                end: start.checked_add_months(Months::new(1))?,
            })
        }
    }
}
