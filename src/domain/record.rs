/// GoalCompletionRecord entity for the goal completion ledger
///
/// One immutable "goal achieved" fact per habit per period. The natural key
/// is (habit_id, period_start, period_end); the storage layer enforces
/// at-most-once credit with a unique index on it.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{DomainError, GoalType, HabitId, RecordId};

/// A persisted, at-most-once fact that a goal period was satisfied
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalCompletionRecord {
    /// Unique identifier for this record
    pub id: RecordId,
    /// Which habit this record is for
    pub habit_id: HabitId,
    /// Goal configuration at the time the period was credited
    pub goal_type: GoalType,
    pub goal_value: u32,
    /// Half-open [period_start, period_end) window that was satisfied
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// How many completions the period actually had when credited
    pub actual_count: u32,
    /// When this record was created
    pub completed_at: DateTime<Utc>,
    /// Optional celebratory note
    pub note: Option<String>,
}

impl GoalCompletionRecord {
    /// Create a new ledger record with validation
    pub fn new(
        habit_id: HabitId,
        goal_type: GoalType,
        goal_value: u32,
        period_start: NaiveDate,
        period_end: NaiveDate,
        actual_count: u32,
        note: Option<String>,
    ) -> Result<Self, DomainError> {
        if period_start >= period_end {
            return Err(DomainError::InvalidDate(format!(
                "Period start {} must precede period end {}",
                period_start, period_end
            )));
        }

        Ok(Self {
            id: RecordId::new(),
            habit_id,
            goal_type,
            goal_value,
            period_start,
            period_end,
            actual_count,
            completed_at: Utc::now(),
            note,
        })
    }

    /// Create a record from existing data (used when loading from the database)
    #[allow(clippy::too_many_arguments)]
    pub fn from_existing(
        id: RecordId,
        habit_id: HabitId,
        goal_type: GoalType,
        goal_value: u32,
        period_start: NaiveDate,
        period_end: NaiveDate,
        actual_count: u32,
        completed_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Self {
        Self {
            id,
            habit_id,
            goal_type,
            goal_value,
            period_start,
            period_end,
            actual_count,
            completed_at,
            note,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_valid_record() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let record = GoalCompletionRecord::new(
            HabitId::new(),
            GoalType::Weekly,
            5,
            start,
            end,
            6,
            None,
        );

        assert!(record.is_ok());
        let record = record.unwrap();
        assert_eq!(record.period_start, start);
        assert_eq!(record.period_end, end);
    }

    #[test]
    fn test_inverted_period_invalid() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 10).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 3, 3).unwrap();
        let record = GoalCompletionRecord::new(
            HabitId::new(),
            GoalType::Weekly,
            5,
            start,
            end,
            6,
            None,
        );

        assert!(record.is_err());
    }
}
