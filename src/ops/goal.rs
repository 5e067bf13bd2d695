/// Goal ledger operations: check, record, reset
///
/// check_goal reports whether the current period's goal is satisfied and
/// whether that completion still needs to be credited; the caller (the
/// feed writer in the surrounding backend) decides whether to persist a
/// record. reset_goal un-credits the current period and stamps the cutoff
/// that makes the period's count restart at zero going forward.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use crate::domain::{goal_period, GoalCompletionRecord, GoalType, HabitId};
use crate::storage::{HabitStore, StorageError};
use crate::EngineError;

/// Outcome of checking a habit's goal for the current period
#[derive(Debug, Clone, Serialize)]
pub struct GoalStatus {
    pub has_goal: bool,
    pub goal_completed: bool,
    pub needs_renewal: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_type: Option<GoalType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goal_value: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub period_end: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub already_recorded: Option<bool>,
}

impl GoalStatus {
    fn no_goal() -> Self {
        Self {
            has_goal: false,
            goal_completed: false,
            needs_renewal: false,
            goal_type: None,
            goal_value: None,
            actual_count: None,
            period_start: None,
            period_end: None,
            already_recorded: None,
        }
    }

    // Streak goals are present but have no renewal concept; they are
    // evaluated through the streak calculator, never through periods
    fn streak_goal(goal_value: u32) -> Self {
        Self {
            has_goal: true,
            goal_completed: false,
            needs_renewal: false,
            goal_type: Some(GoalType::Streak),
            goal_value: Some(goal_value),
            actual_count: None,
            period_start: None,
            period_end: None,
            already_recorded: None,
        }
    }
}

/// Outcome of resetting a habit's current goal period
#[derive(Debug, Clone, Serialize)]
pub struct GoalReset {
    pub habit_id: HabitId,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub deleted_records: usize,
}

/// Check whether a habit's goal is satisfied for the current period
pub fn check_goal<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
) -> Result<GoalStatus, EngineError> {
    check_goal_at(store, habit_id, Utc::now())
}

/// Check a habit's goal relative to an explicit reference instant
pub fn check_goal_at<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
    now: DateTime<Utc>,
) -> Result<GoalStatus, EngineError> {
    let habit = store.get_habit(habit_id)?;

    if !habit.has_goal() {
        return Ok(GoalStatus::no_goal());
    }

    let Some(period) = goal_period(habit.goal_type, now.date_naive()) else {
        return Ok(GoalStatus::streak_goal(habit.goal_value));
    };

    // Recount from the log on every check; after a reset only events
    // strictly after the cutoff count toward the new period
    let actual_count = store.count_events_in_period(habit_id, &period, habit.last_goal_reset)?;
    let already_recorded = store.find_goal_record(habit_id, &period)?.is_some();

    let goal_completed = actual_count >= habit.goal_value;
    let needs_renewal = goal_completed && !already_recorded;

    tracing::debug!(
        "Goal check for habit {}: {}/{} in {} to {}, recorded={}",
        habit_id, actual_count, habit.goal_value, period.start, period.end, already_recorded
    );

    Ok(GoalStatus {
        has_goal: true,
        goal_completed,
        needs_renewal,
        goal_type: Some(habit.goal_type),
        goal_value: Some(habit.goal_value),
        actual_count: Some(actual_count),
        period_start: Some(period.start),
        period_end: Some(period.end),
        already_recorded: Some(already_recorded),
    })
}

/// Un-credit the current goal period and restart its accounting
///
/// Deletes the current period's ledger records and stamps
/// last_goal_reset = now in one transaction. History outside the current
/// period is untouched, and the completion log is never mutated.
pub fn reset_goal<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
) -> Result<GoalReset, EngineError> {
    reset_goal_at(store, habit_id, Utc::now())
}

/// Reset a habit's goal relative to an explicit reference instant
pub fn reset_goal_at<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
    now: DateTime<Utc>,
) -> Result<GoalReset, EngineError> {
    let habit = store.get_habit(habit_id)?;

    if !habit.has_goal() {
        return Err(EngineError::NoGoalConfigured);
    }

    let Some(period) = goal_period(habit.goal_type, now.date_naive()) else {
        return Err(EngineError::StreakGoalNotPeriodic);
    };

    let deleted_records = store.reset_goal_period(habit_id, &period, now)?;

    tracing::info!(
        "Reset goal for habit {}: period {} to {}, {} record(s) removed",
        habit_id, period.start, period.end, deleted_records
    );

    Ok(GoalReset {
        habit_id: habit_id.clone(),
        period_start: period.start,
        period_end: period.end,
        deleted_records,
    })
}

/// Persist a "goal achieved" fact for an exact period
///
/// Rejects a duplicate for the same (habit_id, period_start, period_end)
/// with a conflict; the storage layer's unique index backs this under
/// concurrent writers.
pub fn record_goal_completion<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
    period_start: NaiveDate,
    period_end: NaiveDate,
    actual_count: u32,
    note: Option<String>,
) -> Result<GoalCompletionRecord, EngineError> {
    let habit = store.get_habit(habit_id)?;

    if !habit.has_goal() {
        return Err(EngineError::NoGoalConfigured);
    }

    let record = GoalCompletionRecord::new(
        habit_id.clone(),
        habit.goal_type,
        habit.goal_value,
        period_start,
        period_end,
        actual_count,
        note,
    )?;

    match store.insert_goal_record(&record) {
        Ok(()) => Ok(record),
        Err(StorageError::DuplicateGoalPeriod { period_start, period_end, .. }) => {
            Err(EngineError::DuplicateGoalPeriod { period_start, period_end })
        }
        Err(e) => Err(e.into()),
    }
}

/// All goal completion records for a habit, newest first
pub fn goal_history<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
) -> Result<Vec<GoalCompletionRecord>, EngineError> {
    store.get_habit(habit_id)?;
    Ok(store.list_goal_records(habit_id)?)
}
