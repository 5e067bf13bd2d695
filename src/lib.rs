/// Streak and goal-period accounting engine for a social habit tracker
///
/// Users log habit completions; this crate derives consecutive-day streaks,
/// resolves daily/weekly/monthly goal periods, keeps an at-most-once
/// goal completion ledger per period, and supports a goal reset that
/// restarts period accounting without touching the completion log.

use std::path::PathBuf;
use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;

// Internal modules
mod domain;
mod storage;
mod ops;

// Re-export public modules and types
pub use domain::*;
pub use storage::{HabitStore, SqliteStore, StorageError};
pub use ops::*;

/// Errors surfaced by engine operations
///
/// Each kind is distinct and inspectable so the surrounding layer can map
/// them to precise client-facing responses; only Storage is opaque.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Domain validation error: {0}")]
    Domain(#[from] domain::DomainError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Habit already completed on {date}")]
    AlreadyCompletedToday { date: NaiveDate },

    #[error("Habit has no goal configured")]
    NoGoalConfigured,

    #[error("Streak goals are not period-based")]
    StreakGoalNotPeriodic,

    #[error("Goal already recorded for period {period_start} to {period_end}")]
    DuplicateGoalPeriod {
        period_start: NaiveDate,
        period_end: NaiveDate,
    },
}

/// The habit engine: a SQLite store plus the operations over it
///
/// This is the facade the surrounding CRUD layer talks to. All goal and
/// streak state is recomputed from the completion log on demand; the
/// engine holds no caches.
pub struct HabitEngine {
    store: SqliteStore,
}

impl HabitEngine {
    /// Open (and migrate if necessary) the engine database
    pub fn open(db_path: PathBuf) -> Result<Self, EngineError> {
        tracing::info!("Opening habit engine database: {:?}", db_path);
        let store = SqliteStore::new(db_path)?;
        Ok(Self { store })
    }

    /// Get a reference to the storage layer (useful for testing)
    pub fn store(&self) -> &SqliteStore {
        &self.store
    }

    // Habit provisioning (minimal; full habit CRUD lives outside the engine)

    /// Create a habit with its goal configuration
    pub fn create_habit(
        &self,
        name: String,
        goal_value: u32,
        goal_type: GoalType,
        allows_multiple_per_day: bool,
    ) -> Result<Habit, EngineError> {
        let habit = Habit::new(name, goal_value, goal_type, allows_multiple_per_day)?;
        self.store.create_habit(&habit)?;
        Ok(habit)
    }

    /// Get a habit by ID
    pub fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, EngineError> {
        Ok(self.store.get_habit(habit_id)?)
    }

    /// List all habits, newest first
    pub fn list_habits(&self) -> Result<Vec<Habit>, EngineError> {
        Ok(self.store.list_habits()?)
    }

    /// Delete a habit and everything it owns
    pub fn delete_habit(&self, habit_id: &HabitId) -> Result<(), EngineError> {
        Ok(self.store.delete_habit(habit_id)?)
    }

    // Engine operations

    /// Log a completion (rejected as a conflict on a duplicate day when
    /// the habit disallows multiple completions per day)
    pub fn record_completion(
        &self,
        habit_id: &HabitId,
        completed_at: Option<DateTime<Utc>>,
        note: Option<String>,
    ) -> Result<CompletionEvent, EngineError> {
        ops::record_completion(&self.store, habit_id, completed_at, note)
    }

    /// Delete a single completion event
    pub fn delete_completion(
        &self,
        habit_id: &HabitId,
        event_id: &EventId,
    ) -> Result<(), EngineError> {
        ops::delete_completion(&self.store, habit_id, event_id)
    }

    /// Completion history, newest first
    pub fn list_completions(&self, habit_id: &HabitId) -> Result<Vec<CompletionEvent>, EngineError> {
        ops::list_completions(&self.store, habit_id)
    }

    /// Current and longest streak plus the total completion count
    pub fn get_streaks(&self, habit_id: &HabitId) -> Result<StreakReport, EngineError> {
        ops::get_streaks(&self.store, habit_id)
    }

    /// Is the goal met for the current period, and does it still need
    /// to be credited?
    pub fn check_goal(&self, habit_id: &HabitId) -> Result<GoalStatus, EngineError> {
        ops::check_goal(&self.store, habit_id)
    }

    /// Un-credit the current goal period and restart its accounting
    pub fn reset_goal(&self, habit_id: &HabitId) -> Result<GoalReset, EngineError> {
        ops::reset_goal(&self.store, habit_id)
    }

    /// Persist a "goal achieved" fact for an exact period
    pub fn record_goal_completion(
        &self,
        habit_id: &HabitId,
        period_start: NaiveDate,
        period_end: NaiveDate,
        actual_count: u32,
        note: Option<String>,
    ) -> Result<GoalCompletionRecord, EngineError> {
        ops::record_goal_completion(&self.store, habit_id, period_start, period_end, actual_count, note)
    }

    /// All goal completion records for a habit, newest first
    pub fn goal_history(&self, habit_id: &HabitId) -> Result<Vec<GoalCompletionRecord>, EngineError> {
        ops::goal_history(&self.store, habit_id)
    }
}
