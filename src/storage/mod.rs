/// Storage layer for persisting habit data
///
/// This module handles all database operations using SQLite. It provides
/// a clean interface for storing and retrieving habits, completion events,
/// and goal completion records.

pub mod sqlite;
pub mod migrations;

// Re-export the main storage types
pub use sqlite::*;

use chrono::{DateTime, NaiveDate, Utc};
use thiserror::Error;
use crate::domain::{CompletionEvent, EventId, GoalCompletionRecord, GoalPeriod, Habit, HabitId};

/// Errors that can occur during storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Database connection error: {0}")]
    Connection(String),

    #[error("Database query error: {0}")]
    Query(#[from] rusqlite::Error),

    #[error("Habit not found: {habit_id}")]
    HabitNotFound { habit_id: String },

    #[error("Completion event not found: {event_id}")]
    EventNotFound { event_id: String },

    #[error("Goal already recorded for habit {habit_id}, period {period_start} to {period_end}")]
    DuplicateGoalPeriod {
        habit_id: String,
        period_start: NaiveDate,
        period_end: NaiveDate,
    },

    #[error("Migration error: {0}")]
    Migration(String),
}

/// Trait defining the storage interface for the engine
///
/// The ops layer is generic over this trait, so SQLite can be swapped for
/// another backend without touching the goal or streak logic. Implementors
/// must guarantee the natural-key uniqueness of goal completion records on
/// (habit_id, period_start, period_end) and cascade-delete a habit's events
/// and records with the habit.
pub trait HabitStore {
    /// Create a new habit
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError>;

    /// Get a habit by ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError>;

    /// List all habits, newest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError>;

    /// Delete a habit and everything it owns
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError>;

    /// Append a completion event to the log
    fn create_event(&self, event: &CompletionEvent) -> Result<(), StorageError>;

    /// Delete a single completion event belonging to the given habit
    fn delete_event(&self, habit_id: &HabitId, event_id: &EventId) -> Result<(), StorageError>;

    /// All completion events for a habit, newest first
    fn list_events(&self, habit_id: &HabitId) -> Result<Vec<CompletionEvent>, StorageError>;

    /// Whether the habit already has an event on the given calendar day
    fn has_event_on_day(&self, habit_id: &HabitId, day: NaiveDate) -> Result<bool, StorageError>;

    /// Count events inside a goal period, optionally only those strictly
    /// after a reset cutoff instant
    fn count_events_in_period(
        &self,
        habit_id: &HabitId,
        period: &GoalPeriod,
        after: Option<DateTime<Utc>>,
    ) -> Result<u32, StorageError>;

    /// Insert a goal completion record; rejects duplicates for the same
    /// (habit_id, period_start, period_end)
    fn insert_goal_record(&self, record: &GoalCompletionRecord) -> Result<(), StorageError>;

    /// Find the goal completion record for an exact period, if any
    fn find_goal_record(
        &self,
        habit_id: &HabitId,
        period: &GoalPeriod,
    ) -> Result<Option<GoalCompletionRecord>, StorageError>;

    /// All goal completion records for a habit, newest first
    fn list_goal_records(&self, habit_id: &HabitId) -> Result<Vec<GoalCompletionRecord>, StorageError>;

    /// Atomically delete the current period's records and stamp the
    /// habit's reset cutoff; returns how many records were deleted
    fn reset_goal_period(
        &self,
        habit_id: &HabitId,
        period: &GoalPeriod,
        reset_at: DateTime<Utc>,
    ) -> Result<usize, StorageError>;
}
