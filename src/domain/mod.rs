/// Domain module containing the core entities and calculators
///
/// This module defines the entities the engine operates on (Habit,
/// CompletionEvent, GoalCompletionRecord) together with the pure streak and
/// goal-period calculators and the validation rules for each entity.

pub mod habit;
pub mod event;
pub mod record;
pub mod streak;
pub mod period;
pub mod types;

// Re-export public types for easy access
pub use habit::*;
pub use event::*;
pub use record::*;
pub use streak::*;
pub use period::*;
pub use types::*;

use thiserror::Error;

/// Errors that can occur during domain operations
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid habit name: {0}")]
    InvalidHabitName(String),

    #[error("Invalid goal: {0}")]
    InvalidGoal(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),

    #[error("Invalid value: {message}")]
    InvalidValue { message: String },
}
