/// Habit entity and its goal configuration
///
/// This module defines the Habit struct the engine consumes: the goal
/// configuration (type, target value, duplicate-day policy) plus the reset
/// cutoff that period accounting honors.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use crate::domain::{DomainError, GoalType, HabitId};

/// A habit a user tracks via completion events
///
/// The engine only cares about the goal configuration; everything else
/// (category, reminders, visibility) lives in the surrounding CRUD layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    /// Unique identifier for this habit
    pub id: HabitId,
    /// Display name (e.g., "Morning Run")
    pub name: String,
    /// Target value; interpretation depends on goal_type, 0 means no goal
    pub goal_value: u32,
    /// What kind of goal the target value applies to
    pub goal_type: GoalType,
    /// Whether more than one completion may be logged per calendar day
    pub allows_multiple_per_day: bool,
    /// Cutoff set by the last goal reset; events at or before this instant
    /// are excluded from the current period's count
    pub last_goal_reset: Option<DateTime<Utc>>,
    /// When this habit was created
    pub created_at: DateTime<Utc>,
}

impl Habit {
    /// Create a new habit with validation
    pub fn new(
        name: String,
        goal_value: u32,
        goal_type: GoalType,
        allows_multiple_per_day: bool,
    ) -> Result<Self, DomainError> {
        Self::validate_name(&name)?;
        Self::validate_goal(goal_value)?;

        Ok(Self {
            id: HabitId::new(),
            name,
            goal_value,
            goal_type,
            allows_multiple_per_day,
            last_goal_reset: None,
            created_at: Utc::now(),
        })
    }

    /// Create a habit from existing data (used when loading from the database)
    ///
    /// Assumes the data was validated when it was first written.
    pub fn from_existing(
        id: HabitId,
        name: String,
        goal_value: u32,
        goal_type: GoalType,
        allows_multiple_per_day: bool,
        last_goal_reset: Option<DateTime<Utc>>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            goal_value,
            goal_type,
            allows_multiple_per_day,
            last_goal_reset,
            created_at,
        }
    }

    /// Whether this habit has a goal configured at all
    pub fn has_goal(&self) -> bool {
        self.goal_value > 0
    }

    /// Validate habit name according to business rules
    fn validate_name(name: &str) -> Result<(), DomainError> {
        let trimmed = name.trim();

        if trimmed.is_empty() {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be empty".to_string()
            ));
        }

        if trimmed.len() > 100 {
            return Err(DomainError::InvalidHabitName(
                "Habit name cannot be longer than 100 characters".to_string()
            ));
        }

        Ok(())
    }

    /// Validate the goal target value
    fn validate_goal(goal_value: u32) -> Result<(), DomainError> {
        if goal_value > 10000 {
            return Err(DomainError::InvalidGoal(
                "Goal value cannot exceed 10000".to_string()
            ));
        }
        Ok(())
    }
}
