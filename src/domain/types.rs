/// Core identifier and enum types used throughout the domain layer
///
/// This module defines the typed IDs (HabitId, EventId, RecordId) and the
/// GoalType enum that drives period resolution and ledger accounting.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a habit
///
/// A wrapper around UUID for type safety - you can't accidentally pass a
/// habit ID where an event ID is expected.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HabitId(pub Uuid);

impl HabitId {
    /// Generate a new random habit ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a habit ID from a string (useful for database loading)
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for HabitId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a completion event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub Uuid);

impl EventId {
    /// Generate a new random event ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an event ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Unique identifier for a goal completion record
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RecordId(pub Uuid);

impl RecordId {
    /// Generate a new random record ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a record ID from a string
    pub fn from_string(s: &str) -> Result<Self, uuid::Error> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

impl std::fmt::Display for RecordId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// What kind of goal a habit is configured with
///
/// Count, weekly and monthly goals are evaluated over calendar periods;
/// streak goals are evaluated purely through the streak calculator and have
/// no period or renewal concept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalType {
    /// Consecutive-day goal, measured by the streak calculator
    Streak,
    /// Daily count goal (N completions per day)
    Count,
    /// Weekly count goal (N completions per Sunday-Saturday week)
    Weekly,
    /// Monthly count goal (N completions per calendar month)
    Monthly,
}

impl GoalType {
    /// Whether this goal type is evaluated over calendar periods
    pub fn is_periodic(&self) -> bool {
        !matches!(self, GoalType::Streak)
    }

    /// Database/wire representation of this goal type
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalType::Streak => "streak",
            GoalType::Count => "count",
            GoalType::Weekly => "weekly",
            GoalType::Monthly => "monthly",
        }
    }

    /// Parse a goal type from its string representation
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "streak" => Some(GoalType::Streak),
            "count" => Some(GoalType::Count),
            "weekly" => Some(GoalType::Weekly),
            "monthly" => Some(GoalType::Monthly),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_goal_type_round_trip() {
        for gt in [GoalType::Streak, GoalType::Count, GoalType::Weekly, GoalType::Monthly] {
            assert_eq!(GoalType::parse(gt.as_str()), Some(gt));
        }
        assert_eq!(GoalType::parse("yearly"), None);
    }

    #[test]
    fn test_periodic_goal_types() {
        assert!(!GoalType::Streak.is_periodic());
        assert!(GoalType::Count.is_periodic());
        assert!(GoalType::Weekly.is_periodic());
        assert!(GoalType::Monthly.is_periodic());
    }

    #[test]
    fn test_id_string_round_trip() {
        let id = HabitId::new();
        let parsed = HabitId::from_string(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }
}
