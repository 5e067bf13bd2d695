/// CompletionEvent entity for the append-only completion log
///
/// Each time a user logs a habit completion we create one CompletionEvent.
/// Events are immutable once created: they can be deleted individually but
/// never edited, so every derived statistic can be recomputed from them.

use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use crate::domain::{DomainError, EventId, HabitId};

/// A single timestamped record that a habit was performed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionEvent {
    /// Unique identifier for this event
    pub id: EventId,
    /// Which habit this event belongs to
    pub habit_id: HabitId,
    /// When the habit was performed (caller-supplied or "now")
    pub completed_at: DateTime<Utc>,
    /// Optional free-text note about this completion
    pub note: Option<String>,
}

impl CompletionEvent {
    /// Create a new completion event with validation
    pub fn new(
        habit_id: HabitId,
        completed_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Result<Self, DomainError> {
        Self::validate_completed_at(completed_at)?;
        Self::validate_note(&note)?;

        Ok(Self {
            id: EventId::new(),
            habit_id,
            completed_at,
            note,
        })
    }

    /// Create an event from existing data (used when loading from the database)
    pub fn from_existing(
        id: EventId,
        habit_id: HabitId,
        completed_at: DateTime<Utc>,
        note: Option<String>,
    ) -> Self {
        Self {
            id,
            habit_id,
            completed_at,
            note,
        }
    }

    /// The calendar day this completion counts toward
    pub fn completed_on(&self) -> NaiveDate {
        self.completed_at.date_naive()
    }

    /// Validate that the completion instant is not in the future
    fn validate_completed_at(completed_at: DateTime<Utc>) -> Result<(), DomainError> {
        // Small allowance for callers whose clock runs slightly ahead
        if completed_at > Utc::now() + chrono::Duration::minutes(5) {
            return Err(DomainError::InvalidDate(
                "Cannot log completions in the future".to_string()
            ));
        }
        Ok(())
    }

    /// Validate the optional note field
    fn validate_note(note: &Option<String>) -> Result<(), DomainError> {
        if let Some(text) = note {
            if text.len() > 500 {
                return Err(DomainError::InvalidValue {
                    message: "Note cannot be longer than 500 characters".to_string()
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_valid_event() {
        let habit_id = HabitId::new();
        let now = Utc::now();

        let event = CompletionEvent::new(
            habit_id.clone(),
            now,
            Some("Felt great today!".to_string()),
        );

        assert!(event.is_ok());
        let event = event.unwrap();
        assert_eq!(event.habit_id, habit_id);
        assert_eq!(event.completed_at, now);
        assert_eq!(event.completed_on(), now.date_naive());
    }

    #[test]
    fn test_future_instant_invalid() {
        let result = CompletionEvent::new(
            HabitId::new(),
            Utc::now() + chrono::Duration::days(1),
            None,
        );

        assert!(result.is_err());
    }

    #[test]
    fn test_overlong_note_invalid() {
        let result = CompletionEvent::new(
            HabitId::new(),
            Utc::now(),
            Some("x".repeat(501)),
        );

        assert!(result.is_err());
    }
}
