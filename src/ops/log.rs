/// Completion log operations
///
/// Appending to and deleting from a habit's completion log. The
/// duplicate-day guard lives here, on the write path: if the habit
/// disallows multiple completions per day, a second event for the same
/// calendar day is rejected before anything is written.

use chrono::{DateTime, Utc};
use crate::domain::{CompletionEvent, EventId, HabitId};
use crate::storage::HabitStore;
use crate::EngineError;

/// Log a completion for a habit
///
/// The completion instant defaults to "now" when the caller does not
/// supply one.
pub fn record_completion<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
    completed_at: Option<DateTime<Utc>>,
    note: Option<String>,
) -> Result<CompletionEvent, EngineError> {
    let habit = store.get_habit(habit_id)?;

    let completed_at = completed_at.unwrap_or_else(Utc::now);
    let day = completed_at.date_naive();

    if !habit.allows_multiple_per_day && store.has_event_on_day(habit_id, day)? {
        return Err(EngineError::AlreadyCompletedToday { date: day });
    }

    let event = CompletionEvent::new(habit_id.clone(), completed_at, note)?;
    store.create_event(&event)?;

    tracing::debug!("Logged completion for habit {} on {}", habit_id, day);
    Ok(event)
}

/// Delete a single completion event from a habit's log
///
/// Fails with a not-found error if the event does not belong to the habit.
pub fn delete_completion<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
    event_id: &EventId,
) -> Result<(), EngineError> {
    // Surface a habit-level not-found before an event-level one
    store.get_habit(habit_id)?;
    store.delete_event(habit_id, event_id)?;
    Ok(())
}

/// Completion history for a habit, newest first
pub fn list_completions<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
) -> Result<Vec<CompletionEvent>, EngineError> {
    store.get_habit(habit_id)?;
    Ok(store.list_events(habit_id)?)
}
