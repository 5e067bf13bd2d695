/// Streak reporting operation
///
/// Reduces a habit's completion log to distinct calendar days and runs the
/// pure streak calculator over them. Always recomputed from the log; no
/// cached streak state exists anywhere.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use crate::domain::{HabitId, Streaks};
use crate::storage::HabitStore;
use crate::EngineError;

/// Streak statistics for a habit
#[derive(Debug, Clone, Serialize)]
pub struct StreakReport {
    pub habit_id: HabitId,
    pub current_streak: u32,
    pub longest_streak: u32,
    /// Total number of completion events (not distinct days)
    pub total_count: u32,
}

/// Compute streak statistics for a habit as of today
pub fn get_streaks<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
) -> Result<StreakReport, EngineError> {
    get_streaks_at(store, habit_id, Utc::now().date_naive())
}

/// Compute streak statistics relative to an explicit "today"
pub fn get_streaks_at<S: HabitStore>(
    store: &S,
    habit_id: &HabitId,
    today: NaiveDate,
) -> Result<StreakReport, EngineError> {
    store.get_habit(habit_id)?;

    let events = store.list_events(habit_id)?;
    let dates: Vec<NaiveDate> = events.iter().map(|e| e.completed_on()).collect();
    let streaks = Streaks::compute(&dates, today);

    Ok(StreakReport {
        habit_id: habit_id.clone(),
        current_streak: streaks.current_streak,
        longest_streak: streaks.longest_streak,
        total_count: events.len() as u32,
    })
}
