/// SQLite implementation of the habit storage interface
///
/// This module provides the concrete SQLite implementation for storing
/// and retrieving habit data. It handles all SQL queries and data
/// conversion, including the transactional goal reset.

use std::path::PathBuf;
use rusqlite::{params, Connection, Row};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};

use crate::domain::{
    CompletionEvent, EventId, GoalCompletionRecord, GoalPeriod, GoalType, Habit, HabitId, RecordId,
};
use crate::storage::{migrations, HabitStore, StorageError};

/// SQLite-based storage implementation
///
/// This struct holds a connection to the SQLite database and implements
/// all the storage operations defined in the HabitStore trait.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Create a new SQLite storage instance
    ///
    /// This opens the database file and runs any necessary migrations
    /// to ensure the schema is up to date.
    pub fn new(db_path: PathBuf) -> Result<Self, StorageError> {
        let conn = Connection::open(&db_path)
            .map_err(|e| StorageError::Connection(format!("Failed to open database: {}", e)))?;

        // Cascade deletes depend on this pragma
        conn.execute("PRAGMA foreign_keys = ON", [])
            .map_err(|e| StorageError::Connection(format!("Failed to enable foreign keys: {}", e)))?;

        migrations::initialize_database(&conn)?;

        tracing::info!("SQLite storage initialized at: {:?}", db_path);

        Ok(Self { conn })
    }

    /// Encode a timestamp for storage
    ///
    /// Fixed-width RFC 3339 UTC so string comparison in SQL orders
    /// chronologically.
    fn encode_instant(ts: &DateTime<Utc>) -> String {
        ts.to_rfc3339_opts(SecondsFormat::Micros, true)
    }

    /// Decode a stored timestamp, reporting the failing column on error
    fn decode_instant(s: &str, column: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|_| rusqlite::Error::InvalidColumnType(
                column, "Invalid datetime".to_string(), rusqlite::types::Type::Text
            ))
    }

    /// Decode a stored calendar date
    fn decode_day(s: &str, column: usize) -> Result<NaiveDate, rusqlite::Error> {
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map_err(|_| rusqlite::Error::InvalidColumnType(
                column, "Invalid date".to_string(), rusqlite::types::Type::Text
            ))
    }

    /// Map a habit row: id, name, goal_value, goal_type,
    /// allows_multiple_per_day, last_goal_reset, created_at
    fn habit_from_row(row: &Row<'_>) -> Result<Habit, rusqlite::Error> {
        let id_str: String = row.get(0)?;
        let id = HabitId::from_string(&id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let goal_type_str: String = row.get(3)?;
        let goal_type = GoalType::parse(&goal_type_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(3, "Invalid goal type".to_string(), rusqlite::types::Type::Text)
        })?;

        let last_reset_str: Option<String> = row.get(5)?;
        let last_goal_reset = match last_reset_str {
            Some(s) => Some(Self::decode_instant(&s, 5)?),
            None => None,
        };

        let created_at_str: String = row.get(6)?;
        let created_at = Self::decode_instant(&created_at_str, 6)?;

        Ok(Habit::from_existing(
            id,
            row.get(1)?, // name
            row.get(2)?, // goal_value
            goal_type,
            row.get(4)?, // allows_multiple_per_day
            last_goal_reset,
            created_at,
        ))
    }

    /// Map an event row: id, habit_id, completed_at, note
    fn event_from_row(row: &Row<'_>) -> Result<CompletionEvent, rusqlite::Error> {
        let id_str: String = row.get(0)?;
        let id = EventId::from_string(&id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let habit_id_str: String = row.get(1)?;
        let habit_id = HabitId::from_string(&habit_id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(1, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let completed_at_str: String = row.get(2)?;
        let completed_at = Self::decode_instant(&completed_at_str, 2)?;

        Ok(CompletionEvent::from_existing(
            id,
            habit_id,
            completed_at,
            row.get(3)?, // note
        ))
    }

    /// Map a ledger row: id, habit_id, goal_type, goal_value, period_start,
    /// period_end, actual_count, completed_at, note
    fn record_from_row(row: &Row<'_>) -> Result<GoalCompletionRecord, rusqlite::Error> {
        let id_str: String = row.get(0)?;
        let id = RecordId::from_string(&id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(0, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let habit_id_str: String = row.get(1)?;
        let habit_id = HabitId::from_string(&habit_id_str).map_err(|_| {
            rusqlite::Error::InvalidColumnType(1, "Invalid UUID".to_string(), rusqlite::types::Type::Text)
        })?;

        let goal_type_str: String = row.get(2)?;
        let goal_type = GoalType::parse(&goal_type_str).ok_or_else(|| {
            rusqlite::Error::InvalidColumnType(2, "Invalid goal type".to_string(), rusqlite::types::Type::Text)
        })?;

        let period_start_str: String = row.get(4)?;
        let period_start = Self::decode_day(&period_start_str, 4)?;

        let period_end_str: String = row.get(5)?;
        let period_end = Self::decode_day(&period_end_str, 5)?;

        let completed_at_str: String = row.get(7)?;
        let completed_at = Self::decode_instant(&completed_at_str, 7)?;

        Ok(GoalCompletionRecord::from_existing(
            id,
            habit_id,
            goal_type,
            row.get(3)?, // goal_value
            period_start,
            period_end,
            row.get(6)?, // actual_count
            completed_at,
            row.get(8)?, // note
        ))
    }

    /// Whether a rusqlite error is a uniqueness-constraint violation
    fn is_constraint_violation(err: &rusqlite::Error) -> bool {
        matches!(
            err,
            rusqlite::Error::SqliteFailure(e, _)
                if e.code == rusqlite::ErrorCode::ConstraintViolation
        )
    }
}

impl HabitStore for SqliteStore {
    /// Create a new habit in the database
    fn create_habit(&self, habit: &Habit) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO habits (
                id, name, goal_value, goal_type, allows_multiple_per_day,
                last_goal_reset, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                habit.id.to_string(),
                habit.name,
                habit.goal_value,
                habit.goal_type.as_str(),
                habit.allows_multiple_per_day,
                habit.last_goal_reset.as_ref().map(Self::encode_instant),
                Self::encode_instant(&habit.created_at),
            ],
        )?;

        tracing::debug!("Created habit: {} ({})", habit.name, habit.id);
        Ok(())
    }

    /// Get a habit by its ID
    fn get_habit(&self, habit_id: &HabitId) -> Result<Habit, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, goal_value, goal_type, allows_multiple_per_day, last_goal_reset, created_at
             FROM habits WHERE id = ?1"
        )?;

        let result = stmt.query_row(params![habit_id.to_string()], Self::habit_from_row);

        match result {
            Ok(habit) => Ok(habit),
            Err(rusqlite::Error::QueryReturnedNoRows) => Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// List habits, newest first
    fn list_habits(&self) -> Result<Vec<Habit>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, goal_value, goal_type, allows_multiple_per_day, last_goal_reset, created_at
             FROM habits ORDER BY created_at DESC"
        )?;

        let habit_iter = stmt.query_map([], Self::habit_from_row)?;

        let mut habits = Vec::new();
        for habit in habit_iter {
            habits.push(habit?);
        }

        Ok(habits)
    }

    /// Delete a habit; events and ledger records cascade with it
    fn delete_habit(&self, habit_id: &HabitId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM habits WHERE id = ?1",
            params![habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tracing::debug!("Deleted habit: {}", habit_id);
        Ok(())
    }

    /// Append a completion event
    fn create_event(&self, event: &CompletionEvent) -> Result<(), StorageError> {
        self.conn.execute(
            "INSERT INTO completion_events (
                id, habit_id, completed_at, completed_on, note
            ) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.id.to_string(),
                event.habit_id.to_string(),
                Self::encode_instant(&event.completed_at),
                event.completed_on().to_string(),
                event.note,
            ],
        )?;

        tracing::debug!("Created completion event: {} for habit {}", event.id, event.habit_id);
        Ok(())
    }

    /// Delete a completion event that belongs to the given habit
    fn delete_event(&self, habit_id: &HabitId, event_id: &EventId) -> Result<(), StorageError> {
        let rows_affected = self.conn.execute(
            "DELETE FROM completion_events WHERE id = ?1 AND habit_id = ?2",
            params![event_id.to_string(), habit_id.to_string()],
        )?;

        if rows_affected == 0 {
            return Err(StorageError::EventNotFound {
                event_id: event_id.to_string(),
            });
        }

        tracing::debug!("Deleted completion event: {} from habit {}", event_id, habit_id);
        Ok(())
    }

    /// All events for a habit, newest first
    fn list_events(&self, habit_id: &HabitId) -> Result<Vec<CompletionEvent>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, completed_at, note
             FROM completion_events WHERE habit_id = ?1
             ORDER BY completed_at DESC"
        )?;

        let event_iter = stmt.query_map(params![habit_id.to_string()], Self::event_from_row)?;

        let mut events = Vec::new();
        for event in event_iter {
            events.push(event?);
        }

        Ok(events)
    }

    /// Whether the habit has at least one event on the given day
    fn has_event_on_day(&self, habit_id: &HabitId, day: NaiveDate) -> Result<bool, StorageError> {
        let count: u32 = self.conn.query_row(
            "SELECT COUNT(*) FROM completion_events WHERE habit_id = ?1 AND completed_on = ?2",
            params![habit_id.to_string(), day.to_string()],
            |row| row.get(0),
        )?;

        Ok(count > 0)
    }

    /// Count events inside a goal period
    ///
    /// When `after` is set, only events strictly after the cutoff count;
    /// events at exactly the cutoff instant are excluded.
    fn count_events_in_period(
        &self,
        habit_id: &HabitId,
        period: &GoalPeriod,
        after: Option<DateTime<Utc>>,
    ) -> Result<u32, StorageError> {
        let count: u32 = match after {
            Some(cutoff) => self.conn.query_row(
                "SELECT COUNT(*) FROM completion_events
                 WHERE habit_id = ?1 AND completed_on >= ?2 AND completed_on < ?3
                   AND completed_at > ?4",
                params![
                    habit_id.to_string(),
                    period.start.to_string(),
                    period.end.to_string(),
                    Self::encode_instant(&cutoff),
                ],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COUNT(*) FROM completion_events
                 WHERE habit_id = ?1 AND completed_on >= ?2 AND completed_on < ?3",
                params![
                    habit_id.to_string(),
                    period.start.to_string(),
                    period.end.to_string(),
                ],
                |row| row.get(0),
            )?,
        };

        Ok(count)
    }

    /// Insert a ledger record, rejecting duplicate periods
    fn insert_goal_record(&self, record: &GoalCompletionRecord) -> Result<(), StorageError> {
        let result = self.conn.execute(
            "INSERT INTO goal_completions (
                id, habit_id, goal_type, goal_value, period_start, period_end,
                actual_count, completed_at, note
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.id.to_string(),
                record.habit_id.to_string(),
                record.goal_type.as_str(),
                record.goal_value,
                record.period_start.to_string(),
                record.period_end.to_string(),
                record.actual_count,
                Self::encode_instant(&record.completed_at),
                record.note,
            ],
        );

        match result {
            Ok(_) => {
                tracing::debug!(
                    "Recorded goal completion for habit {} ({} to {})",
                    record.habit_id, record.period_start, record.period_end
                );
                Ok(())
            }
            Err(e) if Self::is_constraint_violation(&e) => Err(StorageError::DuplicateGoalPeriod {
                habit_id: record.habit_id.to_string(),
                period_start: record.period_start,
                period_end: record.period_end,
            }),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// Find the record for an exact period, if any
    fn find_goal_record(
        &self,
        habit_id: &HabitId,
        period: &GoalPeriod,
    ) -> Result<Option<GoalCompletionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, goal_type, goal_value, period_start, period_end,
                    actual_count, completed_at, note
             FROM goal_completions
             WHERE habit_id = ?1 AND period_start = ?2 AND period_end = ?3"
        )?;

        let result = stmt.query_row(
            params![
                habit_id.to_string(),
                period.start.to_string(),
                period.end.to_string(),
            ],
            Self::record_from_row,
        );

        match result {
            Ok(record) => Ok(Some(record)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StorageError::Query(e)),
        }
    }

    /// All ledger records for a habit, newest first
    fn list_goal_records(&self, habit_id: &HabitId) -> Result<Vec<GoalCompletionRecord>, StorageError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, habit_id, goal_type, goal_value, period_start, period_end,
                    actual_count, completed_at, note
             FROM goal_completions WHERE habit_id = ?1
             ORDER BY completed_at DESC"
        )?;

        let record_iter = stmt.query_map(params![habit_id.to_string()], Self::record_from_row)?;

        let mut records = Vec::new();
        for record in record_iter {
            records.push(record?);
        }

        Ok(records)
    }

    /// Delete the period's ledger records and stamp the reset cutoff
    ///
    /// Both writes run in one transaction so there is never a visible state
    /// where the cutoff is set but stale records remain, or vice versa.
    fn reset_goal_period(
        &self,
        habit_id: &HabitId,
        period: &GoalPeriod,
        reset_at: DateTime<Utc>,
    ) -> Result<usize, StorageError> {
        let tx = self.conn.unchecked_transaction()?;

        let deleted = tx.execute(
            "DELETE FROM goal_completions
             WHERE habit_id = ?1 AND period_start = ?2 AND period_end = ?3",
            params![
                habit_id.to_string(),
                period.start.to_string(),
                period.end.to_string(),
            ],
        )?;

        let updated = tx.execute(
            "UPDATE habits SET last_goal_reset = ?2 WHERE id = ?1",
            params![habit_id.to_string(), Self::encode_instant(&reset_at)],
        )?;

        if updated == 0 {
            return Err(StorageError::HabitNotFound {
                habit_id: habit_id.to_string(),
            });
        }

        tx.commit()?;

        tracing::debug!(
            "Reset goal for habit {}: deleted {} record(s) for {} to {}",
            habit_id, deleted, period.start, period.end
        );
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn open_store() -> (NamedTempFile, SqliteStore) {
        let file = NamedTempFile::new().expect("Failed to create temp file");
        let store = SqliteStore::new(file.path().to_path_buf()).expect("Failed to open store");
        (file, store)
    }

    #[test]
    fn test_habit_round_trip() {
        let (_file, store) = open_store();
        let habit = Habit::new("Read".to_string(), 3, GoalType::Count, true).unwrap();

        store.create_habit(&habit).unwrap();
        let loaded = store.get_habit(&habit.id).unwrap();

        assert_eq!(loaded.name, habit.name);
        assert_eq!(loaded.goal_value, 3);
        assert_eq!(loaded.goal_type, GoalType::Count);
        assert!(loaded.allows_multiple_per_day);
        assert!(loaded.last_goal_reset.is_none());
    }

    #[test]
    fn test_get_missing_habit() {
        let (_file, store) = open_store();
        let result = store.get_habit(&HabitId::new());
        assert!(matches!(result, Err(StorageError::HabitNotFound { .. })));
    }

    #[test]
    fn test_delete_habit_cascades() {
        let (_file, store) = open_store();
        let habit = Habit::new("Run".to_string(), 0, GoalType::Streak, false).unwrap();
        store.create_habit(&habit).unwrap();

        let event = CompletionEvent::new(habit.id.clone(), Utc::now(), None).unwrap();
        store.create_event(&event).unwrap();

        store.delete_habit(&habit.id).unwrap();
        assert!(store.list_events(&habit.id).unwrap().is_empty());
    }

    #[test]
    fn test_duplicate_goal_period_rejected() {
        let (_file, store) = open_store();
        let habit = Habit::new("Run".to_string(), 3, GoalType::Count, true).unwrap();
        store.create_habit(&habit).unwrap();

        let start = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 6, 16).unwrap();
        let record = GoalCompletionRecord::new(
            habit.id.clone(), GoalType::Count, 3, start, end, 3, None,
        ).unwrap();
        store.insert_goal_record(&record).unwrap();

        let duplicate = GoalCompletionRecord::new(
            habit.id.clone(), GoalType::Count, 3, start, end, 4, None,
        ).unwrap();
        let result = store.insert_goal_record(&duplicate);

        assert!(matches!(result, Err(StorageError::DuplicateGoalPeriod { .. })));
        assert_eq!(store.list_goal_records(&habit.id).unwrap().len(), 1);
    }

    #[test]
    fn test_count_respects_reset_cutoff() {
        let (_file, store) = open_store();
        let habit = Habit::new("Run".to_string(), 3, GoalType::Count, true).unwrap();
        store.create_habit(&habit).unwrap();

        // Fixed mid-day instant so the surrounding events stay on one day
        let cutoff = chrono::TimeZone::with_ymd_and_hms(&Utc, 2024, 6, 15, 12, 0, 0).unwrap();
        let before = CompletionEvent::new(
            habit.id.clone(), cutoff - chrono::Duration::hours(1), None,
        ).unwrap();
        let at = CompletionEvent::new(habit.id.clone(), cutoff, None).unwrap();
        let after = CompletionEvent::new(
            habit.id.clone(), cutoff + chrono::Duration::seconds(1), None,
        ).unwrap();
        store.create_event(&before).unwrap();
        store.create_event(&at).unwrap();
        store.create_event(&after).unwrap();

        let today = cutoff.date_naive();
        let period = GoalPeriod { start: today, end: today + chrono::Duration::days(1) };

        assert_eq!(store.count_events_in_period(&habit.id, &period, None).unwrap(), 3);
        // Strict cutoff: the event at exactly the reset instant is excluded
        assert_eq!(store.count_events_in_period(&habit.id, &period, Some(cutoff)).unwrap(), 1);
    }
}
