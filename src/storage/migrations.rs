/// Database migration management
///
/// This module handles creating and updating the SQLite database schema.
/// It ensures the database has all the required tables and indexes.

use rusqlite::Connection;
use crate::storage::StorageError;

/// Current database schema version
///
/// Increment this when you add new migrations
const CURRENT_VERSION: i32 = 1;

/// Initialize the database schema
///
/// This creates all required tables and indexes if they don't exist.
/// It also sets up the version tracking for future migrations.
pub fn initialize_database(conn: &Connection) -> Result<(), StorageError> {
    // Create version tracking table first
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    // Check current version
    let current_version = get_current_version(conn)?;

    // Run migrations if needed
    if current_version < CURRENT_VERSION {
        run_migrations(conn, current_version)?;
        set_version(conn, CURRENT_VERSION)?;
    }

    Ok(())
}

/// Get the current database schema version
fn get_current_version(conn: &Connection) -> Result<i32, StorageError> {
    let version = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
            row.get::<_, i32>(0)
        })
        .unwrap_or(0); // Default to version 0 if no version record exists

    Ok(version)
}

/// Set the database schema version
fn set_version(conn: &Connection, version: i32) -> Result<(), StorageError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Run database migrations from the current version to the latest
fn run_migrations(conn: &Connection, from_version: i32) -> Result<(), StorageError> {
    if from_version < 1 {
        migration_v1(conn)?;
    }

    // Future migrations would go here:
    // if from_version < 2 {
    //     migration_v2(conn)?;
    // }

    Ok(())
}

/// Migration to version 1: Create initial tables
///
/// This creates the core tables for habits, completion events, and the
/// goal completion ledger.
fn migration_v1(conn: &Connection) -> Result<(), StorageError> {
    // Create habits table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            goal_value INTEGER NOT NULL DEFAULT 0,
            goal_type TEXT NOT NULL DEFAULT 'streak',
            allows_multiple_per_day INTEGER NOT NULL DEFAULT 0,
            last_goal_reset TEXT,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // Create completion_events table
    // completed_on is the calendar day of completed_at, kept as its own
    // column so day-window queries stay indexable
    conn.execute(
        "CREATE TABLE IF NOT EXISTS completion_events (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL,
            completed_at TEXT NOT NULL,
            completed_on TEXT NOT NULL,
            note TEXT,
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        )",
        [],
    )?;

    // Create goal_completions ledger table
    conn.execute(
        "CREATE TABLE IF NOT EXISTS goal_completions (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL,
            goal_type TEXT NOT NULL,
            goal_value INTEGER NOT NULL,
            period_start TEXT NOT NULL,
            period_end TEXT NOT NULL,
            actual_count INTEGER NOT NULL,
            completed_at TEXT NOT NULL,
            note TEXT,
            FOREIGN KEY (habit_id) REFERENCES habits (id) ON DELETE CASCADE
        )",
        [],
    )?;

    create_indexes_v1(conn)?;

    tracing::info!("Applied migration v1: Created initial database schema");
    Ok(())
}

/// Create database indexes for version 1
fn create_indexes_v1(conn: &Connection) -> Result<(), StorageError> {
    // Index for finding events by habit and day (most common query)
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_completion_events_habit_day
         ON completion_events (habit_id, completed_on)",
        [],
    )?;

    // Index for listing a habit's ledger history
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_goal_completions_habit
         ON goal_completions (habit_id, completed_at)",
        [],
    )?;

    // At-most-once credit per goal period: the ledger's natural key
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_goal_completions_period
         ON goal_completions (habit_id, period_start, period_end)",
        [],
    )?;

    tracing::info!("Created database indexes for v1");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_initialize_database() {
        let conn = Connection::open_in_memory().unwrap();

        // Should succeed on a fresh database
        let result = initialize_database(&conn);
        assert!(result.is_ok());

        // Should succeed when called again (idempotent)
        let result = initialize_database(&conn);
        assert!(result.is_ok());

        // Verify tables were created
        let table_count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('habits', 'completion_events', 'goal_completions')",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(table_count, 3);
    }

    #[test]
    fn test_version_tracking() {
        let conn = Connection::open_in_memory().unwrap();

        // Initialize should set version to current
        initialize_database(&conn).unwrap();
        let version = get_current_version(&conn).unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }

    #[test]
    fn test_period_unique_index_exists() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_database(&conn).unwrap();

        let count: i32 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='index' AND name='idx_goal_completions_period'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(count, 1);
    }
}
