//! Database migrations
//!
//! Manages database schema versioning. Rollbacks are manual: if a migration
//! fails, fix the underlying issue and re-run. To add a migration, increment
//! `SCHEMA_VERSION`, add a `migrate_vX` function, and call it from
//! `run_migrations`.

use rusqlite::Connection;
use tracing::{debug, error, info};

use super::connection::DatabaseError;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all pending migrations
pub fn run_migrations(conn: &Connection) -> Result<(), DatabaseError> {
    let current_version = get_schema_version(conn)?;

    if current_version < SCHEMA_VERSION {
        info!(
            from_version = current_version,
            to_version = SCHEMA_VERSION,
            "Running database migrations"
        );

        if current_version < 1 {
            if let Err(e) = migrate_v1(conn) {
                error!(version = 1, error = %e, "Migration V001 (initial schema) failed");
                return Err(e);
            }
        }

        set_schema_version(conn, SCHEMA_VERSION)?;
        info!(version = SCHEMA_VERSION, "Database migrations complete");
    } else {
        debug!(version = current_version, "Database schema is up to date");
    }

    Ok(())
}

/// Get current schema version
fn get_schema_version(conn: &Connection) -> Result<i32, DatabaseError> {
    // Create schema_version table if it doesn't exist
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        )",
        [],
    )?;

    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap_or(0);

    Ok(version)
}

/// Set schema version
fn set_schema_version(conn: &Connection, version: i32) -> Result<(), DatabaseError> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

/// Migration to version 1: Initial schema
fn migrate_v1(conn: &Connection) -> Result<(), DatabaseError> {
    debug!("Applying migration V001: Initial schema");

    conn.execute_batch(
        "
        -- Reminder series: origins and materialized occurrences
        CREATE TABLE IF NOT EXISTS reminders (
            id TEXT PRIMARY KEY,
            series_id TEXT NOT NULL,
            is_origin INTEGER NOT NULL,
            occurrence_at TEXT NOT NULL,
            title TEXT NOT NULL,
            note TEXT,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            reminder_time TEXT NOT NULL,
            color TEXT NOT NULL,
            repeat TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_reminders_series
            ON reminders(series_id, is_origin);
        CREATE INDEX IF NOT EXISTS idx_reminders_occurrence_at
            ON reminders(occurrence_at);

        -- Non-working dates, looked up by exact date
        CREATE TABLE IF NOT EXISTS holidays (
            date TEXT PRIMARY KEY,
            name TEXT NOT NULL
        );

        -- Dated free-text notes attached to study subjects
        CREATE TABLE IF NOT EXISTS participant_notes (
            id TEXT PRIMARY KEY,
            subject_identifier TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            date TEXT NOT NULL,
            color TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_participant_notes_date
            ON participant_notes(date);

        -- Scheduled study visits (read model for the event feed)
        CREATE TABLE IF NOT EXISTS appointments (
            id TEXT PRIMARY KEY,
            subject_identifier TEXT NOT NULL,
            visit_code TEXT NOT NULL,
            schedule_name TEXT NOT NULL,
            appt_datetime TEXT NOT NULL,
            status TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_appointments_datetime
            ON appointments(appt_datetime);
        ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn memory_conn() -> Connection {
        Connection::open_in_memory().unwrap()
    }

    #[test]
    fn migrations_run_from_scratch() {
        let conn = memory_conn();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn migrations_are_idempotent() {
        let conn = memory_conn();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();
        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn tables_exist_after_migration() {
        let conn = memory_conn();
        run_migrations(&conn).unwrap();
        for table in ["reminders", "holidays", "participant_notes", "appointments"] {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }
}
