//! SQLite-based reminder persistence

use std::sync::Arc;

use application::{
    error::ApplicationError,
    ports::{ReminderQuery, ReminderStorePort},
};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use domain::entities::Reminder;
use domain::value_objects::{ReminderId, RepeatFrequency, SeriesId};
use rusqlite::{Row, params, types::Type};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;

/// SQLite-based reminder store
#[derive(Debug, Clone)]
pub struct SqliteReminderStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteReminderStore {
    /// Create a new SQLite reminder store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReminderStorePort for SqliteReminderStore {
    #[instrument(skip(self, reminder), fields(reminder_id = %reminder.id))]
    async fn save(&self, reminder: &Reminder) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let reminder = reminder.clone();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            conn.execute(
                "INSERT INTO reminders (
                    id, series_id, is_origin, occurrence_at, title, note,
                    start_date, end_date, reminder_time, color, repeat
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                params![
                    reminder.id.to_string(),
                    reminder.series_id.to_string(),
                    i32::from(reminder.is_origin),
                    reminder.occurrence_at.to_rfc3339(),
                    reminder.title,
                    reminder.note,
                    reminder.start_date.to_string(),
                    reminder.end_date.to_string(),
                    reminder.reminder_time.to_string(),
                    reminder.color,
                    reminder.repeat.as_str(),
                ],
            )
            .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            debug!("Saved reminder");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(reminder_id = %id))]
    async fn get(&self, id: &ReminderId) -> Result<Option<Reminder>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let id_str = id.to_string();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let result = conn
                .query_row(
                    "SELECT id, series_id, is_origin, occurrence_at, title, note,
                        start_date, end_date, reminder_time, color, repeat
                     FROM reminders WHERE id = ?1",
                    [&id_str],
                    row_to_reminder,
                )
                .optional()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            Ok(result)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(reminder_id = %id))]
    async fn delete(&self, id: &ReminderId) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let id_str = id.to_string();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            conn.execute("DELETE FROM reminders WHERE id = ?1", [&id_str])
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            debug!("Deleted reminder");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self), fields(series_id = %series_id))]
    async fn count_occurrences(&self, series_id: &SeriesId) -> Result<u64, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let series_str = series_id.to_string();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM reminders
                     WHERE series_id = ?1 AND is_origin = 0",
                    [&series_str],
                    |row| row.get(0),
                )
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            #[allow(clippy::cast_sign_loss)] // COUNT(*) is always non-negative
            Ok(count as u64)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn query(&self, query: &ReminderQuery) -> Result<Vec<Reminder>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let query = query.clone();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let mut sql = String::from(
                "SELECT id, series_id, is_origin, occurrence_at, title, note,
                    start_date, end_date, reminder_time, color, repeat
                 FROM reminders WHERE 1=1",
            );
            let mut param_values: Vec<String> = Vec::new();

            if let Some(ref from) = query.from {
                param_values.push(from.to_rfc3339());
                sql.push_str(&format!(" AND occurrence_at >= ?{}", param_values.len()));
            }

            if let Some(ref until) = query.until {
                param_values.push(until.to_rfc3339());
                sql.push_str(&format!(" AND occurrence_at <= ?{}", param_values.len()));
            }

            if let Some(ref term) = query.title_contains {
                param_values.push(term.clone());
                sql.push_str(&format!(
                    " AND title LIKE '%' || ?{} || '%'",
                    param_values.len()
                ));
            }

            sql.push_str(" ORDER BY occurrence_at ASC");

            if let Some(limit) = query.limit {
                param_values.push(limit.to_string());
                sql.push_str(&format!(" LIMIT ?{}", param_values.len()));
            }

            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let params_refs: Vec<&dyn rusqlite::types::ToSql> = param_values
                .iter()
                .map(|s| s as &dyn rusqlite::types::ToSql)
                .collect();

            let reminders: Vec<Reminder> = stmt
                .query_map(params_refs.as_slice(), row_to_reminder)
                .map_err(|e| ApplicationError::Storage(e.to_string()))?
                .filter_map(Result::ok)
                .collect();

            Ok(reminders)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

/// Convert a database row to a Reminder domain entity
fn row_to_reminder(row: &Row<'_>) -> rusqlite::Result<Reminder> {
    let id_str: String = row.get(0)?;
    let series_str: String = row.get(1)?;
    let is_origin: i32 = row.get(2)?;
    let occurrence_at_str: String = row.get(3)?;
    let title: String = row.get(4)?;
    let note: Option<String> = row.get(5)?;
    let start_date_str: String = row.get(6)?;
    let end_date_str: String = row.get(7)?;
    let reminder_time_str: String = row.get(8)?;
    let color: String = row.get(9)?;
    let repeat_str: String = row.get(10)?;

    Ok(Reminder {
        id: ReminderId::parse(&id_str).map_err(|e| conversion_error(0, e))?,
        series_id: SeriesId::parse(&series_str).map_err(|e| conversion_error(1, e))?,
        is_origin: is_origin != 0,
        occurrence_at: parse_datetime(3, &occurrence_at_str)?,
        title,
        note,
        start_date: parse_date(6, &start_date_str)?,
        end_date: parse_date(7, &end_date_str)?,
        reminder_time: parse_time(8, &reminder_time_str)?,
        color,
        repeat: repeat_str
            .parse::<RepeatFrequency>()
            .map_err(|e| conversion_error(10, e))?,
    })
}

fn parse_datetime(idx: usize, s: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

fn parse_date(idx: usize, s: &str) -> rusqlite::Result<NaiveDate> {
    s.parse::<NaiveDate>().map_err(|e| conversion_error(idx, e))
}

fn parse_time(idx: usize, s: &str) -> rusqlite::Result<NaiveTime> {
    s.parse::<NaiveTime>().map_err(|e| conversion_error(idx, e))
}

fn conversion_error(
    idx: usize,
    source: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(source))
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> rusqlite::Result<Option<T>>;
}

impl<T> OptionalExt<T> for rusqlite::Result<T> {
    fn optional(self) -> rusqlite::Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;
    use crate::{config::DatabaseConfig, persistence::connection::create_pool};

    fn create_test_store() -> SqliteReminderStore {
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            max_connections: 1,
            run_migrations: true,
        };
        let pool = create_pool(&config).unwrap();
        SqliteReminderStore::new(Arc::new(pool))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample_origin(title: &str) -> Reminder {
        Reminder::new(
            title,
            date(2024, 4, 1),
            date(2024, 7, 1),
            NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            RepeatFrequency::Monthly,
        )
        .with_note("Fasting sample")
        .with_color("red")
    }

    #[tokio::test]
    async fn save_and_get_reminder() {
        let store = create_test_store();
        let origin = sample_origin("Draw bloods");

        store.save(&origin).await.unwrap();

        let retrieved = store.get(&origin.id).await.unwrap().unwrap();
        assert_eq!(retrieved.id, origin.id);
        assert_eq!(retrieved.series_id, origin.series_id);
        assert!(retrieved.is_origin);
        assert_eq!(retrieved.title, "Draw bloods");
        assert_eq!(retrieved.note.as_deref(), Some("Fasting sample"));
        assert_eq!(retrieved.color, "red");
        assert_eq!(retrieved.repeat, RepeatFrequency::Monthly);
        assert_eq!(retrieved.start_date, origin.start_date);
        assert_eq!(retrieved.end_date, origin.end_date);
        assert_eq!(retrieved.reminder_time, origin.reminder_time);
    }

    #[tokio::test]
    async fn get_nonexistent_returns_none() {
        let store = create_test_store();
        let result = store.get(&ReminderId::new()).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn delete_reminder() {
        let store = create_test_store();
        let origin = sample_origin("Delete me");
        store.save(&origin).await.unwrap();

        store.delete(&origin.id).await.unwrap();

        assert!(store.get(&origin.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn count_occurrences_ignores_origin() {
        let store = create_test_store();
        let origin = sample_origin("Counted");
        store.save(&origin).await.unwrap();

        assert_eq!(store.count_occurrences(&origin.series_id).await.unwrap(), 0);

        store
            .save(&origin.materialize_on(date(2024, 4, 1)))
            .await
            .unwrap();
        store
            .save(&origin.materialize_on(date(2024, 5, 1)))
            .await
            .unwrap();

        assert_eq!(store.count_occurrences(&origin.series_id).await.unwrap(), 2);

        // Another series is unaffected
        let other = sample_origin("Other");
        assert_eq!(store.count_occurrences(&other.series_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn query_filters_by_range_and_title() {
        let store = create_test_store();
        let origin = sample_origin("Draw bloods");
        let near = origin.materialize_on(date(2024, 4, 1));
        let far = origin.materialize_on(date(2024, 6, 3));
        store.save(&near).await.unwrap();
        store.save(&far).await.unwrap();

        let other = sample_origin("Dose check");
        store
            .save(&other.materialize_on(date(2024, 4, 2)))
            .await
            .unwrap();

        let from = date(2024, 3, 1).and_time(NaiveTime::MIN).and_utc();
        let query = ReminderQuery::starting_from(from)
            .until(from + Duration::days(60))
            .with_title_contains("bloods");
        let results = store.query(&query).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, near.id);
    }

    #[tokio::test]
    async fn query_orders_by_occurrence_time() {
        let store = create_test_store();
        let origin = sample_origin("Ordered");
        store
            .save(&origin.materialize_on(date(2024, 6, 3)))
            .await
            .unwrap();
        store
            .save(&origin.materialize_on(date(2024, 4, 1)))
            .await
            .unwrap();
        store
            .save(&origin.materialize_on(date(2024, 5, 1)))
            .await
            .unwrap();

        let results = store.query(&ReminderQuery::default()).await.unwrap();
        let dates: Vec<NaiveDate> = results.iter().map(Reminder::occurrence_date).collect();
        assert_eq!(
            dates,
            vec![date(2024, 4, 1), date(2024, 5, 1), date(2024, 6, 3)]
        );
    }

    #[tokio::test]
    async fn query_respects_limit() {
        let store = create_test_store();
        let origin = sample_origin("Limited");
        for day in 1..=5 {
            store
                .save(&origin.materialize_on(date(2024, 4, day)))
                .await
                .unwrap();
        }

        let query = ReminderQuery::default().with_limit(2);
        let results = store.query(&query).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn title_match_is_case_insensitive() {
        let store = create_test_store();
        let origin = sample_origin("Draw Bloods");
        store
            .save(&origin.materialize_on(date(2024, 4, 1)))
            .await
            .unwrap();

        let query = ReminderQuery::default().with_title_contains("bloods");
        let results = store.query(&query).await.unwrap();
        assert_eq!(results.len(), 1);
    }
}
