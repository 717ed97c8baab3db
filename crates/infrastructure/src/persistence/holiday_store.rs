//! SQLite-based holiday persistence

use std::sync::Arc;

use application::{error::ApplicationError, ports::HolidayStorePort};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::entities::Holiday;
use rusqlite::params;
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;

/// SQLite-based holiday store
#[derive(Debug, Clone)]
pub struct SqliteHolidayStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteHolidayStore {
    /// Create a new SQLite holiday store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl HolidayStorePort for SqliteHolidayStore {
    #[instrument(skip(self, holiday), fields(date = %holiday.date))]
    async fn save(&self, holiday: &Holiday) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let holiday = holiday.clone();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            conn.execute(
                "INSERT OR REPLACE INTO holidays (date, name) VALUES (?1, ?2)",
                params![holiday.date.to_string(), holiday.name],
            )
            .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            debug!("Saved holiday");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn is_holiday(&self, date: NaiveDate) -> Result<bool, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let date_str = date.to_string();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM holidays WHERE date = ?1",
                    [&date_str],
                    |row| row.get(0),
                )
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            Ok(count > 0)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{config::DatabaseConfig, persistence::connection::create_pool};

    fn create_test_store() -> SqliteHolidayStore {
        let config = DatabaseConfig {
            path: ":memory:".to_string(),
            max_connections: 1,
            run_migrations: true,
        };
        let pool = create_pool(&config).unwrap();
        SqliteHolidayStore::new(Arc::new(pool))
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[tokio::test]
    async fn empty_store_has_no_holidays() {
        let store = create_test_store();
        assert!(!store.is_holiday(date(2024, 12, 25)).await.unwrap());
    }

    #[tokio::test]
    async fn saved_holiday_is_found_by_exact_date() {
        let store = create_test_store();
        store
            .save(&Holiday::new(date(2024, 12, 25), "Christmas Day"))
            .await
            .unwrap();

        assert!(store.is_holiday(date(2024, 12, 25)).await.unwrap());
        assert!(!store.is_holiday(date(2024, 12, 26)).await.unwrap());
    }

    #[tokio::test]
    async fn saving_same_date_twice_replaces() {
        let store = create_test_store();
        store
            .save(&Holiday::new(date(2024, 1, 1), "New Year"))
            .await
            .unwrap();
        store
            .save(&Holiday::new(date(2024, 1, 1), "New Year's Day"))
            .await
            .unwrap();

        assert!(store.is_holiday(date(2024, 1, 1)).await.unwrap());
    }
}
