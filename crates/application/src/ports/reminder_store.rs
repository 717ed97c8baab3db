//! Reminder storage port
//!
//! Defines the interface for persisting and querying reminders. Adapters in
//! the infrastructure layer implement this port using SQLite.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Reminder;
use domain::value_objects::{ReminderId, SeriesId};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Query options for listing reminders
#[derive(Debug, Clone, Default)]
pub struct ReminderQuery {
    /// Only reminders firing at or after this time
    pub from: Option<DateTime<Utc>>,
    /// Only reminders firing at or before this time
    pub until: Option<DateTime<Utc>>,
    /// Case-insensitive substring match on the title
    pub title_contains: Option<String>,
    /// Maximum number of results
    pub limit: Option<u32>,
}

impl ReminderQuery {
    /// Create a query for reminders firing at or after `from`
    #[must_use]
    pub const fn starting_from(from: DateTime<Utc>) -> Self {
        Self {
            from: Some(from),
            until: None,
            title_contains: None,
            limit: None,
        }
    }

    /// Set the upper bound of the range
    #[must_use]
    pub const fn until(mut self, until: DateTime<Utc>) -> Self {
        self.until = Some(until);
        self
    }

    /// Set the title substring filter
    #[must_use]
    pub fn with_title_contains(mut self, term: impl Into<String>) -> Self {
        self.title_contains = Some(term.into());
        self
    }

    /// Set the result limit
    #[must_use]
    pub const fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Port for reminder persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ReminderStorePort: Send + Sync {
    /// Save a new reminder
    async fn save(&self, reminder: &Reminder) -> Result<(), ApplicationError>;

    /// Get a reminder by ID
    async fn get(&self, id: &ReminderId) -> Result<Option<Reminder>, ApplicationError>;

    /// Delete a reminder
    async fn delete(&self, id: &ReminderId) -> Result<(), ApplicationError>;

    /// Count materialized (non-origin) occurrences of a series
    async fn count_occurrences(&self, series_id: &SeriesId) -> Result<u64, ApplicationError>;

    /// Query reminders with filters, ordered by firing time
    async fn query(&self, query: &ReminderQuery) -> Result<Vec<Reminder>, ApplicationError>;
}
