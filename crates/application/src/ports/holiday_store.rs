//! Holiday storage port
//!
//! The working-day calendar reads holidays by exact date equality.

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::entities::Holiday;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for holiday persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HolidayStorePort: Send + Sync {
    /// Save a holiday record
    async fn save(&self, holiday: &Holiday) -> Result<(), ApplicationError>;

    /// Check whether a holiday record exists for this exact date
    async fn is_holiday(&self, date: NaiveDate) -> Result<bool, ApplicationError>;
}
