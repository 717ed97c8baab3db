//! Working-day calendar
//!
//! Classifies dates as working days or not: a date is a valid working day
//! when no holiday record exists for it and its weekday is not excluded by
//! policy.

use std::sync::Arc;

use chrono::{Datelike, Days, NaiveDate, Weekday};
use tracing::instrument;

use crate::{error::ApplicationError, ports::HolidayStorePort};

/// Upper bound on the forward scan for the next working day. The weekday
/// cycle repeats every 7 days and holiday calendars are finite, so a scan
/// this long only fails on a misconfigured calendar.
const MAX_FORWARD_SCAN_DAYS: u32 = 366;

/// Which weekdays are non-working, independent of holidays
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkingDayPolicy {
    excluded_weekdays: Vec<Weekday>,
}

impl WorkingDayPolicy {
    /// Create a policy excluding the given weekdays
    #[must_use]
    pub fn new(excluded_weekdays: Vec<Weekday>) -> Self {
        Self { excluded_weekdays }
    }

    /// The standard Saturday/Sunday weekend
    #[must_use]
    pub fn weekend() -> Self {
        Self::new(vec![Weekday::Sat, Weekday::Sun])
    }

    /// Check whether a weekday is excluded from the working week
    #[must_use]
    pub fn is_excluded(&self, weekday: Weekday) -> bool {
        self.excluded_weekdays.contains(&weekday)
    }
}

impl Default for WorkingDayPolicy {
    fn default() -> Self {
        Self::weekend()
    }
}

/// Service answering working-day questions against the holiday store
#[derive(Debug)]
pub struct WorkingDayService<H: HolidayStorePort> {
    holiday_store: Arc<H>,
    policy: WorkingDayPolicy,
}

impl<H: HolidayStorePort> Clone for WorkingDayService<H> {
    fn clone(&self) -> Self {
        Self {
            holiday_store: Arc::clone(&self.holiday_store),
            policy: self.policy.clone(),
        }
    }
}

impl<H: HolidayStorePort> WorkingDayService<H> {
    /// Create a new working-day service
    #[must_use]
    pub const fn new(holiday_store: Arc<H>, policy: WorkingDayPolicy) -> Self {
        Self {
            holiday_store,
            policy,
        }
    }

    /// Check whether a holiday record exists for this exact date
    pub async fn is_holiday(&self, date: NaiveDate) -> Result<bool, ApplicationError> {
        self.holiday_store.is_holiday(date).await
    }

    /// Check whether `date` is a valid working day
    pub async fn is_valid_working_day(&self, date: NaiveDate) -> Result<bool, ApplicationError> {
        if self.policy.is_excluded(date.weekday()) {
            return Ok(false);
        }
        Ok(!self.is_holiday(date).await?)
    }

    /// The first valid working day at or after `date`
    #[instrument(skip(self))]
    pub async fn next_working_day(&self, date: NaiveDate) -> Result<NaiveDate, ApplicationError> {
        let mut candidate = date;
        for _ in 0..MAX_FORWARD_SCAN_DAYS {
            if self.is_valid_working_day(candidate).await? {
                return Ok(candidate);
            }
            candidate = candidate.checked_add_days(Days::new(1)).ok_or_else(|| {
                ApplicationError::Internal(format!("calendar overflow advancing past {candidate}"))
            })?;
        }
        Err(ApplicationError::Internal(format!(
            "no working day within {MAX_FORWARD_SCAN_DAYS} days of {date}"
        )))
    }
}
