//! Reminder series expansion
//!
//! The single entry point for turning a newly authored reminder (the origin)
//! into its materialized occurrences: one persisted record per recurrence
//! date, each adjusted to the nearest working day, with the origin deleted
//! once the whole series exists.
//!
//! Lifecycle: `CREATED(origin) -> EXPANDING -> EXPANDED(N occurrences)`.
//! There is no transition back; expansion runs synchronously inside the
//! creating call.

use std::collections::BTreeSet;
use std::{fmt, sync::Arc};

use chrono::{NaiveDate, NaiveTime};
use domain::entities::Reminder;
use domain::recurrence::RecurrenceRule;
use domain::value_objects::RepeatFrequency;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use crate::{
    error::ApplicationError,
    ports::{HolidayStorePort, ReminderStorePort},
    services::working_days::WorkingDayService,
};

/// Configuration for series expansion
#[derive(Debug, Clone)]
pub struct ExpansionConfig {
    /// Shift occurrences falling on holidays/weekends to the next working
    /// day (default: on)
    pub shift_to_working_day: bool,
    /// Reject windows starting before this study-wide floor
    pub study_start: Option<NaiveDate>,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            shift_to_working_day: true,
            study_start: None,
        }
    }
}

/// Input for authoring a new reminder series
#[derive(Debug, Clone)]
pub struct NewReminder {
    /// Short title
    pub title: String,
    /// Optional free-text note
    pub note: Option<String>,
    /// First day of the recurrence window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the recurrence window (inclusive)
    pub end_date: NaiveDate,
    /// Time of day applied to every occurrence
    pub reminder_time: NaiveTime,
    /// Display tag; defaults when absent
    pub color: Option<String>,
    /// How often the series repeats
    pub repeat: RepeatFrequency,
}

/// What an expansion call did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpansionOutcome {
    /// The origin was expanded into this many occurrences
    Expanded {
        /// Number of occurrence records created
        occurrences: usize,
    },
    /// The series already had occurrences (or the record was itself an
    /// occurrence); nothing was done
    AlreadyExpanded,
}

/// Service expanding origin reminders into materialized series
pub struct ExpansionService<R: ReminderStorePort, H: HolidayStorePort> {
    reminder_store: Arc<R>,
    working_days: WorkingDayService<H>,
    config: ExpansionConfig,
    // Serializes the check-then-act sequence so two concurrent creation
    // events for one series cannot both observe "not yet expanded".
    expansion_lock: Arc<Mutex<()>>,
}

impl<R: ReminderStorePort, H: HolidayStorePort> fmt::Debug for ExpansionService<R, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExpansionService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<R: ReminderStorePort, H: HolidayStorePort> Clone for ExpansionService<R, H> {
    fn clone(&self) -> Self {
        Self {
            reminder_store: Arc::clone(&self.reminder_store),
            working_days: self.working_days.clone(),
            config: self.config.clone(),
            expansion_lock: Arc::clone(&self.expansion_lock),
        }
    }
}

impl<R: ReminderStorePort, H: HolidayStorePort> ExpansionService<R, H> {
    /// Create a new expansion service
    #[must_use]
    pub fn new(
        reminder_store: Arc<R>,
        working_days: WorkingDayService<H>,
        config: ExpansionConfig,
    ) -> Self {
        Self {
            reminder_store,
            working_days,
            config,
            expansion_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Author a new reminder and expand it into its series.
    ///
    /// Validates the window, persists the origin, then expands it. Returns
    /// the origin as authored together with the expansion outcome.
    #[instrument(skip(self, new), fields(title = %new.title))]
    pub async fn create(
        &self,
        new: NewReminder,
    ) -> Result<(Reminder, ExpansionOutcome), ApplicationError> {
        let mut origin = Reminder::new(
            new.title,
            new.start_date,
            new.end_date,
            new.reminder_time,
            new.repeat,
        );
        if let Some(note) = new.note {
            origin = origin.with_note(note);
        }
        if let Some(color) = new.color {
            origin = origin.with_color(color);
        }
        origin.validate_window(self.config.study_start)?;

        self.reminder_store.save(&origin).await?;
        info!(id = %origin.id, series_id = %origin.series_id, "Origin reminder created");

        let outcome = self.expand(&origin).await?;
        Ok((origin, outcome))
    }

    /// Expand an origin reminder into its materialized occurrences.
    ///
    /// Exactly-once per series: a record that is itself an occurrence, or a
    /// series that already has occurrences (a concurrent expansion won the
    /// race), is left alone and reported as [`ExpansionOutcome::AlreadyExpanded`].
    ///
    /// The origin is deleted only after every occurrence persisted. A
    /// storage failure partway through leaves the origin in place and
    /// surfaces the error; retrying is the caller's decision.
    #[instrument(skip(self, origin), fields(id = %origin.id, series_id = %origin.series_id))]
    pub async fn expand(&self, origin: &Reminder) -> Result<ExpansionOutcome, ApplicationError> {
        if !origin.is_origin {
            debug!("Record is a materialized occurrence, nothing to expand");
            return Ok(ExpansionOutcome::AlreadyExpanded);
        }

        let rule = RecurrenceRule::new(origin.start_date, origin.end_date, origin.repeat)?;

        let _guard = self.expansion_lock.lock().await;

        let existing = self
            .reminder_store
            .count_occurrences(&origin.series_id)
            .await?;
        if existing > 0 {
            debug!(existing, "Series already expanded, deferring");
            return Ok(ExpansionOutcome::AlreadyExpanded);
        }

        let dates = rule.dates();
        if dates.is_empty() {
            // Degenerate window: keep the origin as the sole queryable event.
            info!("Recurrence window yields no occurrences, keeping origin");
            return Ok(ExpansionOutcome::Expanded { occurrences: 0 });
        }

        let mut materialized_dates = BTreeSet::new();
        let mut occurrences = 0usize;
        for date in dates {
            let adjusted = self.adjusted_date(date).await?;
            if !materialized_dates.insert(adjusted) {
                // Working-day shifting collapsed two dates onto one; a
                // series never holds two occurrences on the same day.
                debug!(%adjusted, "Skipping duplicate occurrence date after shift");
                continue;
            }
            self.materialize_adjusted(origin, adjusted).await?;
            occurrences += 1;
        }

        self.reminder_store.delete(&origin.id).await?;
        info!(occurrences, "Series expanded, origin deleted");
        Ok(ExpansionOutcome::Expanded { occurrences })
    }

    /// Materialize one occurrence of `origin` on `date`, shifted to the
    /// next working day when the shift is enabled.
    ///
    /// Persists and returns the occurrence; storage failures propagate.
    pub async fn materialize(
        &self,
        origin: &Reminder,
        date: NaiveDate,
    ) -> Result<Reminder, ApplicationError> {
        let adjusted = self.adjusted_date(date).await?;
        self.materialize_adjusted(origin, adjusted).await
    }

    async fn materialize_adjusted(
        &self,
        origin: &Reminder,
        date: NaiveDate,
    ) -> Result<Reminder, ApplicationError> {
        let occurrence = origin.materialize_on(date);
        self.reminder_store.save(&occurrence).await?;
        debug!(id = %occurrence.id, %date, "Occurrence materialized");
        Ok(occurrence)
    }

    async fn adjusted_date(&self, date: NaiveDate) -> Result<NaiveDate, ApplicationError> {
        if self.config.shift_to_working_day {
            self.working_days.next_working_day(date).await
        } else {
            Ok(date)
        }
    }
}
