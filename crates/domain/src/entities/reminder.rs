//! Reminder entity - a calendar reminder, both the authored origin and each
//! materialized occurrence of a recurring series
//!
//! A reminder is authored once with a date window and a repeat frequency
//! (the "origin"), then expanded into one record per occurrence date. The
//! origin is transient: after expansion only the occurrences remain.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{ReminderId, RepeatFrequency, SeriesId};

/// Default display tag for reminders authored without an explicit color
pub const DEFAULT_COLOR: &str = "blue";

/// A calendar reminder record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    /// Unique identifier
    pub id: ReminderId,
    /// The logical series this record belongs to
    pub series_id: SeriesId,
    /// True only for the authored, not-yet-expanded record
    pub is_origin: bool,
    /// When this occurrence fires
    pub occurrence_at: DateTime<Utc>,
    /// Short title
    pub title: String,
    /// Optional free-text note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    /// First day of the recurrence window (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the recurrence window (inclusive)
    pub end_date: NaiveDate,
    /// Time of day applied to every occurrence
    pub reminder_time: NaiveTime,
    /// Display tag
    pub color: String,
    /// How often the series repeats
    pub repeat: RepeatFrequency,
}

impl Reminder {
    /// Create a new origin reminder.
    ///
    /// The origin carries a fresh series ID and fires "now" until it is
    /// expanded into dated occurrences.
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        start_date: NaiveDate,
        end_date: NaiveDate,
        reminder_time: NaiveTime,
        repeat: RepeatFrequency,
    ) -> Self {
        Self {
            id: ReminderId::new(),
            series_id: SeriesId::new(),
            is_origin: true,
            occurrence_at: Utc::now(),
            title: title.into(),
            note: None,
            start_date,
            end_date,
            reminder_time,
            color: DEFAULT_COLOR.to_string(),
            repeat,
        }
    }

    /// Set the free-text note
    #[must_use]
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    /// Set the display color tag
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Check the recurrence window against an optional study start floor.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ValidationError`] if the end date precedes the
    /// start date, or if either date precedes `study_floor`.
    pub fn validate_window(&self, study_floor: Option<NaiveDate>) -> Result<(), DomainError> {
        if self.end_date < self.start_date {
            return Err(DomainError::ValidationError(format!(
                "end date {} precedes start date {}",
                self.end_date, self.start_date
            )));
        }
        if let Some(floor) = study_floor {
            if self.start_date < floor || self.end_date < floor {
                return Err(DomainError::ValidationError(format!(
                    "reminder window [{}, {}] precedes study start {floor}",
                    self.start_date, self.end_date
                )));
            }
        }
        Ok(())
    }

    /// Build one materialized occurrence of this series on `date`.
    ///
    /// The occurrence gets a fresh ID, keeps the series identity, and copies
    /// every shared field verbatim. Its firing time combines `date` with the
    /// series' time of day.
    #[must_use]
    pub fn materialize_on(&self, date: NaiveDate) -> Self {
        Self {
            id: ReminderId::new(),
            series_id: self.series_id,
            is_origin: false,
            occurrence_at: date.and_time(self.reminder_time).and_utc(),
            title: self.title.clone(),
            note: self.note.clone(),
            start_date: self.start_date,
            end_date: self.end_date,
            reminder_time: self.reminder_time,
            color: self.color.clone(),
            repeat: self.repeat,
        }
    }

    /// The calendar date this occurrence fires on
    #[must_use]
    pub fn occurrence_date(&self) -> NaiveDate {
        self.occurrence_at.date_naive()
    }
}

impl std::fmt::Display for Reminder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}, {})",
            self.title,
            self.repeat,
            self.occurrence_at.format("%Y-%m-%d %H:%M")
        )
    }
}
