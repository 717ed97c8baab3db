//! Unified calendar event feed
//!
//! Collects upcoming materialized reminders, study appointments, and
//! participant notes into one chronological list of export-ready records.
//! Rendering (CSV, HTML) is the consumer's concern; this service only
//! shapes the data.

use std::{fmt, sync::Arc};

use chrono::{DateTime, NaiveTime, Utc};
use domain::entities::{Appointment, ParticipantNote, Reminder};
use serde::Serialize;
use tracing::{debug, instrument};

use crate::{
    error::ApplicationError,
    ports::{AppointmentStorePort, ParticipantNoteStorePort, ReminderQuery, ReminderStorePort},
    services::cohort::extract_cohort,
};

/// The kind of calendar event a feed record represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A scheduled study visit
    Appointment,
    /// A materialized reminder occurrence (or an unexpanded origin)
    Reminder,
    /// A dated participant note
    ParticipantNote,
}

impl EventType {
    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Appointment => "Appointment",
            Self::Reminder => "Reminder",
            Self::ParticipantNote => "Participant Note",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// One export-ready calendar event
#[derive(Debug, Clone, Serialize)]
pub struct EventRecord {
    /// What kind of event this is
    pub event_type: EventType,
    /// When the event takes place
    pub datetime: DateTime<Utc>,
    /// Title and note concatenated for display
    pub details: String,
    /// Study subject, where the event has one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject_identifier: Option<String>,
    /// Visit code, for appointments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visit_code: Option<String>,
    /// Cohort tag derived from the schedule name, for appointments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cohort: Option<String>,
    /// Schedule name, for appointments
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schedule_name: Option<String>,
}

/// Filters for collecting the feed
#[derive(Debug, Clone)]
pub struct EventFeedQuery {
    /// Only events at or after this time
    pub from: DateTime<Utc>,
    /// Only events at or before this time
    pub until: Option<DateTime<Utc>>,
    /// Substring match: reminder titles, subject identifiers, note titles
    pub search_term: Option<String>,
}

impl EventFeedQuery {
    /// Everything upcoming from `from`
    #[must_use]
    pub const fn upcoming(from: DateTime<Utc>) -> Self {
        Self {
            from,
            until: None,
            search_term: None,
        }
    }

    /// Set the search term
    #[must_use]
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = Some(term.into());
        self
    }
}

/// Service assembling the unified event feed
pub struct EventFeedService<R, A, N>
where
    R: ReminderStorePort,
    A: AppointmentStorePort,
    N: ParticipantNoteStorePort,
{
    reminder_store: Arc<R>,
    appointment_store: Arc<A>,
    note_store: Arc<N>,
}

impl<R, A, N> fmt::Debug for EventFeedService<R, A, N>
where
    R: ReminderStorePort,
    A: AppointmentStorePort,
    N: ParticipantNoteStorePort,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFeedService").finish_non_exhaustive()
    }
}

impl<R, A, N> Clone for EventFeedService<R, A, N>
where
    R: ReminderStorePort,
    A: AppointmentStorePort,
    N: ParticipantNoteStorePort,
{
    fn clone(&self) -> Self {
        Self {
            reminder_store: Arc::clone(&self.reminder_store),
            appointment_store: Arc::clone(&self.appointment_store),
            note_store: Arc::clone(&self.note_store),
        }
    }
}

impl<R, A, N> EventFeedService<R, A, N>
where
    R: ReminderStorePort,
    A: AppointmentStorePort,
    N: ParticipantNoteStorePort,
{
    /// Create a new event feed service
    #[must_use]
    pub const fn new(reminder_store: Arc<R>, appointment_store: Arc<A>, note_store: Arc<N>) -> Self {
        Self {
            reminder_store,
            appointment_store,
            note_store,
        }
    }

    /// Collect the feed, ordered by event time.
    ///
    /// An origin that failed to expand is still a plain reminder record and
    /// appears as a single event.
    #[instrument(skip(self))]
    pub async fn collect(
        &self,
        query: &EventFeedQuery,
    ) -> Result<Vec<EventRecord>, ApplicationError> {
        let mut records = Vec::new();

        let mut reminder_query = ReminderQuery::starting_from(query.from);
        if let Some(until) = query.until {
            reminder_query = reminder_query.until(until);
        }
        if let Some(ref term) = query.search_term {
            reminder_query = reminder_query.with_title_contains(term.clone());
        }
        for reminder in self.reminder_store.query(&reminder_query).await? {
            records.push(Self::reminder_record(&reminder));
        }

        let search = query.search_term.as_deref();
        for appointment in self.appointment_store.upcoming(query.from, search).await? {
            if Self::within_until(query, appointment.appt_datetime) {
                records.push(Self::appointment_record(&appointment));
            }
        }

        for note in self
            .note_store
            .upcoming(query.from.date_naive(), search)
            .await?
        {
            let datetime = note.date.and_time(NaiveTime::MIN).and_utc();
            if Self::within_until(query, datetime) {
                records.push(Self::note_record(&note, datetime));
            }
        }

        records.sort_by_key(|record| record.datetime);
        debug!(count = records.len(), "Collected event feed");
        Ok(records)
    }

    fn within_until(query: &EventFeedQuery, datetime: DateTime<Utc>) -> bool {
        query.until.is_none_or(|until| datetime <= until)
    }

    fn reminder_record(reminder: &Reminder) -> EventRecord {
        let details = match reminder.note.as_deref() {
            Some(note) if !note.is_empty() => format!("{}: {note}", reminder.title),
            _ => reminder.title.clone(),
        };
        EventRecord {
            event_type: EventType::Reminder,
            datetime: reminder.occurrence_at,
            details,
            subject_identifier: None,
            visit_code: None,
            cohort: None,
            schedule_name: None,
        }
    }

    fn appointment_record(appointment: &Appointment) -> EventRecord {
        EventRecord {
            event_type: EventType::Appointment,
            datetime: appointment.appt_datetime,
            details: String::new(),
            subject_identifier: Some(appointment.subject_identifier.clone()),
            visit_code: Some(appointment.visit_code.clone()),
            cohort: extract_cohort(&appointment.schedule_name).map(str::to_string),
            schedule_name: Some(appointment.schedule_name.clone()),
        }
    }

    fn note_record(note: &ParticipantNote, datetime: DateTime<Utc>) -> EventRecord {
        let details = match note.description.as_deref() {
            Some(description) if !description.is_empty() => {
                format!("{}: {description}", note.title)
            },
            _ => note.title.clone(),
        };
        EventRecord {
            event_type: EventType::ParticipantNote,
            datetime,
            details,
            subject_identifier: Some(note.subject_identifier.clone()),
            visit_code: None,
            cohort: None,
            schedule_name: None,
        }
    }
}
