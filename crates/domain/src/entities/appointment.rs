//! Appointment entity - a scheduled study visit
//!
//! Appointments are created by the visit-scheduling system; this crate only
//! reads them for the unified event feed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::AppointmentId;

/// Status of a scheduled appointment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    /// Scheduled, visit not started
    New,
    /// Visit currently underway
    InProgress,
    /// Visit started but data entry incomplete
    Incomplete,
    /// Visit fully completed
    Complete,
    /// Appointment cancelled
    Cancelled,
}

impl AppointmentStatus {
    /// Check if this status is terminal (no further transitions)
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Cancelled)
    }

    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::New => "New",
            Self::InProgress => "In Progress",
            Self::Incomplete => "Incomplete",
            Self::Complete => "Complete",
            Self::Cancelled => "Cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A scheduled study visit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    /// Unique identifier
    pub id: AppointmentId,
    /// Study subject attending the visit
    pub subject_identifier: String,
    /// Visit code within the study schedule
    pub visit_code: String,
    /// Name of the schedule this visit belongs to; carries the cohort token
    pub schedule_name: String,
    /// When the visit takes place
    pub appt_datetime: DateTime<Utc>,
    /// Current status
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Create a new appointment in the `New` status
    #[must_use]
    pub fn new(
        subject_identifier: impl Into<String>,
        visit_code: impl Into<String>,
        schedule_name: impl Into<String>,
        appt_datetime: DateTime<Utc>,
    ) -> Self {
        Self {
            id: AppointmentId::new(),
            subject_identifier: subject_identifier.into(),
            visit_code: visit_code.into(),
            schedule_name: schedule_name.into(),
            appt_datetime,
            status: AppointmentStatus::New,
        }
    }

    /// Set the status
    #[must_use]
    pub const fn with_status(mut self, status: AppointmentStatus) -> Self {
        self.status = status;
        self
    }
}

impl std::fmt::Display for Appointment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} ({})",
            self.subject_identifier, self.visit_code, self.status
        )
    }
}
