//! Participant note entity - a dated free-text note attached to a study subject

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::value_objects::NoteId;

/// A note about a study participant, shown on the calendar on `date`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParticipantNote {
    /// Unique identifier
    pub id: NoteId,
    /// Study subject this note refers to
    pub subject_identifier: String,
    /// Short title
    pub title: String,
    /// Optional free-text body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// The calendar date the note applies to
    pub date: NaiveDate,
    /// Display tag
    pub color: String,
}

impl ParticipantNote {
    /// Create a new participant note
    #[must_use]
    pub fn new(
        subject_identifier: impl Into<String>,
        title: impl Into<String>,
        date: NaiveDate,
    ) -> Self {
        Self {
            id: NoteId::new(),
            subject_identifier: subject_identifier.into(),
            title: title.into(),
            description: None,
            date,
            color: super::reminder::DEFAULT_COLOR.to_string(),
        }
    }

    /// Set the free-text body
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set the display color tag
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}
