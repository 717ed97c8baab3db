//! Holiday entity - a non-working calendar date
//!
//! Holidays are looked up by exact date equality when classifying working
//! days, so the date itself is the identity.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A registered non-working date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holiday {
    /// The calendar date (identity)
    pub date: NaiveDate,
    /// Human-readable name
    pub name: String,
}

impl Holiday {
    /// Create a new holiday record
    #[must_use]
    pub fn new(date: NaiveDate, name: impl Into<String>) -> Self {
        Self {
            date,
            name: name.into(),
        }
    }
}

impl std::fmt::Display for Holiday {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.date)
    }
}
