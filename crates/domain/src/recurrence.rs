//! Recurrence date generation
//!
//! Computes the ordered occurrence dates of a reminder series in two phases:
//! the potential dates (every whole step of the frequency inside the window,
//! seed included) and the recurrence-filtered dates actually materialized.

use chrono::NaiveDate;

use crate::errors::DomainError;
use crate::value_objects::RepeatFrequency;

/// A validated recurrence rule: the pure input of date generation.
///
/// Generation is a deterministic function of `(start, end, frequency)` with
/// no hidden state, and the output is finite (bounded by the window span
/// divided by the step size).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceRule {
    start: NaiveDate,
    end: NaiveDate,
    frequency: RepeatFrequency,
}

impl RecurrenceRule {
    /// Create a rule over the inclusive window `[start, end]`.
    ///
    /// # Errors
    ///
    /// Returns [`DomainError::ValidationError`] if `end < start`.
    pub fn new(
        start: NaiveDate,
        end: NaiveDate,
        frequency: RepeatFrequency,
    ) -> Result<Self, DomainError> {
        if end < start {
            return Err(DomainError::ValidationError(format!(
                "end date {end} precedes start date {start}"
            )));
        }
        Ok(Self {
            start,
            end,
            frequency,
        })
    }

    /// First day of the window
    #[must_use]
    pub const fn start(&self) -> NaiveDate {
        self.start
    }

    /// Last day of the window
    #[must_use]
    pub const fn end(&self) -> NaiveDate {
        self.end
    }

    /// The repeat frequency
    #[must_use]
    pub const fn frequency(&self) -> RepeatFrequency {
        self.frequency
    }

    /// Phase one: every candidate date inside the window.
    ///
    /// Starts at the seed `start` and repeatedly adds one whole step of the
    /// frequency until the candidate would pass `end`. Each candidate is
    /// computed from `start` with a multiplied delta, so month-end clamping
    /// applies per candidate and never accumulates.
    #[must_use]
    pub fn potential_dates(&self) -> Vec<NaiveDate> {
        let mut dates = Vec::new();
        let mut step = 0u32;
        while let Some(candidate) = self.frequency.advance(self.start, step) {
            if candidate > self.end {
                break;
            }
            dates.push(candidate);
            step += 1;
        }
        dates
    }

    /// Phase two: the dates an expansion actually materializes.
    ///
    /// The window is treated as half-open for generation: a candidate
    /// landing exactly on `end` is dropped. When the window is a whole
    /// number of steps this yields one date fewer than the potential set
    /// (a three-month monthly window produces three dates from four
    /// candidates); when it is not aligned, every candidate is kept.
    #[must_use]
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.potential_dates()
            .into_iter()
            .filter(|candidate| *candidate != self.end)
            .collect()
    }
}
