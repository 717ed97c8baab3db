//! Repeat frequency for recurring reminders
//!
//! Frequencies are keyed by canonical lowercase strings so records authored
//! by older clients stay parseable; an unrecognized key is a hard error
//! rather than a silent fallback.

use std::{fmt, str::FromStr};

use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// How often a reminder series repeats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatFrequency {
    /// Every day
    Daily,
    /// Every 7 days
    Weekly,
    /// Every calendar month
    Monthly,
    /// Every calendar year
    Yearly,
}

impl RepeatFrequency {
    /// All recognized frequencies
    pub const ALL: [Self; 4] = [Self::Daily, Self::Weekly, Self::Monthly, Self::Yearly];

    /// Canonical string key used in storage and on the wire
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
            Self::Yearly => "yearly",
        }
    }

    /// Get a human-readable label
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Daily => "Daily",
            Self::Weekly => "Weekly",
            Self::Monthly => "Monthly",
            Self::Yearly => "Yearly",
        }
    }

    /// The date `steps` whole periods after `start`.
    ///
    /// Month and year steps use calendar-delta arithmetic with end-of-month
    /// clamping (Jan 31 + 1 month = Feb 28/29). The delta is always applied
    /// to `start` in one multiplied step so clamping never compounds across
    /// iterations.
    ///
    /// Returns `None` if the resulting date would overflow the calendar.
    #[must_use]
    pub fn advance(&self, start: NaiveDate, steps: u32) -> Option<NaiveDate> {
        match self {
            Self::Daily => start.checked_add_days(Days::new(u64::from(steps))),
            Self::Weekly => start.checked_add_days(Days::new(7 * u64::from(steps))),
            Self::Monthly => start.checked_add_months(Months::new(steps)),
            Self::Yearly => start.checked_add_months(Months::new(steps.checked_mul(12)?)),
        }
    }
}

impl fmt::Display for RepeatFrequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for RepeatFrequency {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            "yearly" => Ok(Self::Yearly),
            other => Err(DomainError::UnknownFrequency(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn canonical_keys_roundtrip() {
        for freq in RepeatFrequency::ALL {
            assert_eq!(freq.as_str().parse::<RepeatFrequency>().unwrap(), freq);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!(
            "MONTHLY".parse::<RepeatFrequency>().unwrap(),
            RepeatFrequency::Monthly
        );
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = "fortnightly".parse::<RepeatFrequency>().unwrap_err();
        assert!(matches!(err, DomainError::UnknownFrequency(_)));
    }

    #[test]
    fn daily_advance() {
        assert_eq!(
            RepeatFrequency::Daily.advance(date(2024, 3, 30), 3),
            Some(date(2024, 4, 2))
        );
    }

    #[test]
    fn weekly_advance() {
        assert_eq!(
            RepeatFrequency::Weekly.advance(date(2024, 1, 1), 2),
            Some(date(2024, 1, 15))
        );
    }

    #[test]
    fn monthly_advance_clamps_to_month_end() {
        assert_eq!(
            RepeatFrequency::Monthly.advance(date(2024, 1, 31), 1),
            Some(date(2024, 2, 29))
        );
        assert_eq!(
            RepeatFrequency::Monthly.advance(date(2023, 1, 31), 1),
            Some(date(2023, 2, 28))
        );
    }

    #[test]
    fn monthly_advance_does_not_compound_clamping() {
        // Two months from Jan 31 is Mar 31, not Mar 28.
        assert_eq!(
            RepeatFrequency::Monthly.advance(date(2023, 1, 31), 2),
            Some(date(2023, 3, 31))
        );
    }

    #[test]
    fn yearly_advance_handles_leap_day() {
        assert_eq!(
            RepeatFrequency::Yearly.advance(date(2024, 2, 29), 1),
            Some(date(2025, 2, 28))
        );
    }

    #[test]
    fn zero_steps_is_identity() {
        for freq in RepeatFrequency::ALL {
            assert_eq!(freq.advance(date(2024, 6, 15), 0), Some(date(2024, 6, 15)));
        }
    }

    #[test]
    fn display_uses_label() {
        assert_eq!(RepeatFrequency::Weekly.to_string(), "Weekly");
    }

    #[test]
    fn serde_uses_snake_case() {
        let json = serde_json::to_string(&RepeatFrequency::Monthly).unwrap();
        assert_eq!(json, "\"monthly\"");
    }
}
