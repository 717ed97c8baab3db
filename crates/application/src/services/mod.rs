//! Application services

mod cohort;
mod event_feed;
mod expansion;
mod working_days;

pub use cohort::extract_cohort;
pub use event_feed::{EventFeedQuery, EventFeedService, EventRecord, EventType};
pub use expansion::{ExpansionConfig, ExpansionOutcome, ExpansionService, NewReminder};
pub use working_days::{WorkingDayPolicy, WorkingDayService};
