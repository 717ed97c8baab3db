//! Port definitions for the application layer
//!
//! Ports are interfaces that define how the application interacts with
//! storage. Adapters in the infrastructure layer implement these ports.

mod appointment_store;
mod holiday_store;
mod participant_note_store;
mod reminder_store;

#[cfg(test)]
pub use appointment_store::MockAppointmentStorePort;
pub use appointment_store::AppointmentStorePort;
#[cfg(test)]
pub use holiday_store::MockHolidayStorePort;
pub use holiday_store::HolidayStorePort;
#[cfg(test)]
pub use participant_note_store::MockParticipantNoteStorePort;
pub use participant_note_store::ParticipantNoteStorePort;
#[cfg(test)]
pub use reminder_store::MockReminderStorePort;
pub use reminder_store::{ReminderQuery, ReminderStorePort};
