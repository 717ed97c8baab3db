//! Domain entities - Objects with identity and lifecycle

mod appointment;
mod holiday;
mod participant_note;
mod reminder;

pub use appointment::{Appointment, AppointmentStatus};
pub use holiday::Holiday;
pub use participant_note::ParticipantNote;
pub use reminder::Reminder;
