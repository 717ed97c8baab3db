//! Value Objects - Immutable, identity-less domain primitives

mod appointment_id;
mod note_id;
mod reminder_id;
mod repeat_frequency;
mod series_id;

pub use appointment_id::AppointmentId;
pub use note_id::NoteId;
pub use reminder_id::ReminderId;
pub use repeat_frequency::RepeatFrequency;
pub use series_id::SeriesId;
