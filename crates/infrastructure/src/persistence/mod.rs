//! SQLite persistence adapters

mod appointment_store;
mod connection;
mod holiday_store;
mod migrations;
mod participant_note_store;
mod reminder_store;

pub use appointment_store::SqliteAppointmentStore;
pub use connection::{ConnectionPool, DatabaseError, PooledConn, create_pool};
pub use holiday_store::SqliteHolidayStore;
pub use migrations::run_migrations;
pub use participant_note_store::SqliteParticipantNoteStore;
pub use reminder_store::SqliteReminderStore;
