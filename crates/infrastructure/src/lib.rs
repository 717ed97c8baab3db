//! Infrastructure layer - Adapters for storage and runtime wiring
//!
//! Implements the ports defined in the application layer with SQLite-backed
//! stores, and provides configuration loading and telemetry initialization.

pub mod config;
pub mod persistence;
pub mod telemetry;

pub use config::{AppConfig, CalendarConfig, ConfigError, DatabaseConfig, TelemetryConfig};
pub use persistence::{
    ConnectionPool, SqliteAppointmentStore, SqliteHolidayStore, SqliteParticipantNoteStore,
    SqliteReminderStore, create_pool,
};
pub use telemetry::init_telemetry;
