//! Appointment storage port
//!
//! The event feed reads upcoming study visits; appointment scheduling itself
//! belongs to the visit-scheduling system.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::Appointment;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for appointment persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AppointmentStorePort: Send + Sync {
    /// Save an appointment record
    async fn save(&self, appointment: &Appointment) -> Result<(), ApplicationError>;

    /// Appointments scheduled after `after`, optionally filtered by a
    /// case-insensitive substring match on the subject identifier
    async fn upcoming<'a>(
        &self,
        after: DateTime<Utc>,
        search: Option<&'a str>,
    ) -> Result<Vec<Appointment>, ApplicationError>;
}
