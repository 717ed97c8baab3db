//! Participant note storage port

use async_trait::async_trait;
use chrono::NaiveDate;
use domain::entities::ParticipantNote;
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Port for participant note persistence operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait ParticipantNoteStorePort: Send + Sync {
    /// Save a participant note
    async fn save(&self, note: &ParticipantNote) -> Result<(), ApplicationError>;

    /// Notes dated after `after`, optionally filtered by a case-insensitive
    /// substring match on the subject identifier or title
    async fn upcoming<'a>(
        &self,
        after: NaiveDate,
        search: Option<&'a str>,
    ) -> Result<Vec<ParticipantNote>, ApplicationError>;
}
