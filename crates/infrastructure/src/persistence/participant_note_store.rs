//! SQLite-based participant note persistence

use std::sync::Arc;

use application::{error::ApplicationError, ports::ParticipantNoteStorePort};
use async_trait::async_trait;
use chrono::NaiveDate;
use domain::entities::ParticipantNote;
use domain::value_objects::NoteId;
use rusqlite::{Row, params, types::Type};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;

/// SQLite-based participant note store
#[derive(Debug, Clone)]
pub struct SqliteParticipantNoteStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteParticipantNoteStore {
    /// Create a new SQLite participant note store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ParticipantNoteStorePort for SqliteParticipantNoteStore {
    #[instrument(skip(self, note), fields(note_id = %note.id))]
    async fn save(&self, note: &ParticipantNote) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let note = note.clone();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            conn.execute(
                "INSERT INTO participant_notes (
                    id, subject_identifier, title, description, date, color
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    note.id.to_string(),
                    note.subject_identifier,
                    note.title,
                    note.description,
                    note.date.to_string(),
                    note.color,
                ],
            )
            .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            debug!("Saved participant note");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn upcoming<'a>(
        &self,
        after: NaiveDate,
        search: Option<&'a str>,
    ) -> Result<Vec<ParticipantNote>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let after_str = after.to_string();
        let search = search.map(str::to_string);

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let mut sql = String::from(
                "SELECT id, subject_identifier, title, description, date, color
                 FROM participant_notes WHERE date > ?1",
            );
            let mut param_values: Vec<String> = vec![after_str];

            if let Some(term) = search {
                param_values.push(term);
                sql.push_str(&format!(
                    " AND (subject_identifier LIKE '%' || ?{n} || '%'
                       OR title LIKE '%' || ?{n} || '%')",
                    n = param_values.len()
                ));
            }

            sql.push_str(" ORDER BY date ASC");

            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let params_refs: Vec<&dyn rusqlite::types::ToSql> = param_values
                .iter()
                .map(|s| s as &dyn rusqlite::types::ToSql)
                .collect();

            let notes: Vec<ParticipantNote> = stmt
                .query_map(params_refs.as_slice(), row_to_note)
                .map_err(|e| ApplicationError::Storage(e.to_string()))?
                .filter_map(Result::ok)
                .collect();

            Ok(notes)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

/// Convert a database row to a ParticipantNote domain entity
fn row_to_note(row: &Row<'_>) -> rusqlite::Result<ParticipantNote> {
    let id_str: String = row.get(0)?;
    let subject_identifier: String = row.get(1)?;
    let title: String = row.get(2)?;
    let description: Option<String> = row.get(3)?;
    let date_str: String = row.get(4)?;
    let color: String = row.get(5)?;

    Ok(ParticipantNote {
        id: NoteId::parse(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
        })?,
        subject_identifier,
        title,
        description,
        date: date_str.parse::<NaiveDate>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
        })?,
        color,
    })
}
