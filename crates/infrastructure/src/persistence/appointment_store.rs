//! SQLite-based appointment persistence

use std::sync::Arc;

use application::{error::ApplicationError, ports::AppointmentStorePort};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::entities::{Appointment, AppointmentStatus};
use domain::value_objects::AppointmentId;
use rusqlite::{Row, params, types::Type};
use tokio::task;
use tracing::{debug, instrument};

use super::connection::ConnectionPool;

/// SQLite-based appointment store
#[derive(Debug, Clone)]
pub struct SqliteAppointmentStore {
    pool: Arc<ConnectionPool>,
}

impl SqliteAppointmentStore {
    /// Create a new SQLite appointment store
    #[must_use]
    pub const fn new(pool: Arc<ConnectionPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentStorePort for SqliteAppointmentStore {
    #[instrument(skip(self, appointment), fields(appointment_id = %appointment.id))]
    async fn save(&self, appointment: &Appointment) -> Result<(), ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let appointment = appointment.clone();

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            conn.execute(
                "INSERT INTO appointments (
                    id, subject_identifier, visit_code, schedule_name,
                    appt_datetime, status
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    appointment.id.to_string(),
                    appointment.subject_identifier,
                    appointment.visit_code,
                    appointment.schedule_name,
                    appointment.appt_datetime.to_rfc3339(),
                    status_to_str(appointment.status),
                ],
            )
            .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            debug!("Saved appointment");
            Ok(())
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }

    #[instrument(skip(self))]
    async fn upcoming<'a>(
        &self,
        after: DateTime<Utc>,
        search: Option<&'a str>,
    ) -> Result<Vec<Appointment>, ApplicationError> {
        let pool = Arc::clone(&self.pool);
        let after_str = after.to_rfc3339();
        let search = search.map(str::to_string);

        task::spawn_blocking(move || {
            let conn = pool
                .get()
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let mut sql = String::from(
                "SELECT id, subject_identifier, visit_code, schedule_name,
                    appt_datetime, status
                 FROM appointments WHERE appt_datetime > ?1",
            );
            let mut param_values: Vec<String> = vec![after_str];

            if let Some(term) = search {
                param_values.push(term);
                sql.push_str(&format!(
                    " AND subject_identifier LIKE '%' || ?{} || '%'",
                    param_values.len()
                ));
            }

            sql.push_str(" ORDER BY appt_datetime ASC");

            let mut stmt = conn
                .prepare(&sql)
                .map_err(|e| ApplicationError::Storage(e.to_string()))?;

            let params_refs: Vec<&dyn rusqlite::types::ToSql> = param_values
                .iter()
                .map(|s| s as &dyn rusqlite::types::ToSql)
                .collect();

            let appointments: Vec<Appointment> = stmt
                .query_map(params_refs.as_slice(), row_to_appointment)
                .map_err(|e| ApplicationError::Storage(e.to_string()))?
                .filter_map(Result::ok)
                .collect();

            Ok(appointments)
        })
        .await
        .map_err(|e| ApplicationError::Internal(e.to_string()))?
    }
}

/// Convert a database row to an Appointment domain entity
fn row_to_appointment(row: &Row<'_>) -> rusqlite::Result<Appointment> {
    let id_str: String = row.get(0)?;
    let subject_identifier: String = row.get(1)?;
    let visit_code: String = row.get(2)?;
    let schedule_name: String = row.get(3)?;
    let appt_datetime_str: String = row.get(4)?;
    let status_str: String = row.get(5)?;

    Ok(Appointment {
        id: AppointmentId::parse(&id_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e))
        })?,
        subject_identifier,
        visit_code,
        schedule_name,
        appt_datetime: DateTime::parse_from_rfc3339(&appt_datetime_str)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e))
            })?,
        status: str_to_status(&status_str),
    })
}

/// Convert an `AppointmentStatus` to its database string representation
const fn status_to_str(status: AppointmentStatus) -> &'static str {
    match status {
        AppointmentStatus::New => "new",
        AppointmentStatus::InProgress => "in_progress",
        AppointmentStatus::Incomplete => "incomplete",
        AppointmentStatus::Complete => "complete",
        AppointmentStatus::Cancelled => "cancelled",
    }
}

/// Convert a database string to an `AppointmentStatus`
fn str_to_status(s: &str) -> AppointmentStatus {
    match s {
        "in_progress" => AppointmentStatus::InProgress,
        "incomplete" => AppointmentStatus::Incomplete,
        "complete" => AppointmentStatus::Complete,
        "cancelled" => AppointmentStatus::Cancelled,
        _ => AppointmentStatus::New,
    }
}
