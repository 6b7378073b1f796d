use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use medibot_core::domain::appointment::{Appointment, AppointmentId, AppointmentStatus};
use medibot_core::domain::doctor::DoctorId;
use medibot_core::domain::patient::PatientId;
use medibot_core::scheduling::DayLoad;

use super::{conflict_from_unique, AppointmentRepository, RepositoryError};
use crate::DbPool;

pub struct SqlAppointmentRepository {
    pool: DbPool,
}

impl SqlAppointmentRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

const SELECT_COLUMNS: &str = "SELECT id, patient_id, patient_name, doctor_id, doctor_name, \
     day, time, status, specialization, fee, tax, created_at FROM appointment";

#[async_trait::async_trait]
impl AppointmentRepository for SqlAppointmentRepository {
    async fn day_load(
        &self,
        patient_id: &PatientId,
        doctor_id: &DoctorId,
        day: NaiveDate,
    ) -> Result<DayLoad, RepositoryError> {
        let day_text = day.format("%Y-%m-%d").to_string();

        let duplicate_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointment \
             WHERE patient_id = ? AND doctor_id = ? AND day = ? AND status = 'Pending'",
        )
        .bind(patient_id.0.to_string())
        .bind(doctor_id.0.to_string())
        .bind(&day_text)
        .fetch_one(&self.pool)
        .await?;

        let booked_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointment \
             WHERE doctor_id = ? AND day = ? AND status = 'Pending'",
        )
        .bind(doctor_id.0.to_string())
        .bind(&day_text)
        .fetch_one(&self.pool)
        .await?;

        Ok(DayLoad {
            pending_duplicate: duplicate_count > 0,
            booked_count: booked_count.max(0) as u32,
        })
    }

    async fn create(
        &self,
        appointment: &Appointment,
        max_per_day: u32,
    ) -> Result<(), RepositoryError> {
        let day_text = appointment.day.format("%Y-%m-%d").to_string();
        let mut tx = self.pool.begin().await?;

        // Only live bookings consume the doctor's daily capacity.
        let booked_count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM appointment \
             WHERE doctor_id = ? AND day = ? AND status = 'Pending'",
        )
        .bind(appointment.doctor_id.0.to_string())
        .bind(&day_text)
        .fetch_one(&mut *tx)
        .await?;

        if booked_count >= i64::from(max_per_day) {
            return Err(RepositoryError::CapacityExceeded);
        }

        sqlx::query(
            "INSERT INTO appointment (id, patient_id, patient_name, doctor_id, doctor_name, \
             day, time, status, specialization, fee, tax, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(appointment.id.0.to_string())
        .bind(appointment.patient_id.0.to_string())
        .bind(&appointment.patient_name)
        .bind(appointment.doctor_id.0.to_string())
        .bind(&appointment.doctor_name)
        .bind(&day_text)
        .bind(appointment.time.format("%H:%M").to_string())
        .bind(appointment.status.as_str())
        .bind(&appointment.specialization)
        .bind(appointment.fee.to_string())
        .bind(appointment.tax.to_string())
        .bind(appointment.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(|error| conflict_from_unique(error, "appointment"))?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_pending_on_day(
        &self,
        patient_id: &PatientId,
        day: NaiveDate,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let row = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE patient_id = ? AND day = ? AND status = 'Pending'"
        ))
        .bind(patient_id.0.to_string())
        .bind(day.format("%Y-%m-%d").to_string())
        .fetch_optional(&self.pool)
        .await?;

        row.map(appointment_from_row).transpose()
    }

    async fn mark_cancelled(&self, id: &AppointmentId) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE appointment SET status = 'Cancel' WHERE id = ?")
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let rows = sqlx::query(&format!(
            "{SELECT_COLUMNS} WHERE patient_id = ? ORDER BY day ASC, time ASC"
        ))
        .bind(patient_id.0.to_string())
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(appointment_from_row).collect()
    }
}

fn appointment_from_row(row: SqliteRow) -> Result<Appointment, RepositoryError> {
    let id = parse_uuid(&row.get::<String, _>("id"), "appointment.id").map(AppointmentId)?;
    let patient_id =
        parse_uuid(&row.get::<String, _>("patient_id"), "appointment.patient_id").map(PatientId)?;
    let doctor_id =
        parse_uuid(&row.get::<String, _>("doctor_id"), "appointment.doctor_id").map(DoctorId)?;
    let day = NaiveDate::parse_from_str(&row.get::<String, _>("day"), "%Y-%m-%d")
        .map_err(|error| RepositoryError::Decode(format!("appointment.day: {error}")))?;
    let time = NaiveTime::parse_from_str(&row.get::<String, _>("time"), "%H:%M")
        .map_err(|error| RepositoryError::Decode(format!("appointment.time: {error}")))?;
    let status_text = row.get::<String, _>("status");
    let status = AppointmentStatus::parse(&status_text).ok_or_else(|| {
        RepositoryError::Decode(format!("appointment.status: `{status_text}`"))
    })?;
    let fee = row
        .get::<String, _>("fee")
        .parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("appointment.fee: {error}")))?;
    let tax = row
        .get::<String, _>("tax")
        .parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("appointment.tax: {error}")))?;
    let created_at = row
        .get::<String, _>("created_at")
        .parse::<DateTime<Utc>>()
        .map_err(|error| RepositoryError::Decode(format!("appointment.created_at: {error}")))?;

    Ok(Appointment {
        id,
        patient_id,
        patient_name: row.get("patient_name"),
        doctor_id,
        doctor_name: row.get("doctor_name"),
        day,
        time,
        status,
        specialization: row.get("specialization"),
        fee,
        tax,
        created_at,
    })
}

fn parse_uuid(value: &str, field: &str) -> Result<Uuid, RepositoryError> {
    value
        .parse::<Uuid>()
        .map_err(|_| RepositoryError::Decode(format!("{field} is not a uuid")))
}
