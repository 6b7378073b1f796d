use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use medibot_core::domain::appointment::{Appointment, AppointmentId};
use medibot_core::domain::doctor::{Doctor, DoctorId};
use medibot_core::domain::patient::{Patient, PatientId};
use medibot_core::scheduling::DayLoad;

pub mod appointment;
pub mod doctor;
pub mod memory;
pub mod patient;

pub use appointment::SqlAppointmentRepository;
pub use doctor::SqlDoctorRepository;
pub use memory::{InMemoryAppointmentRepository, InMemoryDoctorRepository, InMemoryPatientRepository};
pub use patient::SqlPatientRepository;

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("decode error: {0}")]
    Decode(String),
    /// A unique constraint was violated; the field names which one.
    #[error("value already in use: {0}")]
    Conflict(&'static str),
    /// Transactional capacity re-check failed at insert time.
    #[error("doctor's schedule is full for that day")]
    CapacityExceeded,
}

#[async_trait]
pub trait PatientRepository: Send + Sync {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError>;
    async fn update_name(&self, id: &PatientId, name: &str) -> Result<(), RepositoryError>;
    async fn update_email(&self, id: &PatientId, email: &str) -> Result<(), RepositoryError>;
    async fn update_phone(&self, id: &PatientId, phone: &str) -> Result<(), RepositoryError>;
}

#[async_trait]
pub trait DoctorRepository: Send + Sync {
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, RepositoryError>;
    async fn find_by_name_and_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<Doctor>, RepositoryError>;
}

#[async_trait]
pub trait AppointmentRepository: Send + Sync {
    /// Duplicate/capacity facts the scheduling validator needs for a
    /// proposed (patient, doctor, day) tuple.
    async fn day_load(
        &self,
        patient_id: &PatientId,
        doctor_id: &DoctorId,
        day: NaiveDate,
    ) -> Result<DayLoad, RepositoryError>;

    /// Insert the appointment, re-checking capacity inside the same
    /// transaction. The partial unique index backstops the duplicate rule.
    async fn create(
        &self,
        appointment: &Appointment,
        max_per_day: u32,
    ) -> Result<(), RepositoryError>;

    async fn find_pending_on_day(
        &self,
        patient_id: &PatientId,
        day: NaiveDate,
    ) -> Result<Option<Appointment>, RepositoryError>;

    async fn mark_cancelled(&self, id: &AppointmentId) -> Result<(), RepositoryError>;

    /// All appointments for the patient, any status, ascending by day.
    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<Appointment>, RepositoryError>;
}

pub(crate) fn conflict_from_unique(error: sqlx::Error, field: &'static str) -> RepositoryError {
    match &error {
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict(field),
        _ => RepositoryError::Database(error),
    }
}
