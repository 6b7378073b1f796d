//! In-memory repository doubles for tests and offline tooling.

use std::collections::HashMap;

use chrono::NaiveDate;
use tokio::sync::RwLock;

use medibot_core::domain::appointment::{Appointment, AppointmentId, AppointmentStatus};
use medibot_core::domain::doctor::{Doctor, DoctorId};
use medibot_core::domain::patient::{Patient, PatientId};
use medibot_core::scheduling::DayLoad;

use super::{
    AppointmentRepository, DoctorRepository, PatientRepository, RepositoryError,
};

#[derive(Default)]
pub struct InMemoryPatientRepository {
    patients: RwLock<HashMap<PatientId, Patient>>,
}

impl InMemoryPatientRepository {
    pub async fn insert(&self, patient: Patient) {
        self.patients.write().await.insert(patient.id.clone(), patient);
    }
}

#[async_trait::async_trait]
impl PatientRepository for InMemoryPatientRepository {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError> {
        Ok(self.patients.read().await.get(id).cloned())
    }

    async fn update_name(&self, id: &PatientId, name: &str) -> Result<(), RepositoryError> {
        if let Some(patient) = self.patients.write().await.get_mut(id) {
            patient.name = name.to_string();
        }
        Ok(())
    }

    async fn update_email(&self, id: &PatientId, email: &str) -> Result<(), RepositoryError> {
        let mut patients = self.patients.write().await;
        let taken = patients.values().any(|other| other.id != *id && other.email == email);
        if taken {
            return Err(RepositoryError::Conflict("email"));
        }
        if let Some(patient) = patients.get_mut(id) {
            patient.email = email.to_string();
        }
        Ok(())
    }

    async fn update_phone(&self, id: &PatientId, phone: &str) -> Result<(), RepositoryError> {
        let mut patients = self.patients.write().await;
        let taken = patients.values().any(|other| other.id != *id && other.phone == phone);
        if taken {
            return Err(RepositoryError::Conflict("phone"));
        }
        if let Some(patient) = patients.get_mut(id) {
            patient.phone = phone.to_string();
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryDoctorRepository {
    doctors: RwLock<HashMap<DoctorId, Doctor>>,
}

impl InMemoryDoctorRepository {
    pub async fn insert(&self, doctor: Doctor) {
        self.doctors.write().await.insert(doctor.id.clone(), doctor);
    }
}

#[async_trait::async_trait]
impl DoctorRepository for InMemoryDoctorRepository {
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, RepositoryError> {
        Ok(self.doctors.read().await.get(id).cloned())
    }

    async fn find_by_name_and_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<Doctor>, RepositoryError> {
        let doctors = self.doctors.read().await;
        Ok(doctors
            .values()
            .find(|doctor| doctor.name == name.trim() && doctor.phone == phone.trim())
            .cloned())
    }
}

#[derive(Default)]
pub struct InMemoryAppointmentRepository {
    appointments: RwLock<HashMap<AppointmentId, Appointment>>,
}

#[async_trait::async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn day_load(
        &self,
        patient_id: &PatientId,
        doctor_id: &DoctorId,
        day: NaiveDate,
    ) -> Result<DayLoad, RepositoryError> {
        let appointments = self.appointments.read().await;
        let pending_duplicate = appointments.values().any(|appt| {
            appt.patient_id == *patient_id
                && appt.doctor_id == *doctor_id
                && appt.day == day
                && appt.status == AppointmentStatus::Pending
        });
        let booked_count = appointments
            .values()
            .filter(|appt| {
                appt.doctor_id == *doctor_id
                    && appt.day == day
                    && appt.status == AppointmentStatus::Pending
            })
            .count() as u32;
        Ok(DayLoad { pending_duplicate, booked_count })
    }

    async fn create(
        &self,
        appointment: &Appointment,
        max_per_day: u32,
    ) -> Result<(), RepositoryError> {
        let mut appointments = self.appointments.write().await;
        let duplicate = appointments.values().any(|appt| {
            appt.patient_id == appointment.patient_id
                && appt.doctor_id == appointment.doctor_id
                && appt.day == appointment.day
                && appt.status == AppointmentStatus::Pending
        });
        if duplicate {
            return Err(RepositoryError::Conflict("appointment"));
        }
        let booked = appointments
            .values()
            .filter(|appt| {
                appt.doctor_id == appointment.doctor_id
                    && appt.day == appointment.day
                    && appt.status == AppointmentStatus::Pending
            })
            .count() as u32;
        if booked >= max_per_day {
            return Err(RepositoryError::CapacityExceeded);
        }
        appointments.insert(appointment.id.clone(), appointment.clone());
        Ok(())
    }

    async fn find_pending_on_day(
        &self,
        patient_id: &PatientId,
        day: NaiveDate,
    ) -> Result<Option<Appointment>, RepositoryError> {
        let appointments = self.appointments.read().await;
        Ok(appointments
            .values()
            .find(|appt| {
                appt.patient_id == *patient_id
                    && appt.day == day
                    && appt.status == AppointmentStatus::Pending
            })
            .cloned())
    }

    async fn mark_cancelled(&self, id: &AppointmentId) -> Result<(), RepositoryError> {
        if let Some(appointment) = self.appointments.write().await.get_mut(id) {
            appointment.status = AppointmentStatus::Cancel;
        }
        Ok(())
    }

    async fn list_for_patient(
        &self,
        patient_id: &PatientId,
    ) -> Result<Vec<Appointment>, RepositoryError> {
        let appointments = self.appointments.read().await;
        let mut listed: Vec<Appointment> = appointments
            .values()
            .filter(|appt| appt.patient_id == *patient_id)
            .cloned()
            .collect();
        listed.sort_by_key(|appt| (appt.day, appt.time));
        Ok(listed)
    }
}
