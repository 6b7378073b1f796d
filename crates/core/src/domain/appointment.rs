use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::doctor::DoctorId;
use super::patient::PatientId;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AppointmentId(pub Uuid);

impl AppointmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle is Pending -> Cancel and nothing else. A cancelled slot can be
/// re-booked on a different (or the same) day; there is no Completed state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Pending,
    Cancel,
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Cancel => "Cancel",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(Self::Pending),
            "Cancel" => Some(Self::Cancel),
            _ => None,
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Names, specialization, and fee are denormalized from the patient and
/// doctor records at creation time; later profile edits do not rewrite
/// existing rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: AppointmentId,
    pub patient_id: PatientId,
    pub patient_name: String,
    pub doctor_id: DoctorId,
    pub doctor_name: String,
    pub day: NaiveDate,
    /// Always the doctor's configured start time.
    pub time: NaiveTime,
    pub status: AppointmentStatus,
    pub specialization: String,
    pub fee: Decimal,
    pub tax: Decimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::AppointmentStatus;

    #[test]
    fn status_round_trips_through_storage_text() {
        assert_eq!(AppointmentStatus::parse("Pending"), Some(AppointmentStatus::Pending));
        assert_eq!(AppointmentStatus::parse("Cancel"), Some(AppointmentStatus::Cancel));
        assert_eq!(AppointmentStatus::parse("Completed"), None);
        assert_eq!(AppointmentStatus::Pending.as_str(), "Pending");
    }
}
