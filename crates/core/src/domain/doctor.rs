use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DoctorId(pub Uuid);

impl DoctorId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DoctorId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for DoctorId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Daily consulting window. Appointments are always stamped with `start`;
/// patients do not choose a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailableHours {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: DoctorId,
    pub name: String,
    pub phone: String,
    pub specialization: String,
    pub fee: Decimal,
    /// Weekdays on which the doctor consults.
    pub availability: Vec<Weekday>,
    pub hours: AvailableHours,
    pub max_per_day: u32,
    /// Days the doctor has called off; unbookable regardless of weekday.
    pub cancellations: Vec<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Doctor {
    pub fn consults_on(&self, weekday: Weekday) -> bool {
        self.availability.contains(&weekday)
    }

    pub fn is_cancelled_on(&self, day: NaiveDate) -> bool {
        self.cancellations.contains(&day)
    }

    /// "Monday, Wednesday, Friday" style listing for rejection messages.
    pub fn availability_names(&self) -> String {
        self.availability.iter().map(weekday_name).collect::<Vec<_>>().join(", ")
    }
}

pub fn weekday_name(weekday: &Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "Monday",
        Weekday::Tue => "Tuesday",
        Weekday::Wed => "Wednesday",
        Weekday::Thu => "Thursday",
        Weekday::Fri => "Friday",
        Weekday::Sat => "Saturday",
        Weekday::Sun => "Sunday",
    }
}

pub fn weekday_from_name(name: &str) -> Option<Weekday> {
    match name.trim().to_ascii_lowercase().as_str() {
        "monday" => Some(Weekday::Mon),
        "tuesday" => Some(Weekday::Tue),
        "wednesday" => Some(Weekday::Wed),
        "thursday" => Some(Weekday::Thu),
        "friday" => Some(Weekday::Fri),
        "saturday" => Some(Weekday::Sat),
        "sunday" => Some(Weekday::Sun),
        _ => None,
    }
}
