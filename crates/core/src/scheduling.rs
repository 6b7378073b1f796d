//! Booking rule evaluation.
//!
//! `evaluate` applies the clinic's seven scheduling rules in a fixed order,
//! short-circuiting on the first failure. The order is part of the contract:
//! callers and tests rely on which rejection a given request produces.
//!
//! Rules four and five (duplicate, capacity) need store lookups; the caller
//! fetches those into a [`DayLoad`] before calling so the rule sequence
//! itself stays pure and deterministic.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone};
use thiserror::Error;

use crate::domain::doctor::{weekday_name, Doctor};

/// Bookings may target today through today+6, inclusive.
pub const BOOKING_WINDOW_DAYS: i64 = 6;

/// Minimum gap between "now" and the appointment instant.
pub const LEAD_TIME_HOURS: i64 = 3;

/// Store-derived facts about the proposed (patient, doctor, day) tuple.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DayLoad {
    /// A Pending appointment already exists for this patient/doctor/day.
    pub pending_duplicate: bool,
    /// Appointments already scheduled for this doctor/day, any status.
    pub booked_count: u32,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BookingRejection {
    #[error("Invalid date provided. Use the YYYY-MM-DD format.")]
    InvalidDate,
    #[error("You can only book appointments within the next 7 days.")]
    OutsideWindow,
    #[error("Doctor is not available on {weekday}. Available days: {available}.")]
    DoctorUnavailable { weekday: &'static str, available: String },
    #[error("You already have an appointment with this doctor on the same date.")]
    DuplicateBooking,
    #[error("Doctor has already reached the maximum number of appointments for this day.")]
    CapacityReached,
    #[error("Appointments must be booked at least 3 hours in advance.")]
    InsufficientLeadTime,
    #[error("Doctor is not available on the selected day.")]
    DoctorDayCancelled,
}

/// Decide whether an appointment may be created.
///
/// `now` must already be expressed in the clinic's fixed offset; the
/// proposed instant is built in the same offset from the doctor's start
/// time. On success, returns that instant.
pub fn evaluate(
    doctor: &Doctor,
    raw_date: &str,
    now: DateTime<FixedOffset>,
    load: DayLoad,
) -> Result<DateTime<FixedOffset>, BookingRejection> {
    let day = parse_day(raw_date).ok_or(BookingRejection::InvalidDate)?;
    let proposed = now
        .offset()
        .from_local_datetime(&day.and_time(doctor.hours.start))
        .single()
        .ok_or(BookingRejection::InvalidDate)?;

    let today = now.date_naive();
    let last_allowed = today + Duration::days(BOOKING_WINDOW_DAYS);
    if day < today || day > last_allowed {
        return Err(BookingRejection::OutsideWindow);
    }

    let weekday = day.weekday();
    if !doctor.consults_on(weekday) {
        return Err(BookingRejection::DoctorUnavailable {
            weekday: weekday_name(&weekday),
            available: doctor.availability_names(),
        });
    }

    if load.pending_duplicate {
        return Err(BookingRejection::DuplicateBooking);
    }

    if load.booked_count >= doctor.max_per_day {
        return Err(BookingRejection::CapacityReached);
    }

    if proposed - now < Duration::hours(LEAD_TIME_HOURS) {
        return Err(BookingRejection::InsufficientLeadTime);
    }

    if doctor.is_cancelled_on(day) {
        return Err(BookingRejection::DoctorDayCancelled);
    }

    Ok(proposed)
}

fn parse_day(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
    use rust_decimal::Decimal;

    use crate::domain::doctor::{AvailableHours, Doctor, DoctorId};

    use super::{evaluate, BookingRejection, DayLoad};

    const KOLKATA_OFFSET_SECS: i32 = 330 * 60;

    fn clinic_offset() -> FixedOffset {
        FixedOffset::east_opt(KOLKATA_OFFSET_SECS).unwrap()
    }

    fn doctor_fixture() -> Doctor {
        Doctor {
            id: DoctorId::new(),
            name: "Asha Rao".to_string(),
            phone: "9876543210".to_string(),
            specialization: "Cardiology".to_string(),
            fee: Decimal::new(50_000, 2),
            availability: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
            hours: AvailableHours {
                start: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
                end: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
            },
            max_per_day: 2,
            cancellations: Vec::new(),
            created_at: Utc::now(),
        }
    }

    // Wednesday 2025-06-04, 06:00 clinic time (start of day, lead time ok
    // for any same-week 10:00 slot).
    fn wednesday_morning() -> DateTime<FixedOffset> {
        clinic_offset().with_ymd_and_hms(2025, 6, 4, 6, 0, 0).unwrap()
    }

    #[test]
    fn malformed_date_is_rejected_first() {
        let rejection =
            evaluate(&doctor_fixture(), "next tuesday", wednesday_morning(), DayLoad::default())
                .unwrap_err();
        assert_eq!(rejection, BookingRejection::InvalidDate);
    }

    #[test]
    fn past_day_is_outside_window() {
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-03", wednesday_morning(), DayLoad::default())
                .unwrap_err();
        assert_eq!(rejection, BookingRejection::OutsideWindow);
    }

    #[test]
    fn seventh_day_out_is_outside_window() {
        // today+7 = 2025-06-11, one past the inclusive edge.
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-11", wednesday_morning(), DayLoad::default())
                .unwrap_err();
        assert_eq!(rejection, BookingRejection::OutsideWindow);
    }

    #[test]
    fn window_edge_day_is_accepted() {
        // today+6 = Tuesday 2025-06-10, within availability.
        let accepted =
            evaluate(&doctor_fixture(), "2025-06-10", wednesday_morning(), DayLoad::default())
                .unwrap();
        assert_eq!(accepted.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
        assert_eq!(accepted.time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn off_day_weekday_is_rejected_with_roster() {
        // Saturday 2025-06-07 inside the window.
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-07", wednesday_morning(), DayLoad::default())
                .unwrap_err();
        match rejection {
            BookingRejection::DoctorUnavailable { weekday, available } => {
                assert_eq!(weekday, "Saturday");
                assert!(available.contains("Monday"));
                assert!(available.contains("Friday"));
            }
            other => panic!("expected weekday rejection, got {other:?}"),
        }
    }

    #[test]
    fn weekday_rejection_outranks_duplicate_and_capacity() {
        let load = DayLoad { pending_duplicate: true, booked_count: 99 };
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-07", wednesday_morning(), load).unwrap_err();
        assert!(matches!(rejection, BookingRejection::DoctorUnavailable { .. }));
    }

    #[test]
    fn existing_pending_booking_is_a_duplicate() {
        let load = DayLoad { pending_duplicate: true, booked_count: 0 };
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-05", wednesday_morning(), load).unwrap_err();
        assert_eq!(rejection, BookingRejection::DuplicateBooking);
    }

    #[test]
    fn duplicate_wins_over_capacity_when_both_hold() {
        let load = DayLoad { pending_duplicate: true, booked_count: 2 };
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-05", wednesday_morning(), load).unwrap_err();
        assert_eq!(rejection, BookingRejection::DuplicateBooking);
    }

    #[test]
    fn full_day_is_rejected_at_capacity() {
        let load = DayLoad { pending_duplicate: false, booked_count: 2 };
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-05", wednesday_morning(), load).unwrap_err();
        assert_eq!(rejection, BookingRejection::CapacityReached);
    }

    #[test]
    fn last_free_slot_is_accepted() {
        let load = DayLoad { pending_duplicate: false, booked_count: 1 };
        let accepted = evaluate(&doctor_fixture(), "2025-06-05", wednesday_morning(), load).unwrap();
        assert_eq!(accepted.time(), doctor_fixture().hours.start);
    }

    #[test]
    fn lead_time_boundary_is_inclusive_at_three_hours() {
        let doctor = doctor_fixture();
        // Appointment instant is today 10:00; exactly three hours ahead.
        let now = clinic_offset().with_ymd_and_hms(2025, 6, 4, 7, 0, 0).unwrap();
        let accepted = evaluate(&doctor, "2025-06-04", now, DayLoad::default()).unwrap();
        assert_eq!(accepted - now, Duration::hours(3));
    }

    #[test]
    fn under_three_hours_is_too_late() {
        let now = clinic_offset().with_ymd_and_hms(2025, 6, 4, 7, 0, 1).unwrap();
        let rejection =
            evaluate(&doctor_fixture(), "2025-06-04", now, DayLoad::default()).unwrap_err();
        assert_eq!(rejection, BookingRejection::InsufficientLeadTime);
    }

    #[test]
    fn blackout_day_is_rejected_last() {
        let mut doctor = doctor_fixture();
        doctor.cancellations.push(NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
        let rejection =
            evaluate(&doctor, "2025-06-05", wednesday_morning(), DayLoad::default()).unwrap_err();
        assert_eq!(rejection, BookingRejection::DoctorDayCancelled);
    }

    #[test]
    fn capacity_rejection_outranks_blackout() {
        let mut doctor = doctor_fixture();
        doctor.cancellations.push(NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
        let load = DayLoad { pending_duplicate: false, booked_count: 2 };
        let rejection = evaluate(&doctor, "2025-06-05", wednesday_morning(), load).unwrap_err();
        assert_eq!(rejection, BookingRejection::CapacityReached);
    }

    #[test]
    fn accepted_booking_carries_doctor_start_time() {
        // Mon-Fri doctor, max 2/day, today Wednesday: Thursday with one
        // existing appointment and 4+ hours of lead time.
        let doctor = doctor_fixture();
        let now = clinic_offset().with_ymd_and_hms(2025, 6, 4, 12, 0, 0).unwrap();
        let load = DayLoad { pending_duplicate: false, booked_count: 1 };
        let accepted = evaluate(&doctor, "2025-06-05", now, load).unwrap();
        assert_eq!(accepted.date_naive(), NaiveDate::from_ymd_opt(2025, 6, 5).unwrap());
        assert_eq!(accepted.time(), doctor.hours.start);
        assert_eq!(accepted.offset().local_minus_utc(), KOLKATA_OFFSET_SECS);
    }

    #[test]
    fn distinct_rejections_render_distinct_messages() {
        let weekday = BookingRejection::DoctorUnavailable {
            weekday: "Saturday",
            available: "Monday, Friday".to_string(),
        };
        let messages = [
            BookingRejection::InvalidDate.to_string(),
            BookingRejection::OutsideWindow.to_string(),
            weekday.to_string(),
            BookingRejection::DuplicateBooking.to_string(),
            BookingRejection::CapacityReached.to_string(),
            BookingRejection::InsufficientLeadTime.to_string(),
            BookingRejection::DoctorDayCancelled.to_string(),
        ];
        for (i, a) in messages.iter().enumerate() {
            for b in messages.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
