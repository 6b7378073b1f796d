//! Tool-boundary failure taxonomy.
//!
//! Every tool operation converts whatever went wrong into a [`ToolFailure`]
//! before the result crosses back to the dispatcher, so the model only ever
//! sees an observation string, never a propagated error.

use thiserror::Error;

use crate::scheduling::BookingRejection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailureKind {
    /// Patient, doctor, or appointment could not be resolved.
    NotFound,
    /// Input failed a format or scheduling rule check.
    Validation,
    /// Uniqueness violated: email/phone in use, or a duplicate booking.
    Conflict,
    /// Store or network failure surfaced to the user as a retry hint.
    Unexpected,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("{detail}")]
pub struct ToolFailure {
    pub kind: FailureKind,
    pub detail: String,
}

impl ToolFailure {
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self { kind: FailureKind::NotFound, detail: detail.into() }
    }

    pub fn validation(detail: impl Into<String>) -> Self {
        Self { kind: FailureKind::Validation, detail: detail.into() }
    }

    pub fn conflict(detail: impl Into<String>) -> Self {
        Self { kind: FailureKind::Conflict, detail: detail.into() }
    }

    pub fn unexpected(detail: impl Into<String>) -> Self {
        Self { kind: FailureKind::Unexpected, detail: detail.into() }
    }
}

impl From<BookingRejection> for ToolFailure {
    fn from(rejection: BookingRejection) -> Self {
        let kind = match rejection {
            BookingRejection::DuplicateBooking => FailureKind::Conflict,
            _ => FailureKind::Validation,
        };
        Self { kind, detail: rejection.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use crate::scheduling::BookingRejection;

    use super::{FailureKind, ToolFailure};

    #[test]
    fn duplicate_booking_maps_to_conflict() {
        let failure = ToolFailure::from(BookingRejection::DuplicateBooking);
        assert_eq!(failure.kind, FailureKind::Conflict);
    }

    #[test]
    fn scheduling_rules_map_to_validation() {
        let failure = ToolFailure::from(BookingRejection::OutsideWindow);
        assert_eq!(failure.kind, FailureKind::Validation);
        assert!(failure.detail.contains("next 7 days"));
    }

    #[test]
    fn detail_is_the_display_form() {
        let failure = ToolFailure::not_found("Patient not found.");
        assert_eq!(failure.to_string(), "Patient not found.");
    }
}
