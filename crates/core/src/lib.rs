//! MediBot core - domain model and booking rules
//!
//! This crate holds everything the rest of the system treats as ground
//! truth:
//! - Typed records for patients, doctors, and appointments (`domain`)
//! - The seven-rule scheduling validator (`scheduling`)
//! - The tagged tool-failure taxonomy (`errors`)
//! - Configuration loading and validation (`config`)
//!
//! # Safety Principle
//!
//! The language model never decides whether a booking is allowed. Every
//! scheduling decision is made deterministically here, and the model only
//! relays the outcome.

pub mod config;
pub mod domain;
pub mod errors;
pub mod scheduling;

pub use domain::appointment::{Appointment, AppointmentId, AppointmentStatus};
pub use domain::doctor::{AvailableHours, Doctor, DoctorId};
pub use domain::patient::{Patient, PatientId, Report};
pub use errors::{FailureKind, ToolFailure};
pub use scheduling::{BookingRejection, DayLoad};
