//! The clinic's tool set: booking, cancellation, contact updates, listings.
//!
//! Each tool owns its argument shape (field names match what the model is
//! prompted with) and renders user-facing sentences; rule decisions live in
//! `medibot_core::scheduling` and the repositories.

mod book;
mod cancel;
mod listing;
mod patient;

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;

use medibot_core::domain::patient::{Patient, PatientId};
use medibot_core::errors::ToolFailure;
use medibot_db::repositories::{
    AppointmentRepository, DoctorRepository, PatientRepository, RepositoryError,
};

use crate::tools::ToolRegistry;

pub use book::BookAppointmentTool;
pub use cancel::CancelAppointmentTool;
pub use listing::{ViewPatientAppointmentsTool, ViewPatientReportsTool};
pub use patient::{UpdatePatientEmailTool, UpdatePatientNameTool, UpdatePatientPhoneTool};

/// Time source seam so scheduling tests can pin "now".
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Everything a tool needs: the stores, the clinic's offset and tax, and a
/// clock.
#[derive(Clone)]
pub struct ToolContext {
    pub patients: Arc<dyn PatientRepository>,
    pub doctors: Arc<dyn DoctorRepository>,
    pub appointments: Arc<dyn AppointmentRepository>,
    pub clinic_offset: FixedOffset,
    pub tax: Decimal,
    pub clock: Arc<dyn Clock>,
}

impl ToolContext {
    pub fn clinic_now(&self) -> DateTime<FixedOffset> {
        self.clock.now().with_timezone(&self.clinic_offset)
    }

    /// Resolve a patient from a raw `patientid` argument. A malformed id is
    /// indistinguishable from a missing record on purpose.
    pub(crate) async fn resolve_patient(&self, raw_id: &str) -> Result<Patient, ToolFailure> {
        let id = PatientId::parse(raw_id)
            .ok_or_else(|| ToolFailure::not_found("Patient not found."))?;
        self.patients
            .find_by_id(&id)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| ToolFailure::not_found("Patient not found."))
    }
}

pub fn register_all(registry: &mut ToolRegistry, context: ToolContext) {
    registry.register(Box::new(BookAppointmentTool::new(context.clone())));
    registry.register(Box::new(CancelAppointmentTool::new(context.clone())));
    registry.register(Box::new(UpdatePatientNameTool::new(context.clone())));
    registry.register(Box::new(UpdatePatientEmailTool::new(context.clone())));
    registry.register(Box::new(UpdatePatientPhoneTool::new(context.clone())));
    registry.register(Box::new(ViewPatientAppointmentsTool::new(context.clone())));
    registry.register(Box::new(ViewPatientReportsTool::new(context)));
}

pub(crate) fn parse_args<T: DeserializeOwned>(arguments: Value) -> Result<T, ToolFailure> {
    serde_json::from_value(arguments)
        .map_err(|_| ToolFailure::validation("Missing or invalid arguments for this request."))
}

pub(crate) fn store_failure(error: RepositoryError) -> ToolFailure {
    tracing::error!(event_name = "agent.tool.store_error", error = %error, "store operation failed");
    ToolFailure::unexpected("Something went wrong. Please try again later.")
}
