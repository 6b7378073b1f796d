//! Read-only listings: a patient's appointments and reports.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use medibot_core::errors::ToolFailure;

use crate::tools::{Tool, ToolOutcome, ToolReply};

use super::{parse_args, store_failure, ToolContext};

#[derive(Debug, Deserialize)]
struct PatientArgs {
    patientid: String,
}

pub struct ViewPatientAppointmentsTool {
    context: ToolContext,
}

impl ViewPatientAppointmentsTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for ViewPatientAppointmentsTool {
    fn name(&self) -> &'static str {
        "view_patient_appointments"
    }

    fn description(&self) -> &'static str {
        "List all of the patient's appointments, including cancelled ones. \
         Requires the patient id."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patientid": { "type": "string", "description": "The patient's id." }
            },
            "required": ["patientid"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutcome {
        let args: PatientArgs = parse_args(arguments)?;
        let patient = self.context.resolve_patient(&args.patientid).await?;

        let appointments = self
            .context
            .appointments
            .list_for_patient(&patient.id)
            .await
            .map_err(store_failure)?;

        if appointments.is_empty() {
            return Err(ToolFailure::not_found("No appointments found for this patient."));
        }

        let listed: Vec<Value> = appointments
            .iter()
            .map(|appointment| {
                json!({
                    "doctor": appointment.doctor_name,
                    "date": appointment.day.format("%Y-%m-%d").to_string(),
                    "time": appointment.time.format("%H:%M").to_string(),
                    "status": appointment.status.as_str(),
                    "specialization": appointment.specialization,
                    "fees": appointment.fee.to_string(),
                })
            })
            .collect();

        Ok(ToolReply::Structured(Value::Array(listed)))
    }
}

pub struct ViewPatientReportsTool {
    context: ToolContext,
}

impl ViewPatientReportsTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for ViewPatientReportsTool {
    fn name(&self) -> &'static str {
        "view_patient_reports"
    }

    fn description(&self) -> &'static str {
        "List the patient's stored medical reports with their links. \
         Requires the patient id."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patientid": { "type": "string", "description": "The patient's id." }
            },
            "required": ["patientid"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutcome {
        let args: PatientArgs = parse_args(arguments)?;
        let patient = self.context.resolve_patient(&args.patientid).await?;

        if patient.reports.is_empty() {
            return Err(ToolFailure::not_found("No reports found for this patient."));
        }

        let listed: Vec<Value> = patient
            .reports
            .iter()
            .enumerate()
            .map(|(index, report)| {
                let number = index + 1;
                json!({
                    "reportNo": number,
                    "name": report
                        .name
                        .clone()
                        .unwrap_or_else(|| format!("Report {number}")),
                    "link": report.link.clone().unwrap_or_else(|| "#".to_string()),
                })
            })
            .collect();

        Ok(ToolReply::Structured(Value::Array(listed)))
    }
}
