use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::{json, Value};

use medibot_core::errors::ToolFailure;

use crate::tools::{Tool, ToolOutcome, ToolReply};

use super::{parse_args, store_failure, ToolContext};

#[derive(Debug, Deserialize)]
struct CancelArgs {
    patientid: String,
    date: String,
}

pub struct CancelAppointmentTool {
    context: ToolContext,
}

impl CancelAppointmentTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for CancelAppointmentTool {
    fn name(&self) -> &'static str {
        "cancel_appointment_tool"
    }

    fn description(&self) -> &'static str {
        "Cancel the patient's pending appointment on a given date. Requires \
         the patient id and the date in YYYY-MM-DD format."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patientid": { "type": "string", "description": "The patient's id." },
                "date": { "type": "string", "description": "Appointment date, YYYY-MM-DD." }
            },
            "required": ["patientid", "date"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutcome {
        let args: CancelArgs = parse_args(arguments)?;
        let context = &self.context;

        let patient = context.resolve_patient(&args.patientid).await?;
        let day = NaiveDate::parse_from_str(args.date.trim(), "%Y-%m-%d")
            .map_err(|_| ToolFailure::validation("Invalid date provided. Use the YYYY-MM-DD format."))?;

        let appointment = context
            .appointments
            .find_pending_on_day(&patient.id, day)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| {
                ToolFailure::not_found(
                    "No active appointment found for this patient on the given date.",
                )
            })?;

        context
            .appointments
            .mark_cancelled(&appointment.id)
            .await
            .map_err(store_failure)?;

        tracing::info!(
            event_name = "agent.tool.cancelled",
            appointment_id = %appointment.id,
            day = %day,
            "appointment cancelled"
        );

        Ok(ToolReply::Text(format!(
            "Appointment with Dr. {} on {} has been canceled successfully.",
            appointment.doctor_name,
            day.format("%Y-%m-%d"),
        )))
    }
}
