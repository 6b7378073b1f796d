use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use medibot_core::domain::appointment::{Appointment, AppointmentId, AppointmentStatus};
use medibot_core::errors::ToolFailure;
use medibot_core::scheduling::{self, BookingRejection};
use medibot_db::repositories::RepositoryError;

use crate::tools::{Tool, ToolOutcome, ToolReply};

use super::{parse_args, store_failure, ToolContext};

#[derive(Debug, Deserialize)]
struct BookArgs {
    patientid: String,
    docname: String,
    #[serde(rename = "docPhoneNo")]
    doc_phone_no: String,
    date: String,
}

pub struct BookAppointmentTool {
    context: ToolContext,
}

impl BookAppointmentTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for BookAppointmentTool {
    fn name(&self) -> &'static str {
        "book_appointment_tool"
    }

    fn description(&self) -> &'static str {
        "Book an appointment with a doctor on a given date. Requires the \
         patient id, the doctor's full name, the doctor's phone number, and \
         the date in YYYY-MM-DD format."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patientid": { "type": "string", "description": "The patient's id." },
                "docname": { "type": "string", "description": "The doctor's full name." },
                "docPhoneNo": { "type": "string", "description": "The doctor's phone number." },
                "date": { "type": "string", "description": "Appointment date, YYYY-MM-DD." }
            },
            "required": ["patientid", "docname", "docPhoneNo", "date"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutcome {
        let args: BookArgs = parse_args(arguments)?;
        let context = &self.context;

        let patient = context.resolve_patient(&args.patientid).await?;
        let doctor = context
            .doctors
            .find_by_name_and_phone(&args.docname, &args.doc_phone_no)
            .await
            .map_err(store_failure)?
            .ok_or_else(|| ToolFailure::not_found("Doctor not found."))?;

        let now = context.clinic_now();
        // The date re-parses inside evaluate; this parse only feeds the
        // store lookup for the day's load.
        let day = chrono::NaiveDate::parse_from_str(args.date.trim(), "%Y-%m-%d")
            .map_err(|_| ToolFailure::from(BookingRejection::InvalidDate))?;
        let load = context
            .appointments
            .day_load(&patient.id, &doctor.id, day)
            .await
            .map_err(store_failure)?;

        let instant = scheduling::evaluate(&doctor, &args.date, now, load)
            .map_err(ToolFailure::from)?;

        let appointment = Appointment {
            id: AppointmentId::new(),
            patient_id: patient.id.clone(),
            patient_name: patient.name.clone(),
            doctor_id: doctor.id.clone(),
            doctor_name: doctor.name.clone(),
            day: instant.date_naive(),
            time: doctor.hours.start,
            status: AppointmentStatus::Pending,
            specialization: doctor.specialization.clone(),
            fee: doctor.fee,
            tax: context.tax,
            created_at: context.clock.now(),
        };

        match context.appointments.create(&appointment, doctor.max_per_day).await {
            Ok(()) => {}
            // Another booking landed between the load check and the insert.
            Err(RepositoryError::Conflict(_)) => {
                return Err(ToolFailure::from(BookingRejection::DuplicateBooking));
            }
            Err(RepositoryError::CapacityExceeded) => {
                return Err(ToolFailure::from(BookingRejection::CapacityReached));
            }
            Err(error) => return Err(store_failure(error)),
        }

        tracing::info!(
            event_name = "agent.tool.booked",
            appointment_id = %appointment.id,
            doctor = %doctor.name,
            day = %appointment.day,
            "appointment created"
        );

        Ok(ToolReply::Text(format!(
            "Appointment booked successfully with Dr. {} on {} at {}.",
            doctor.name,
            appointment.day.format("%Y-%m-%d"),
            appointment.time.format("%H:%M"),
        )))
    }
}
