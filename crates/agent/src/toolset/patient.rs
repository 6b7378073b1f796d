//! Patient contact detail updates.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use medibot_core::domain::patient::is_valid_phone;
use medibot_core::errors::ToolFailure;
use medibot_db::repositories::RepositoryError;

use crate::tools::{Tool, ToolOutcome, ToolReply};

use super::{parse_args, store_failure, ToolContext};

#[derive(Debug, Deserialize)]
struct UpdateNameArgs {
    patientid: String,
    #[serde(rename = "newName")]
    new_name: String,
}

pub struct UpdatePatientNameTool {
    context: ToolContext,
}

impl UpdatePatientNameTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for UpdatePatientNameTool {
    fn name(&self) -> &'static str {
        "update_patient_name"
    }

    fn description(&self) -> &'static str {
        "Update the patient's name. Requires the patient id and the new name."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patientid": { "type": "string", "description": "The patient's id." },
                "newName": { "type": "string", "description": "The new full name." }
            },
            "required": ["patientid", "newName"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutcome {
        let args: UpdateNameArgs = parse_args(arguments)?;
        let name = args.new_name.trim();
        if name.is_empty() {
            return Err(ToolFailure::validation("Please provide a non-empty name."));
        }

        let patient = self.context.resolve_patient(&args.patientid).await?;
        self.context
            .patients
            .update_name(&patient.id, name)
            .await
            .map_err(store_failure)?;

        Ok(ToolReply::Text(format!("Your name has been updated to {name}.")))
    }
}

#[derive(Debug, Deserialize)]
struct UpdateEmailArgs {
    patientid: String,
    #[serde(rename = "newEmail")]
    new_email: String,
}

pub struct UpdatePatientEmailTool {
    context: ToolContext,
}

impl UpdatePatientEmailTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for UpdatePatientEmailTool {
    fn name(&self) -> &'static str {
        "update_patient_email"
    }

    fn description(&self) -> &'static str {
        "Update the patient's email address. Requires the patient id and the \
         new email address."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patientid": { "type": "string", "description": "The patient's id." },
                "newEmail": { "type": "string", "description": "The new email address." }
            },
            "required": ["patientid", "newEmail"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutcome {
        let args: UpdateEmailArgs = parse_args(arguments)?;
        let email = args.new_email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(ToolFailure::validation("Please provide a valid email address."));
        }

        let patient = self.context.resolve_patient(&args.patientid).await?;
        match self.context.patients.update_email(&patient.id, email).await {
            Ok(()) => Ok(ToolReply::Text(format!("Your email has been updated to {email}."))),
            Err(RepositoryError::Conflict(_)) => {
                Err(ToolFailure::conflict("This email is already in use."))
            }
            Err(error) => Err(store_failure(error)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct UpdatePhoneArgs {
    patientid: String,
    #[serde(rename = "newPhone")]
    new_phone: String,
}

pub struct UpdatePatientPhoneTool {
    context: ToolContext,
}

impl UpdatePatientPhoneTool {
    pub fn new(context: ToolContext) -> Self {
        Self { context }
    }
}

#[async_trait]
impl Tool for UpdatePatientPhoneTool {
    fn name(&self) -> &'static str {
        "update_patient_phone"
    }

    fn description(&self) -> &'static str {
        "Update the patient's phone number. Requires the patient id and the \
         new 10-digit phone number."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "patientid": { "type": "string", "description": "The patient's id." },
                "newPhone": { "type": "string", "description": "The new 10-digit phone number." }
            },
            "required": ["patientid", "newPhone"]
        })
    }

    async fn execute(&self, arguments: Value) -> ToolOutcome {
        let args: UpdatePhoneArgs = parse_args(arguments)?;
        let phone = args.new_phone.trim();
        // Format check runs before any store write.
        if !is_valid_phone(phone) {
            return Err(ToolFailure::validation(
                "Please provide a valid 10-digit phone number.",
            ));
        }

        let patient = self.context.resolve_patient(&args.patientid).await?;
        match self.context.patients.update_phone(&patient.id, phone).await {
            Ok(()) => {
                Ok(ToolReply::Text(format!("Your phone number has been updated to {phone}.")))
            }
            Err(RepositoryError::Conflict(_)) => {
                Err(ToolFailure::conflict("This phone number is already in use."))
            }
            Err(error) => Err(store_failure(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{context_with, patient_fixture, second_patient_fixture};
    use super::{UpdatePatientEmailTool, UpdatePatientNameTool, UpdatePatientPhoneTool};
    use crate::tools::{Tool, ToolReply};

    use medibot_core::errors::FailureKind;
    use medibot_db::repositories::PatientRepository;
    use serde_json::json;

    #[tokio::test]
    async fn updates_name_after_trimming() {
        let patient = patient_fixture();
        let patient_id = patient.id.to_string();
        let id = patient.id.clone();
        let (context, repos) = context_with(vec![patient], vec![]).await;
        let tool = UpdatePatientNameTool::new(context);

        let reply = tool
            .execute(json!({ "patientid": patient_id, "newName": "  Asha M.  " }))
            .await
            .expect("update");
        assert_eq!(reply, ToolReply::Text("Your name has been updated to Asha M..".to_string()));

        let stored = repos.patients.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.name, "Asha M.");
    }

    #[tokio::test]
    async fn invalid_phone_never_reaches_the_store() {
        let patient = patient_fixture();
        let patient_id = patient.id.to_string();
        let original_phone = patient.phone.clone();
        let id = patient.id.clone();
        let (context, repos) = context_with(vec![patient], vec![]).await;
        let tool = UpdatePatientPhoneTool::new(context);

        let failure = tool
            .execute(json!({ "patientid": patient_id, "newPhone": "12345" }))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Validation);
        assert!(failure.detail.contains("10-digit"));

        let stored = repos.patients.find_by_id(&id).await.unwrap().unwrap();
        assert_eq!(stored.phone, original_phone);
    }

    #[tokio::test]
    async fn taken_email_is_a_conflict() {
        let patient = patient_fixture();
        let other = second_patient_fixture();
        let patient_id = patient.id.to_string();
        let taken_email = other.email.clone();
        let (context, _repos) = context_with(vec![patient, other], vec![]).await;
        let tool = UpdatePatientEmailTool::new(context);

        let failure = tool
            .execute(json!({ "patientid": patient_id, "newEmail": taken_email }))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Conflict);
        assert!(failure.detail.contains("already in use"));
    }

    #[tokio::test]
    async fn taken_phone_is_a_conflict() {
        let patient = patient_fixture();
        let other = second_patient_fixture();
        let patient_id = patient.id.to_string();
        let taken_phone = other.phone.clone();
        let (context, _repos) = context_with(vec![patient, other], vec![]).await;
        let tool = UpdatePatientPhoneTool::new(context);

        let failure = tool
            .execute(json!({ "patientid": patient_id, "newPhone": taken_phone }))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Conflict);
    }

    #[tokio::test]
    async fn malformed_email_is_rejected() {
        let patient = patient_fixture();
        let patient_id = patient.id.to_string();
        let (context, _repos) = context_with(vec![patient], vec![]).await;
        let tool = UpdatePatientEmailTool::new(context);

        let failure = tool
            .execute(json!({ "patientid": patient_id, "newEmail": "not-an-email" }))
            .await
            .unwrap_err();
        assert_eq!(failure.kind, FailureKind::Validation);
    }
}
