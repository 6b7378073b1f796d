use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqliteRow, Row};

use medibot_core::domain::patient::{Patient, PatientId, Report};

use super::{conflict_from_unique, PatientRepository, RepositoryError};
use crate::DbPool;

pub struct SqlPatientRepository {
    pool: DbPool,
}

impl SqlPatientRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl PatientRepository for SqlPatientRepository {
    async fn find_by_id(&self, id: &PatientId) -> Result<Option<Patient>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, email, phone, created_at FROM patient WHERE id = ?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let reports = sqlx::query(
            "SELECT name, link FROM patient_report WHERE patient_id = ? ORDER BY position ASC",
        )
        .bind(id.0.to_string())
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|report_row| Report {
            name: report_row.get::<Option<String>, _>("name"),
            link: report_row.get::<Option<String>, _>("link"),
        })
        .collect();

        patient_from_row(row, reports).map(Some)
    }

    async fn update_name(&self, id: &PatientId, name: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE patient SET name = ? WHERE id = ?")
            .bind(name)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn update_email(&self, id: &PatientId, email: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE patient SET email = ? WHERE id = ?")
            .bind(email)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|error| conflict_from_unique(error, "email"))?;
        Ok(())
    }

    async fn update_phone(&self, id: &PatientId, phone: &str) -> Result<(), RepositoryError> {
        sqlx::query("UPDATE patient SET phone = ? WHERE id = ?")
            .bind(phone)
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|error| conflict_from_unique(error, "phone"))?;
        Ok(())
    }
}

fn patient_from_row(row: SqliteRow, reports: Vec<Report>) -> Result<Patient, RepositoryError> {
    let id = PatientId::parse(&row.get::<String, _>("id"))
        .ok_or_else(|| RepositoryError::Decode("patient.id is not a uuid".to_string()))?;
    let created_at = row
        .get::<String, _>("created_at")
        .parse::<DateTime<Utc>>()
        .map_err(|error| RepositoryError::Decode(format!("patient.created_at: {error}")))?;

    Ok(Patient {
        id,
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        reports,
        created_at,
    })
}
