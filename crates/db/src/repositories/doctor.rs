use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use medibot_core::domain::doctor::{weekday_from_name, AvailableHours, Doctor, DoctorId};

use super::{DoctorRepository, RepositoryError};
use crate::DbPool;

pub struct SqlDoctorRepository {
    pool: DbPool,
}

impl SqlDoctorRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    async fn hydrate(&self, row: SqliteRow) -> Result<Doctor, RepositoryError> {
        let id_text = row.get::<String, _>("id");

        let availability = sqlx::query(
            "SELECT weekday FROM doctor_availability WHERE doctor_id = ? ORDER BY rowid ASC",
        )
        .bind(&id_text)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|weekday_row| {
            let name = weekday_row.get::<String, _>("weekday");
            weekday_from_name(&name).ok_or_else(|| {
                RepositoryError::Decode(format!("doctor_availability.weekday: `{name}`"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

        let cancellations = sqlx::query(
            "SELECT day FROM doctor_cancellation WHERE doctor_id = ? ORDER BY day ASC",
        )
        .bind(&id_text)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(|day_row| {
            let day = day_row.get::<String, _>("day");
            NaiveDate::parse_from_str(&day, "%Y-%m-%d").map_err(|error| {
                RepositoryError::Decode(format!("doctor_cancellation.day: {error}"))
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

        doctor_from_row(row, availability, cancellations)
    }
}

#[async_trait::async_trait]
impl DoctorRepository for SqlDoctorRepository {
    async fn find_by_id(&self, id: &DoctorId) -> Result<Option<Doctor>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, phone, specialization, fee, start_time, end_time, max_per_day, \
             created_at FROM doctor WHERE id = ?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.hydrate(row).await.map(Some),
            None => Ok(None),
        }
    }

    async fn find_by_name_and_phone(
        &self,
        name: &str,
        phone: &str,
    ) -> Result<Option<Doctor>, RepositoryError> {
        let row = sqlx::query(
            "SELECT id, name, phone, specialization, fee, start_time, end_time, max_per_day, \
             created_at FROM doctor WHERE name = ? AND phone = ?",
        )
        .bind(name.trim())
        .bind(phone.trim())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => self.hydrate(row).await.map(Some),
            None => Ok(None),
        }
    }
}

fn doctor_from_row(
    row: SqliteRow,
    availability: Vec<chrono::Weekday>,
    cancellations: Vec<NaiveDate>,
) -> Result<Doctor, RepositoryError> {
    let id = row
        .get::<String, _>("id")
        .parse::<Uuid>()
        .map(DoctorId)
        .map_err(|_| RepositoryError::Decode("doctor.id is not a uuid".to_string()))?;
    let fee = row
        .get::<String, _>("fee")
        .parse::<Decimal>()
        .map_err(|error| RepositoryError::Decode(format!("doctor.fee: {error}")))?;
    let start = parse_clock(&row.get::<String, _>("start_time"), "doctor.start_time")?;
    let end = parse_clock(&row.get::<String, _>("end_time"), "doctor.end_time")?;
    let created_at = row
        .get::<String, _>("created_at")
        .parse::<DateTime<Utc>>()
        .map_err(|error| RepositoryError::Decode(format!("doctor.created_at: {error}")))?;
    let max_per_day = row.get::<i64, _>("max_per_day");
    if max_per_day < 0 {
        return Err(RepositoryError::Decode("doctor.max_per_day is negative".to_string()));
    }

    Ok(Doctor {
        id,
        name: row.get("name"),
        phone: row.get("phone"),
        specialization: row.get("specialization"),
        fee,
        availability,
        hours: AvailableHours { start, end },
        max_per_day: max_per_day as u32,
        cancellations,
        created_at,
    })
}

fn parse_clock(value: &str, field: &str) -> Result<NaiveTime, RepositoryError> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map_err(|error| RepositoryError::Decode(format!("{field}: {error}")))
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, Weekday};
    use rust_decimal::Decimal;

    use crate::repositories::{DoctorRepository, SqlDoctorRepository};
    use crate::{connect_with_settings, migrations};

    async fn pool_with_doctor() -> crate::DbPool {
        let pool = connect_with_settings("sqlite::memory:", 1, 30).await.expect("connect");
        migrations::run_pending(&pool).await.expect("migrate");

        sqlx::query(
            "INSERT INTO doctor (id, name, phone, specialization, fee, start_time, end_time, \
             max_per_day, created_at) \
             VALUES ('7a31e06f-4c2f-4b8e-9a43-6a11b0f7c201', 'Asha Rao', '9876543210', \
             'Cardiology', '500.00', '10:00', '17:00', 2, '2025-06-01T00:00:00Z')",
        )
        .execute(&pool)
        .await
        .expect("insert doctor");

        for weekday in ["Monday", "Wednesday", "Friday"] {
            sqlx::query("INSERT INTO doctor_availability (doctor_id, weekday) VALUES (?, ?)")
                .bind("7a31e06f-4c2f-4b8e-9a43-6a11b0f7c201")
                .bind(weekday)
                .execute(&pool)
                .await
                .expect("insert availability");
        }

        sqlx::query(
            "INSERT INTO doctor_cancellation (doctor_id, day) \
             VALUES ('7a31e06f-4c2f-4b8e-9a43-6a11b0f7c201', '2025-06-06')",
        )
        .execute(&pool)
        .await
        .expect("insert cancellation");

        pool
    }

    #[tokio::test]
    async fn resolves_doctor_by_name_and_phone_with_roster() {
        let pool = pool_with_doctor().await;
        let repo = SqlDoctorRepository::new(pool.clone());

        let doctor = repo
            .find_by_name_and_phone("Asha Rao", "9876543210")
            .await
            .expect("query")
            .expect("present");

        assert_eq!(doctor.specialization, "Cardiology");
        assert_eq!(doctor.fee, Decimal::new(50_000, 2));
        assert_eq!(doctor.availability, vec![Weekday::Mon, Weekday::Wed, Weekday::Fri]);
        assert_eq!(doctor.hours.start, NaiveTime::from_hms_opt(10, 0, 0).unwrap());
        assert_eq!(doctor.max_per_day, 2);
        assert_eq!(doctor.cancellations, vec![NaiveDate::from_ymd_opt(2025, 6, 6).unwrap()]);

        pool.close().await;
    }

    #[tokio::test]
    async fn wrong_phone_resolves_nothing() {
        let pool = pool_with_doctor().await;
        let repo = SqlDoctorRepository::new(pool.clone());

        let missing =
            repo.find_by_name_and_phone("Asha Rao", "1112223334").await.expect("query");
        assert!(missing.is_none());

        pool.close().await;
    }
}
