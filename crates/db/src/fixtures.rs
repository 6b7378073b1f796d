//! Deterministic demo dataset for local runs and the `seed` CLI command.
//!
//! Ids are fixed so re-seeding is idempotent (`INSERT OR IGNORE`) and demo
//! transcripts stay reproducible across machines.

use crate::DbPool;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub patients: u32,
    pub doctors: u32,
    pub reports: u32,
}

const DEMO_PATIENTS: &[(&str, &str, &str, &str)] = &[
    (
        "5f8b1f6e-8e24-4cc4-a8f7-3a6f0a1d9b01",
        "Asha Menon",
        "asha.menon@example.com",
        "9876543210",
    ),
    (
        "5f8b1f6e-8e24-4cc4-a8f7-3a6f0a1d9b02",
        "Vikram Shah",
        "vikram.shah@example.com",
        "9123456780",
    ),
];

const DEMO_REPORTS: &[(&str, &str, Option<&str>, Option<&str>, i64)] = &[
    (
        "c0a80101-0000-4000-8000-000000000001",
        "5f8b1f6e-8e24-4cc4-a8f7-3a6f0a1d9b01",
        Some("Blood Panel"),
        Some("https://reports.example.com/asha/blood-panel.pdf"),
        0,
    ),
    (
        "c0a80101-0000-4000-8000-000000000002",
        "5f8b1f6e-8e24-4cc4-a8f7-3a6f0a1d9b01",
        None,
        None,
        1,
    ),
];

// (id, name, phone, specialization, fee, start, end, max/day, weekdays, blackout)
#[allow(clippy::type_complexity)]
const DEMO_DOCTORS: &[(
    &str,
    &str,
    &str,
    &str,
    &str,
    &str,
    &str,
    i64,
    &[&str],
    Option<&str>,
)] = &[
    (
        "7a31e06f-4c2f-4b8e-9a43-6a11b0f7c201",
        "Asha Rao",
        "9000000001",
        "Cardiology",
        "500.00",
        "10:00",
        "17:00",
        2,
        &["Monday", "Tuesday", "Wednesday", "Thursday", "Friday"],
        None,
    ),
    (
        "7a31e06f-4c2f-4b8e-9a43-6a11b0f7c202",
        "Nikhil Iyer",
        "9000000002",
        "Dermatology",
        "350.00",
        "09:30",
        "13:00",
        4,
        &["Monday", "Wednesday", "Friday"],
        Some("2025-06-06"),
    ),
];

pub async fn seed_demo_data(pool: &DbPool) -> Result<SeedSummary, sqlx::Error> {
    let mut summary = SeedSummary::default();

    for (id, name, email, phone) in DEMO_PATIENTS {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO patient (id, name, email, phone, created_at) \
             VALUES (?, ?, ?, ?, '2025-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(name)
        .bind(email)
        .bind(phone)
        .execute(pool)
        .await?;
        summary.patients += result.rows_affected() as u32;
    }

    for (id, patient_id, name, link, position) in DEMO_REPORTS {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO patient_report (id, patient_id, name, link, position) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id)
        .bind(patient_id)
        .bind(name)
        .bind(link)
        .bind(position)
        .execute(pool)
        .await?;
        summary.reports += result.rows_affected() as u32;
    }

    for (id, name, phone, specialization, fee, start, end, max_per_day, weekdays, blackout) in
        DEMO_DOCTORS
    {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO doctor (id, name, phone, specialization, fee, start_time, \
             end_time, max_per_day, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, '2025-01-01T00:00:00Z')",
        )
        .bind(id)
        .bind(name)
        .bind(phone)
        .bind(specialization)
        .bind(fee)
        .bind(start)
        .bind(end)
        .bind(max_per_day)
        .execute(pool)
        .await?;
        summary.doctors += result.rows_affected() as u32;

        for weekday in *weekdays {
            sqlx::query(
                "INSERT OR IGNORE INTO doctor_availability (doctor_id, weekday) VALUES (?, ?)",
            )
            .bind(id)
            .bind(weekday)
            .execute(pool)
            .await?;
        }

        if let Some(day) = blackout {
            sqlx::query(
                "INSERT OR IGNORE INTO doctor_cancellation (doctor_id, day) VALUES (?, ?)",
            )
            .bind(id)
            .bind(day)
            .execute(pool)
            .await?;
        }
    }

    Ok(summary)
}
