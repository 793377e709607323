//! PostgreSQL implementation of AppointmentRepository.
//!
//! Booking is a single `INSERT ... ON CONFLICT DO NOTHING` guarded by the
//! `appointment_student_unique` and `appointment_slot_unique` indexes.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::foundation::{AdmissionId, DomainError, Timestamp};
use crate::domain::scheduling::{Appointment, BookingOutcome};
use crate::ports::AppointmentRepository;

/// PostgreSQL implementation of AppointmentRepository.
#[derive(Clone)]
pub struct PostgresAppointmentRepository {
    pool: PgPool,
}

impl PostgresAppointmentRepository {
    /// Creates a new PostgresAppointmentRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AppointmentRepository for PostgresAppointmentRepository {
    async fn find_by_admission(
        &self,
        id: AdmissionId,
    ) -> Result<Option<Appointment>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT student_id, grade, appdate, purpose
            FROM appointment
            WHERE student_id = $1
            "#,
        )
        .bind(id.as_i64())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch appointment", e))?;

        row.map(row_to_appointment).transpose()
    }

    async fn booked_between(
        &self,
        grade: i16,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Timestamp>, DomainError> {
        let booked: Vec<chrono::DateTime<chrono::Utc>> = sqlx::query_scalar(
            r#"
            SELECT appdate FROM appointment
            WHERE grade = $1 AND appdate >= $2 AND appdate < $3
            ORDER BY appdate
            "#,
        )
        .bind(grade)
        .bind(from.as_datetime())
        .bind(to.as_datetime())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch booked slots", e))?;

        Ok(booked.into_iter().map(Timestamp::from_datetime).collect())
    }

    async fn reserve(&self, appointment: &Appointment) -> Result<BookingOutcome, DomainError> {
        let inserted = sqlx::query(
            r#"
            INSERT INTO appointment (student_id, grade, appdate, purpose)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(appointment.admission_id.as_i64())
        .bind(appointment.grade)
        .bind(appointment.scheduled_at.as_datetime())
        .bind(&appointment.purpose)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to insert appointment", e))?;

        if inserted.rows_affected() == 1 {
            return Ok(BookingOutcome::Booked(appointment.clone()));
        }

        // Nothing inserted: work out which constraint won.
        match self.find_by_admission(appointment.admission_id).await? {
            Some(existing) => Ok(BookingOutcome::AlreadyBooked(existing)),
            None => Ok(BookingOutcome::SlotTaken),
        }
    }
}

fn row_to_appointment(row: sqlx::postgres::PgRow) -> Result<Appointment, DomainError> {
    let admission_id: i64 = row
        .try_get("student_id")
        .map_err(|e| DomainError::database("Failed to get student_id", e))?;
    let grade: i16 = row
        .try_get("grade")
        .map_err(|e| DomainError::database("Failed to get grade", e))?;
    let scheduled_at: chrono::DateTime<chrono::Utc> = row
        .try_get("appdate")
        .map_err(|e| DomainError::database("Failed to get appdate", e))?;
    let purpose: String = row
        .try_get("purpose")
        .map_err(|e| DomainError::database("Failed to get purpose", e))?;

    Ok(Appointment {
        admission_id: AdmissionId::new(admission_id),
        grade,
        scheduled_at: Timestamp::from_datetime(scheduled_at),
        purpose,
    })
}
