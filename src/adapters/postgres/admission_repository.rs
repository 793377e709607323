//! PostgreSQL implementation of AdmissionRepository.
//!
//! Admissions live in `student`; the sender's phone and email live in
//! `student_contact_info`. Both rows are written in one transaction.

use async_trait::async_trait;
use sqlx::{PgPool, Row};

use crate::domain::admission::{AdmissionRecord, NewAdmission};
use crate::domain::foundation::{AdmissionId, DomainError, ErrorCode, Timestamp};
use crate::ports::AdmissionRepository;

/// PostgreSQL implementation of AdmissionRepository.
#[derive(Clone)]
pub struct PostgresAdmissionRepository {
    pool: PgPool,
}

impl PostgresAdmissionRepository {
    /// Creates a new PostgresAdmissionRepository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AdmissionRepository for PostgresAdmissionRepository {
    async fn create(&self, admission: &NewAdmission) -> Result<AdmissionId, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to start transaction", e))?;

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO student (displayname, grade, semester, referral, regdate, enrolled)
            VALUES ($1, $2, $3, $4, $5, FALSE)
            RETURNING id
            "#,
        )
        .bind(&admission.display_name)
        .bind(admission.grade)
        .bind(admission.semester)
        .bind(&admission.referral)
        .bind(Timestamp::now().as_datetime())
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to insert student", e))?;

        sqlx::query(
            r#"
            INSERT INTO student_contact_info (student_id, email, mobile)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(id)
        .bind(&admission.email)
        .bind(&admission.mobile)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to insert student contact", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(AdmissionId::new(id))
    }

    async fn update(&self, id: AdmissionId, admission: &NewAdmission) -> Result<(), DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::database("Failed to start transaction", e))?;

        let enrolled: Option<bool> =
            sqlx::query_scalar("SELECT enrolled FROM student WHERE id = $1 FOR UPDATE")
                .bind(id.as_i64())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| DomainError::database("Failed to fetch student", e))?;

        match enrolled {
            None => {
                return Err(DomainError::new(
                    ErrorCode::AdmissionNotFound,
                    format!("Admission not found: {}", id),
                ))
            }
            Some(true) => {
                return Err(DomainError::new(
                    ErrorCode::AdmissionEnrolled,
                    format!("Admission {} is already enrolled", id),
                ))
            }
            Some(false) => {}
        }

        sqlx::query(
            r#"
            UPDATE student SET
                displayname = $2,
                grade = $3,
                semester = $4,
                referral = $5
            WHERE id = $1
            "#,
        )
        .bind(id.as_i64())
        .bind(&admission.display_name)
        .bind(admission.grade)
        .bind(admission.semester)
        .bind(&admission.referral)
        .execute(&mut *tx)
        .await
        .map_err(|e| DomainError::database("Failed to update student", e))?;

        // The numbers stay as stored; the sender may be on `mobile2`.
        sqlx::query("UPDATE student_contact_info SET email = $2 WHERE student_id = $1")
            .bind(id.as_i64())
            .bind(&admission.email)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::database("Failed to update student contact", e))?;

        tx.commit()
            .await
            .map_err(|e| DomainError::database("Failed to commit transaction", e))?;

        Ok(())
    }

    async fn find_pending_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<AdmissionRecord>, DomainError> {
        let row = sqlx::query(
            r#"
            SELECT s.id, s.displayname, s.grade, s.semester, s.referral, s.regdate, s.enrolled,
                   sci.email, sci.mobile, sci.mobile2
            FROM student s
            JOIN student_contact_info sci ON s.id = sci.student_id
            WHERE (sci.mobile = $1 OR sci.mobile2 = $1) AND NOT s.enrolled
            ORDER BY s.regdate DESC, s.id DESC
            LIMIT 1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch admission", e))?;

        row.map(row_to_record).transpose()
    }

    async fn remove_pending_by_phone(&self, phone: &str) -> Result<bool, DomainError> {
        // Contact rows go with the student row (ON DELETE CASCADE).
        let result = sqlx::query(
            r#"
            DELETE FROM student s
            USING student_contact_info sci
            WHERE sci.student_id = s.id
              AND (sci.mobile = $1 OR sci.mobile2 = $1)
              AND NOT s.enrolled
            "#,
        )
        .bind(phone)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to delete admission", e))?;

        Ok(result.rows_affected() > 0)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Helper functions
// ════════════════════════════════════════════════════════════════════════════

fn column<'r, T>(row: &'r sqlx::postgres::PgRow, name: &str) -> Result<T, DomainError>
where
    T: sqlx::Decode<'r, sqlx::Postgres> + sqlx::Type<sqlx::Postgres>,
{
    row.try_get(name)
        .map_err(|e| DomainError::database(&format!("Failed to get {}", name), e))
}

fn row_to_record(row: sqlx::postgres::PgRow) -> Result<AdmissionRecord, DomainError> {
    let registered_at: chrono::DateTime<chrono::Utc> = column(&row, "regdate")?;

    Ok(AdmissionRecord {
        id: AdmissionId::new(column(&row, "id")?),
        display_name: column(&row, "displayname")?,
        grade: column(&row, "grade")?,
        semester: column(&row, "semester")?,
        referral: column(&row, "referral")?,
        registered_at: Timestamp::from_datetime(registered_at),
        enrolled: column(&row, "enrolled")?,
        email: column(&row, "email")?,
        mobile: column(&row, "mobile")?,
        mobile2: column(&row, "mobile2")?,
    })
}
