//! PostgreSQL implementation of ContactDirectory.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::admission::{ContactRole, KnownContact};
use crate::domain::foundation::DomainError;
use crate::ports::ContactDirectory;

/// Looks up guardians, then student contact rows, by phone number.
#[derive(Clone)]
pub struct PostgresContactDirectory {
    pool: PgPool,
}

impl PostgresContactDirectory {
    /// Creates a new PostgresContactDirectory.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ContactDirectory for PostgresContactDirectory {
    async fn lookup(&self, phone: &str) -> Result<Option<KnownContact>, DomainError> {
        let guardian: Option<serde_json::Value> = sqlx::query_scalar(
            "SELECT row_to_json(g) FROM guardian g WHERE g.mobile = $1 ORDER BY g.id LIMIT 1",
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch guardian", e))?;

        if let Some(details) = guardian {
            return Ok(Some(KnownContact {
                role: ContactRole::Parent,
                details,
            }));
        }

        let student: Option<serde_json::Value> = sqlx::query_scalar(
            r#"
            SELECT row_to_json(sci) FROM student_contact_info sci
            WHERE sci.mobile = $1 OR sci.mobile2 = $1
            ORDER BY sci.id
            LIMIT 1
            "#,
        )
        .bind(phone)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to fetch student contact", e))?;

        Ok(student.map(|details| KnownContact {
            role: ContactRole::Student,
            details,
        }))
    }
}
