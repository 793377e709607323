//! Admission repository port.
//!
//! Persists admissions (`student` rows) together with their contact row
//! (`student_contact_info`). Lookups are by the sender's phone number.

use async_trait::async_trait;

use crate::domain::admission::{AdmissionRecord, NewAdmission};
use crate::domain::foundation::{AdmissionId, DomainError};

/// Repository port for admissions and their contact information.
#[async_trait]
pub trait AdmissionRepository: Send + Sync {
    /// Insert an admission and its contact row in one transaction.
    ///
    /// Returns the store-generated admission id.
    ///
    /// # Errors
    ///
    /// - `DatabaseError` on persistence failure (nothing is written)
    async fn create(&self, admission: &NewAdmission) -> Result<AdmissionId, DomainError>;

    /// Overwrite a pending admission and its contact email. Stored mobile
    /// numbers are left unchanged.
    ///
    /// # Errors
    ///
    /// - `AdmissionNotFound` if no such admission exists
    /// - `AdmissionEnrolled` if the admission is already enrolled
    /// - `DatabaseError` on persistence failure
    async fn update(&self, id: AdmissionId, admission: &NewAdmission) -> Result<(), DomainError>;

    /// Find the most recent pending (not enrolled) admission whose contact
    /// row matches `phone` on either mobile column.
    async fn find_pending_by_phone(&self, phone: &str)
        -> Result<Option<AdmissionRecord>, DomainError>;

    /// Delete pending admissions (and their contact rows) for `phone`.
    ///
    /// Returns true if anything was removed.
    async fn remove_pending_by_phone(&self, phone: &str) -> Result<bool, DomainError>;
}
