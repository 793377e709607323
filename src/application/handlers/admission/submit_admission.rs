//! SubmitAdmissionHandler - Command handler for writing a confirmed admission.

use std::sync::Arc;

use crate::domain::admission::{AdmissionForm, NewAdmission};
use crate::domain::foundation::{AdmissionId, DomainError};
use crate::ports::AdmissionRepository;

/// Command to persist the collected form for a sender.
#[derive(Debug, Clone)]
pub struct SubmitAdmissionCommand {
    pub form: AdmissionForm,
    /// Sender's phone number, stored as the contact mobile.
    pub phone: String,
}

/// Result of a successful submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitAdmissionResult {
    pub admission_id: AdmissionId,
    /// True when an existing pending admission was overwritten.
    pub updated: bool,
}

/// Handler for submitting admissions.
///
/// A form that already carries an admission id (a resumed record)
/// updates that record instead of inserting a duplicate.
pub struct SubmitAdmissionHandler {
    repository: Arc<dyn AdmissionRepository>,
}

impl SubmitAdmissionHandler {
    pub fn new(repository: Arc<dyn AdmissionRepository>) -> Self {
        Self { repository }
    }

    pub async fn handle(
        &self,
        cmd: SubmitAdmissionCommand,
    ) -> Result<SubmitAdmissionResult, DomainError> {
        let admission = NewAdmission::from_form(&cmd.form, &cmd.phone)?;

        match cmd.form.admission_id {
            Some(id) => {
                self.repository.update(id, &admission).await?;
                tracing::info!(admission_id = %id, "Admission updated");
                Ok(SubmitAdmissionResult {
                    admission_id: id,
                    updated: true,
                })
            }
            None => {
                let id = self.repository.create(&admission).await?;
                tracing::info!(admission_id = %id, grade = admission.grade, "Admission created");
                Ok(SubmitAdmissionResult {
                    admission_id: id,
                    updated: false,
                })
            }
        }
    }
}
