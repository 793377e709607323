//! CancelAdmissionHandler - Command handler for withdrawing a pending admission.

use std::sync::Arc;

use crate::domain::foundation::DomainError;
use crate::ports::AdmissionRepository;

/// Command to remove the sender's pending admission.
#[derive(Debug, Clone)]
pub struct CancelAdmissionCommand {
    pub phone: String,
}

/// Handler for cancelling admissions. Enrolled admissions are never touched.
pub struct CancelAdmissionHandler {
    repository: Arc<dyn AdmissionRepository>,
}

impl CancelAdmissionHandler {
    pub fn new(repository: Arc<dyn AdmissionRepository>) -> Self {
        Self { repository }
    }

    /// Returns true if a pending admission was removed.
    pub async fn handle(&self, cmd: CancelAdmissionCommand) -> Result<bool, DomainError> {
        let removed = self.repository.remove_pending_by_phone(&cmd.phone).await?;
        tracing::info!(removed, "Admission cancellation processed");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::in_memory::InMemoryAdmissionRepository;
    use crate::domain::admission::NewAdmission;

    #[tokio::test]
    async fn removes_pending_admission() {
        let repo = InMemoryAdmissionRepository::new();
        repo.create(&NewAdmission {
            display_name: "Omar".to_string(),
            email: "omar@example.com".to_string(),
            grade: 3,
            semester: 2,
            referral: None,
            mobile: "971500000001".to_string(),
        })
        .await
        .unwrap();
        let handler = CancelAdmissionHandler::new(Arc::new(repo.clone()));

        let removed = handler
            .handle(CancelAdmissionCommand {
                phone: "971500000001".to_string(),
            })
            .await
            .unwrap();

        assert!(removed);
        assert!(repo.records().await.is_empty());
    }

    #[tokio::test]
    async fn nothing_to_remove_is_not_an_error() {
        let handler = CancelAdmissionHandler::new(Arc::new(InMemoryAdmissionRepository::new()));
        let removed = handler
            .handle(CancelAdmissionCommand {
                phone: "0".to_string(),
            })
            .await
            .unwrap();
        assert!(!removed);
    }
}
