//! In-memory contact directory.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::admission::{ContactRole, KnownContact};
use crate::domain::foundation::DomainError;
use crate::ports::ContactDirectory;

/// Guardian and student rows keyed by phone number.
#[derive(Debug, Clone, Default)]
pub struct InMemoryContactDirectory {
    guardians: Arc<RwLock<HashMap<String, serde_json::Value>>>,
    students: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl InMemoryContactDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_guardian(&self, phone: impl Into<String>, details: serde_json::Value) {
        self.guardians.write().await.insert(phone.into(), details);
    }

    pub async fn add_student(&self, phone: impl Into<String>, details: serde_json::Value) {
        self.students.write().await.insert(phone.into(), details);
    }
}

#[async_trait]
impl ContactDirectory for InMemoryContactDirectory {
    async fn lookup(&self, phone: &str) -> Result<Option<KnownContact>, DomainError> {
        if let Some(details) = self.guardians.read().await.get(phone) {
            return Ok(Some(KnownContact {
                role: ContactRole::Parent,
                details: details.clone(),
            }));
        }

        Ok(self
            .students
            .read()
            .await
            .get(phone)
            .map(|details| KnownContact {
                role: ContactRole::Student,
                details: details.clone(),
            }))
    }
}
