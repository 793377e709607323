//! In-memory admission repository.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::admission::{AdmissionRecord, NewAdmission};
use crate::domain::foundation::{AdmissionId, DomainError, ErrorCode, Timestamp};
use crate::ports::AdmissionRepository;

/// Admissions held in a map keyed by id. Ids are assigned sequentially
/// from 1, mirroring a `BIGSERIAL` column.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAdmissionRepository {
    inner: Arc<RwLock<Store>>,
    fail_writes: bool,
}

#[derive(Debug, Default)]
struct Store {
    next_id: i64,
    records: BTreeMap<AdmissionId, AdmissionRecord>,
}

impl InMemoryAdmissionRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// A repository whose writes always fail with `DatabaseError`.
    pub fn failing_writes() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    /// Stores a record as-is (test seeding), keeping the id sequence ahead of it.
    pub async fn insert_record(&self, record: AdmissionRecord) {
        let mut store = self.inner.write().await;
        store.next_id = store.next_id.max(record.id.as_i64());
        store.records.insert(record.id, record);
    }

    /// All stored records, ordered by id.
    pub async fn records(&self) -> Vec<AdmissionRecord> {
        self.inner.read().await.records.values().cloned().collect()
    }

    fn check_writable(&self) -> Result<(), DomainError> {
        if self.fail_writes {
            return Err(DomainError::database("Failed to write admission", "store unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl AdmissionRepository for InMemoryAdmissionRepository {
    async fn create(&self, admission: &NewAdmission) -> Result<AdmissionId, DomainError> {
        self.check_writable()?;
        let mut store = self.inner.write().await;
        store.next_id += 1;
        let id = AdmissionId::new(store.next_id);

        store.records.insert(
            id,
            AdmissionRecord {
                id,
                display_name: admission.display_name.clone(),
                grade: admission.grade,
                semester: admission.semester,
                referral: admission.referral.clone(),
                registered_at: Timestamp::now(),
                enrolled: false,
                email: Some(admission.email.clone()),
                mobile: admission.mobile.clone(),
                mobile2: None,
            },
        );
        Ok(id)
    }

    async fn update(&self, id: AdmissionId, admission: &NewAdmission) -> Result<(), DomainError> {
        self.check_writable()?;
        let mut store = self.inner.write().await;
        let record = store.records.get_mut(&id).ok_or_else(|| {
            DomainError::new(ErrorCode::AdmissionNotFound, format!("Admission not found: {}", id))
        })?;

        if record.enrolled {
            return Err(DomainError::new(
                ErrorCode::AdmissionEnrolled,
                format!("Admission {} is already enrolled", id),
            ));
        }

        record.display_name = admission.display_name.clone();
        record.grade = admission.grade;
        record.semester = admission.semester;
        record.referral = admission.referral.clone();
        record.email = Some(admission.email.clone());
        Ok(())
    }

    async fn find_pending_by_phone(
        &self,
        phone: &str,
    ) -> Result<Option<AdmissionRecord>, DomainError> {
        let store = self.inner.read().await;
        Ok(store
            .records
            .values()
            .filter(|r| r.has_phone(phone) && r.is_pending())
            .max_by_key(|r| (r.registered_at, r.id))
            .cloned())
    }

    async fn remove_pending_by_phone(&self, phone: &str) -> Result<bool, DomainError> {
        self.check_writable()?;
        let mut store = self.inner.write().await;
        let before = store.records.len();
        store
            .records
            .retain(|_, r| !(r.has_phone(phone) && r.is_pending()));
        Ok(store.records.len() < before)
    }
}
