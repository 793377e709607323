//! In-memory appointment repository.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::foundation::{AdmissionId, DomainError, Timestamp};
use crate::domain::scheduling::{Appointment, BookingOutcome};
use crate::ports::AppointmentRepository;

/// Appointments in a vector; `reserve` checks both uniqueness rules under
/// one write lock.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAppointmentRepository {
    appointments: Arc<RwLock<Vec<Appointment>>>,
}

impl InMemoryAppointmentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// All stored appointments, in booking order.
    pub async fn appointments(&self) -> Vec<Appointment> {
        self.appointments.read().await.clone()
    }
}

#[async_trait]
impl AppointmentRepository for InMemoryAppointmentRepository {
    async fn find_by_admission(
        &self,
        id: AdmissionId,
    ) -> Result<Option<Appointment>, DomainError> {
        Ok(self
            .appointments
            .read()
            .await
            .iter()
            .find(|a| a.admission_id == id)
            .cloned())
    }

    async fn booked_between(
        &self,
        grade: i16,
        from: Timestamp,
        to: Timestamp,
    ) -> Result<Vec<Timestamp>, DomainError> {
        let mut booked: Vec<Timestamp> = self
            .appointments
            .read()
            .await
            .iter()
            .filter(|a| a.grade == grade)
            .map(|a| a.scheduled_at)
            .filter(|t| !t.is_before(&from) && t.is_before(&to))
            .collect();
        booked.sort();
        Ok(booked)
    }

    async fn reserve(&self, appointment: &Appointment) -> Result<BookingOutcome, DomainError> {
        let mut appointments = self.appointments.write().await;

        if let Some(existing) = appointments
            .iter()
            .find(|a| a.admission_id == appointment.admission_id)
        {
            return Ok(BookingOutcome::AlreadyBooked(existing.clone()));
        }

        if appointments
            .iter()
            .any(|a| a.grade == appointment.grade && a.scheduled_at == appointment.scheduled_at)
        {
            return Ok(BookingOutcome::SlotTaken);
        }

        appointments.push(appointment.clone());
        Ok(BookingOutcome::Booked(appointment.clone()))
    }
}
