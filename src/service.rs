//! Creation service boundary.
//!
//! The dashboard workflow never talks to persistence directly; it goes
//! through this trait so a UI client can be tested against an in-memory
//! double and the production build wires in the store.

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::drafts::{NewAppointment, NewPayment};
use crate::error::StoreError;
use crate::models::{Appointment, Payment};
use crate::store::ClinicStore;

#[async_trait]
pub trait CreationService: Send + Sync {
    async fn create_appointment(&self, request: NewAppointment)
        -> Result<Appointment, StoreError>;
    async fn create_payment(&self, request: NewPayment) -> Result<Payment, StoreError>;
}

/// Store-backed creation service.
pub struct ClinicService {
    store: Arc<ClinicStore>,
}

impl ClinicService {
    pub fn new(store: Arc<ClinicStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CreationService for ClinicService {
    async fn create_appointment(
        &self,
        request: NewAppointment,
    ) -> Result<Appointment, StoreError> {
        self.store.create_appointment(request).await
    }

    async fn create_payment(&self, request: NewPayment) -> Result<Payment, StoreError> {
        self.store.create_payment(request).await
    }
}
