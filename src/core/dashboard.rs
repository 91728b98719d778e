//! Dashboard workflow state machine.
//!
//! One enum replaces the pile of independent dialog booleans: at any moment
//! the dashboard is idle, viewing a patient's appointments or payments, or
//! editing one of the two creation drafts. Transitions are explicit and
//! illegal ones are errors rather than silent no-ops.
//!
//! Submission contract: validate the draft, hand it to the injected
//! creation service, and only on success discard the draft and fall back
//! to the parent viewing state. A failed submission keeps the draft intact
//! so the operator's input is never thrown away.

use std::sync::Arc;

use chrono::NaiveDateTime;
use tracing::{debug, info};

use crate::core::drafts::{AppointmentDraft, PaymentDraft};
use crate::core::filter::{filter_appointments, DateFilter, StatusFilter};
use crate::error::{DashboardError, StateError};
use crate::models::{Appointment, Payment};
use crate::service::CreationService;

#[derive(Debug, Clone, PartialEq)]
pub enum DialogState {
    Idle,
    ViewingAppointments { patient_id: i64 },
    ViewingPayments { patient_id: i64 },
    CreatingAppointment { patient_id: i64, draft: AppointmentDraft },
    CreatingPayment { patient_id: i64, draft: PaymentDraft },
}

impl DialogState {
    pub fn name(&self) -> &'static str {
        match self {
            DialogState::Idle => "Idle",
            DialogState::ViewingAppointments { .. } => "ViewingAppointments",
            DialogState::ViewingPayments { .. } => "ViewingPayments",
            DialogState::CreatingAppointment { .. } => "CreatingAppointment",
            DialogState::CreatingPayment { .. } => "CreatingPayment",
        }
    }
}

pub struct Dashboard {
    service: Arc<dyn CreationService>,
    doctor_id: i64,
    state: DialogState,
    status_filter: StatusFilter,
    date_filter: DateFilter,
}

impl Dashboard {
    pub fn new(service: Arc<dyn CreationService>, doctor_id: i64) -> Self {
        Self {
            service,
            doctor_id,
            state: DialogState::Idle,
            status_filter: StatusFilter::default(),
            date_filter: DateFilter::default(),
        }
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    pub fn set_status_filter(&mut self, filter: StatusFilter) {
        debug!(filter = filter.label(), "status filter changed");
        self.status_filter = filter;
    }

    pub fn set_date_filter(&mut self, filter: DateFilter) {
        debug!(filter = filter.label(), "date filter changed");
        self.date_filter = filter;
    }

    /// The subset of `appointments` visible under the current filter
    /// selection, recomputed on demand.
    pub fn visible_appointments<'a>(
        &self,
        appointments: &'a [Appointment],
        now: NaiveDateTime,
    ) -> Vec<&'a Appointment> {
        filter_appointments(appointments, self.status_filter, self.date_filter, now)
    }

    pub fn view_appointments(&mut self, patient_id: i64) -> Result<(), StateError> {
        match self.state {
            DialogState::Idle
            | DialogState::ViewingAppointments { .. }
            | DialogState::ViewingPayments { .. } => {
                self.state = DialogState::ViewingAppointments { patient_id };
                Ok(())
            }
            _ => Err(self.rejected("view appointments")),
        }
    }

    pub fn view_payments(&mut self, patient_id: i64) -> Result<(), StateError> {
        match self.state {
            DialogState::Idle
            | DialogState::ViewingAppointments { .. }
            | DialogState::ViewingPayments { .. } => {
                self.state = DialogState::ViewingPayments { patient_id };
                Ok(())
            }
            _ => Err(self.rejected("view payments")),
        }
    }

    /// Open the new-appointment dialog with an empty draft.
    pub fn new_appointment(&mut self) -> Result<(), StateError> {
        match self.state {
            DialogState::ViewingAppointments { patient_id } => {
                self.state = DialogState::CreatingAppointment {
                    patient_id,
                    draft: AppointmentDraft::default(),
                };
                Ok(())
            }
            _ => Err(self.rejected("open the new-appointment dialog")),
        }
    }

    /// Open the new-payment dialog with an empty draft.
    pub fn new_payment(&mut self) -> Result<(), StateError> {
        match self.state {
            DialogState::ViewingPayments { patient_id } => {
                self.state = DialogState::CreatingPayment {
                    patient_id,
                    draft: PaymentDraft::default(),
                };
                Ok(())
            }
            _ => Err(self.rejected("open the new-payment dialog")),
        }
    }

    pub fn appointment_draft_mut(&mut self) -> Option<&mut AppointmentDraft> {
        match &mut self.state {
            DialogState::CreatingAppointment { draft, .. } => Some(draft),
            _ => None,
        }
    }

    pub fn payment_draft_mut(&mut self) -> Option<&mut PaymentDraft> {
        match &mut self.state {
            DialogState::CreatingPayment { draft, .. } => Some(draft),
            _ => None,
        }
    }

    /// Close the topmost dialog. Creation dialogs fall back to the viewing
    /// state they were opened from, discarding the draft; viewing dialogs
    /// fall back to idle.
    pub fn cancel(&mut self) {
        self.state = match std::mem::replace(&mut self.state, DialogState::Idle) {
            DialogState::CreatingAppointment { patient_id, .. } => {
                DialogState::ViewingAppointments { patient_id }
            }
            DialogState::CreatingPayment { patient_id, .. } => {
                DialogState::ViewingPayments { patient_id }
            }
            _ => DialogState::Idle,
        };
    }

    pub async fn submit_appointment(&mut self) -> Result<Appointment, DashboardError> {
        let (patient_id, draft) = match &self.state {
            DialogState::CreatingAppointment { patient_id, draft } => (*patient_id, draft.clone()),
            _ => return Err(self.rejected("submit an appointment").into()),
        };

        let request = draft.validate(patient_id)?;
        let appointment = self.service.create_appointment(request).await?;
        info!(appointment_id = appointment.id, patient_id, "appointment created");

        self.state = DialogState::ViewingAppointments { patient_id };
        Ok(appointment)
    }

    pub async fn submit_payment(&mut self) -> Result<Payment, DashboardError> {
        let (patient_id, draft) = match &self.state {
            DialogState::CreatingPayment { patient_id, draft } => (*patient_id, draft.clone()),
            _ => return Err(self.rejected("submit a payment").into()),
        };

        let request = draft.validate(patient_id, self.doctor_id)?;
        let payment = self.service.create_payment(request).await?;
        info!(payment_id = payment.id, patient_id, "payment recorded");

        self.state = DialogState::ViewingPayments { patient_id };
        Ok(payment)
    }

    fn rejected(&self, action: &'static str) -> StateError {
        StateError {
            action,
            state: self.state.name(),
        }
    }
}
