//! Domain model: appointments, patients, payments, and the billing audit
//! trail.

pub mod appointment;
pub mod audit;
pub mod patient;
pub mod payment;

pub use appointment::{Action, Appointment, AppointmentStatus, AppointmentType};
pub use audit::AuditTrailEntry;
pub use patient::{Patient, UserProfile};
pub use payment::{CashFlowPoint, Doctor, Payment, PaymentStatus};
