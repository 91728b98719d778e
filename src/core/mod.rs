//! Pure, in-memory pieces of the service: the appointment filter engine,
//! form drafts, the dashboard workflow, and billing aggregation.

pub mod billing;
pub mod dashboard;
pub mod drafts;
pub mod filter;
