//! HTTP surface of the front-desk service.

use std::sync::Arc;

use crate::store::ClinicStore;

pub mod handlers;
pub mod routes;

pub use routes::configure;

/// Shared application state handed to every handler.
pub struct AppState {
    pub store: Arc<ClinicStore>,
}
