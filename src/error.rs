//! Error types shared across the service.

use thiserror::Error;

/// Field-level validation failure raised while constructing domain values
/// or checking a form draft before submission.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("invalid date {value:?}: expected YYYY-MM-DD")]
    InvalidDate { value: String },

    #[error("invalid time {value:?}: expected HH:MM")]
    InvalidTime { value: String },

    #[error("invalid amount {value:?}: expected a non-negative number")]
    InvalidAmount { value: String },

    #[error("unknown status label: {0}")]
    UnknownStatus(String),

    #[error("unrecognized filter value: {0}")]
    UnknownFilter(String),

    #[error("action is marked completed but has no completion timestamp")]
    IncompleteCompletion,
}

/// Failure in the persistence/service layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("patient {0} does not exist")]
    UnknownPatient(i64),

    #[error("appointment {0} does not exist")]
    UnknownAppointment(i64),

    #[error("payment {0} does not exist")]
    UnknownPayment(i64),

    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },

    #[error("invalid stored value: {0}")]
    Corrupt(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("cache error: {0}")]
    Cache(#[from] bb8_redis::redis::RedisError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A dashboard transition that is not legal from the current dialog state.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("cannot {action} from the {state} state")]
pub struct StateError {
    pub action: &'static str,
    pub state: &'static str,
}

/// Anything that can go wrong while driving the dashboard workflow.
#[derive(Debug, Error)]
pub enum DashboardError {
    #[error(transparent)]
    State(#[from] StateError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("creation failed: {0}")]
    Service(#[from] StoreError),
}
