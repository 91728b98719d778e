use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Append-only record of a billing-affecting event. Entries are only ever
/// inserted and read, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrailEntry {
    pub id: Uuid,
    pub action: String,
    pub amount: f64,
    pub user: String,
    pub timestamp: DateTime<Utc>,
    pub details: String,
}

impl AuditTrailEntry {
    pub fn record(
        action: impl Into<String>,
        amount: f64,
        user: impl Into<String>,
        details: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            action: action.into(),
            amount,
            user: user.into(),
            timestamp: Utc::now(),
            details: details.into(),
        }
    }
}
