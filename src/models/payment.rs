use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::patient::UserProfile;

/// Settlement state of a payment. Wire labels are upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PaymentStatus {
    Paid,
    Pending,
    Cancelled,
}

impl PaymentStatus {
    pub fn label(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "PAID",
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    /// Pending payments settle or cancel; both outcomes are terminal.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Paid)
                | (PaymentStatus::Pending, PaymentStatus::Cancelled)
        )
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "PAID" => Ok(PaymentStatus::Paid),
            "PENDING" => Ok(PaymentStatus::Pending),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            _ => Err(ValidationError::UnknownStatus(value.to_string())),
        }
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub user: UserProfile,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub action_id: i64,
    pub status: PaymentStatus,
    pub amount: f64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
}

impl Payment {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(ValidationError::InvalidAmount {
                value: self.amount.to_string(),
            });
        }
        Ok(())
    }
}

/// One month of aggregated billing activity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CashFlowPoint {
    pub month: String,
    pub income: f64,
    pub pending: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_status_labels_round_trip() {
        for status in [
            PaymentStatus::Paid,
            PaymentStatus::Pending,
            PaymentStatus::Cancelled,
        ] {
            assert_eq!(status.label().parse::<PaymentStatus>().unwrap(), status);
        }
        assert!(matches!(
            "REFUNDED".parse::<PaymentStatus>(),
            Err(ValidationError::UnknownStatus(_))
        ));
    }

    #[test]
    fn settled_payments_are_terminal() {
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Paid));
        assert!(PaymentStatus::Pending.can_transition_to(PaymentStatus::Cancelled));
        assert!(!PaymentStatus::Paid.can_transition_to(PaymentStatus::Pending));
        assert!(!PaymentStatus::Cancelled.can_transition_to(PaymentStatus::Paid));
    }

    #[test]
    fn negative_amount_is_rejected() {
        let payment = Payment {
            id: 1,
            patient_id: 1,
            doctor_id: 1,
            action_id: 1,
            status: PaymentStatus::Pending,
            amount: -20.0,
            date: NaiveDate::from_ymd_opt(2026, 3, 2).unwrap(),
            time: NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
            description: "Consultation".to_string(),
        };
        assert!(matches!(
            payment.validate(),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }
}
