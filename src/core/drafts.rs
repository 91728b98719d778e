//! Form draft buffers for the two creation dialogs.
//!
//! Drafts hold raw string input exactly as typed. `validate` is the single
//! gate between a draft and a typed creation request: it fails fast on
//! missing or unparseable fields and never lets empty values through.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::models::appointment::{parse_date, parse_time};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentDraft {
    pub date: String,
    pub time: String,
    pub notes: String,
}

impl AppointmentDraft {
    pub fn validate(&self, patient_id: i64) -> Result<NewAppointment, ValidationError> {
        if self.date.trim().is_empty() {
            return Err(ValidationError::MissingField("date"));
        }
        if self.time.trim().is_empty() {
            return Err(ValidationError::MissingField("time"));
        }
        let notes = self.notes.trim();
        Ok(NewAppointment {
            patient_id,
            date: parse_date(&self.date)?,
            time: parse_time(&self.time)?,
            notes: (!notes.is_empty()).then(|| notes.to_string()),
        })
    }
}

/// Validated request handed to the creation service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewAppointment {
    pub patient_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentDraft {
    pub amount: String,
    pub date: String,
    pub time: String,
    pub description: String,
}

impl PaymentDraft {
    pub fn validate(
        &self,
        patient_id: i64,
        doctor_id: i64,
    ) -> Result<NewPayment, ValidationError> {
        let amount = self.amount.trim();
        if amount.is_empty() {
            return Err(ValidationError::MissingField("amount"));
        }
        if self.date.trim().is_empty() {
            return Err(ValidationError::MissingField("date"));
        }
        if self.time.trim().is_empty() {
            return Err(ValidationError::MissingField("time"));
        }
        let amount: f64 = amount.parse().map_err(|_| ValidationError::InvalidAmount {
            value: self.amount.clone(),
        })?;
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount {
                value: self.amount.clone(),
            });
        }
        Ok(NewPayment {
            patient_id,
            doctor_id,
            amount,
            date: parse_date(&self.date)?,
            time: parse_time(&self.time)?,
            description: self.description.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPayment {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub amount: f64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appointment_draft_requires_date_and_time() {
        let draft = AppointmentDraft::default();
        assert_eq!(
            draft.validate(1),
            Err(ValidationError::MissingField("date"))
        );

        let draft = AppointmentDraft {
            date: "2026-03-02".to_string(),
            ..Default::default()
        };
        assert_eq!(
            draft.validate(1),
            Err(ValidationError::MissingField("time"))
        );
    }

    #[test]
    fn appointment_draft_rejects_malformed_input() {
        let draft = AppointmentDraft {
            date: "next tuesday".to_string(),
            time: "09:30".to_string(),
            notes: String::new(),
        };
        assert!(matches!(
            draft.validate(1),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn appointment_draft_yields_typed_request() {
        let draft = AppointmentDraft {
            date: "2026-03-02".to_string(),
            time: "09:30".to_string(),
            notes: "  follow-up  ".to_string(),
        };
        let request = draft.validate(7).unwrap();
        assert_eq!(request.patient_id, 7);
        assert_eq!(request.notes.as_deref(), Some("follow-up"));
    }

    #[test]
    fn blank_notes_become_none() {
        let draft = AppointmentDraft {
            date: "2026-03-02".to_string(),
            time: "09:30".to_string(),
            notes: "   ".to_string(),
        };
        assert_eq!(draft.validate(1).unwrap().notes, None);
    }

    #[test]
    fn payment_draft_requires_every_field() {
        let draft = PaymentDraft::default();
        assert_eq!(
            draft.validate(1, 2),
            Err(ValidationError::MissingField("amount"))
        );
    }

    #[test]
    fn payment_draft_rejects_bad_amounts() {
        for amount in ["twenty", "-5", "NaN"] {
            let draft = PaymentDraft {
                amount: amount.to_string(),
                date: "2026-03-02".to_string(),
                time: "10:00".to_string(),
                description: "Consultation".to_string(),
            };
            assert!(
                matches!(
                    draft.validate(1, 2),
                    Err(ValidationError::InvalidAmount { .. })
                ),
                "{amount}"
            );
        }
    }

    #[test]
    fn payment_draft_yields_typed_request() {
        let draft = PaymentDraft {
            amount: "45.50".to_string(),
            date: "2026-03-02".to_string(),
            time: "10:00".to_string(),
            description: "Consultation fee".to_string(),
        };
        let request = draft.validate(7, 3).unwrap();
        assert_eq!(request.doctor_id, 3);
        assert_eq!(request.amount, 45.5);
    }
}
