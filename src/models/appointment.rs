use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Lifecycle of an appointment as shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Waiting,
    Upcoming,
    Confirmed,
    Completed,
}

impl AppointmentStatus {
    /// Display label, e.g. "Waiting".
    pub fn label(self) -> &'static str {
        match self {
            AppointmentStatus::Waiting => "Waiting",
            AppointmentStatus::Upcoming => "Upcoming",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Completed => "Completed",
        }
    }

    /// Whether moving to `next` is a legal lifecycle step.
    /// Completed is terminal.
    pub fn can_transition_to(self, next: AppointmentStatus) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Upcoming, Confirmed)
                | (Upcoming, Waiting)
                | (Confirmed, Waiting)
                | (Confirmed, Completed)
                | (Waiting, Completed)
        )
    }
}

impl FromStr for AppointmentStatus {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "WAITING" => Ok(AppointmentStatus::Waiting),
            "UPCOMING" => Ok(AppointmentStatus::Upcoming),
            "CONFIRMED" => Ok(AppointmentStatus::Confirmed),
            "COMPLETED" => Ok(AppointmentStatus::Completed),
            _ => Err(ValidationError::UnknownStatus(value.to_string())),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentType {
    pub id: i64,
    pub name: String,
}

/// A billable clinical action backing an appointment or a payment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Action {
    pub id: i64,
    pub appointment_type: AppointmentType,
    pub patient_id: i64,
    pub description: String,
    pub total_payment: f64,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>, // None = open-ended
    pub is_completed: bool,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Action {
    /// Field-level invariants: non-negative payment total, and a completed
    /// action must carry its completion timestamp.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.total_payment < 0.0 {
            return Err(ValidationError::InvalidAmount {
                value: self.total_payment.to_string(),
            });
        }
        if self.is_completed && self.completed_at.is_none() {
            return Err(ValidationError::IncompleteCompletion);
        }
        Ok(())
    }

    pub fn is_open_ended(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub action: Action,
    pub status: AppointmentStatus,
}

impl Appointment {
    /// Build an appointment from raw date/time strings. Malformed temporal
    /// values are rejected here so downstream code (the filter engine in
    /// particular) never sees an unparseable date.
    pub fn new(
        id: i64,
        patient_id: i64,
        date: &str,
        time: &str,
        action: Action,
        status: AppointmentStatus,
    ) -> Result<Self, ValidationError> {
        action.validate()?;
        Ok(Self {
            id,
            patient_id,
            date: parse_date(date)?,
            time: parse_time(time)?,
            action,
            status,
        })
    }
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField("date"));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: value.to_string(),
    })
}

pub(crate) fn parse_time(value: &str) -> Result<NaiveTime, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField("time"));
    }
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| ValidationError::InvalidTime {
            value: value.to_string(),
        })
}
