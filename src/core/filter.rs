//! Appointment filter engine.
//!
//! Pure predicates over an in-memory appointment list: a status filter and
//! a relative date-range filter combined with logical AND. The current
//! instant is always an explicit parameter so the engine never touches the
//! system clock.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::error::ValidationError;
use crate::models::Appointment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Waiting,
    Upcoming,
    Completed,
}

impl StatusFilter {
    pub fn label(self) -> &'static str {
        match self {
            StatusFilter::All => "ALL",
            StatusFilter::Waiting => "WAITING",
            StatusFilter::Upcoming => "UPCOMING",
            StatusFilter::Completed => "COMPLETED",
        }
    }

    /// Matches when the filter is `All` or the appointment's status label,
    /// uppercased, equals the filter label.
    pub fn matches(self, appointment: &Appointment) -> bool {
        match self {
            StatusFilter::All => true,
            _ => appointment.status.label().to_uppercase() == self.label(),
        }
    }
}

impl FromStr for StatusFilter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "ALL" => Ok(StatusFilter::All),
            "WAITING" => Ok(StatusFilter::Waiting),
            "UPCOMING" => Ok(StatusFilter::Upcoming),
            "COMPLETED" => Ok(StatusFilter::Completed),
            _ => Err(ValidationError::UnknownFilter(value.to_string())),
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Relative date-range filter. All branches compare at calendar-day
/// granularity against the day extracted from the injected instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Today,
    ThisWeek,
    ThisMonth,
}

impl DateFilter {
    pub fn label(self) -> &'static str {
        match self {
            DateFilter::All => "ALL",
            DateFilter::Today => "TODAY",
            DateFilter::ThisWeek => "THIS_WEEK",
            DateFilter::ThisMonth => "THIS_MONTH",
        }
    }

    pub fn matches(self, date: NaiveDate, today: NaiveDate) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::Today => date == today,
            DateFilter::ThisWeek => {
                // Week runs from the most recent Sunday through Saturday,
                // both ends inclusive.
                let start_of_week =
                    today - Duration::days(i64::from(today.weekday().num_days_from_sunday()));
                let end_of_week = start_of_week + Duration::days(6);
                date >= start_of_week && date <= end_of_week
            }
            DateFilter::ThisMonth => date.month() == today.month() && date.year() == today.year(),
        }
    }
}

impl FromStr for DateFilter {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_uppercase().as_str() {
            "ALL" => Ok(DateFilter::All),
            "TODAY" => Ok(DateFilter::Today),
            "THIS_WEEK" => Ok(DateFilter::ThisWeek),
            "THIS_MONTH" => Ok(DateFilter::ThisMonth),
            _ => Err(ValidationError::UnknownFilter(value.to_string())),
        }
    }
}

impl fmt::Display for DateFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Compute the visible subset of `appointments` under both filters.
/// Stable: surviving elements keep their relative order, no re-sort.
pub fn filter_appointments<'a>(
    appointments: &'a [Appointment],
    status: StatusFilter,
    date: DateFilter,
    now: NaiveDateTime,
) -> Vec<&'a Appointment> {
    let today = now.date();
    appointments
        .iter()
        .filter(|appointment| status.matches(appointment) && date.matches(appointment.date, today))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Action, AppointmentStatus, AppointmentType};
    use chrono::NaiveTime;

    fn appointment(id: i64, date: &str, time: &str, status: AppointmentStatus) -> Appointment {
        let action = Action {
            id,
            appointment_type: AppointmentType {
                id: 1,
                name: "Consultation".to_string(),
            },
            patient_id: 1,
            description: "Consultation".to_string(),
            total_payment: 50.0,
            start_date: date.parse().unwrap(),
            end_date: None,
            is_completed: false,
            completed_at: None,
        };
        Appointment::new(id, 1, date, time, action, status).unwrap()
    }

    fn at(date: &str, time: &str) -> NaiveDateTime {
        NaiveDateTime::new(
            date.parse::<NaiveDate>().unwrap(),
            NaiveTime::parse_from_str(time, "%H:%M").unwrap(),
        )
    }

    #[test]
    fn status_filter_matches_uppercased_label() {
        let waiting = appointment(1, "2026-03-02", "09:00", AppointmentStatus::Waiting);
        let confirmed = appointment(2, "2026-03-02", "09:30", AppointmentStatus::Confirmed);

        for filter in [
            StatusFilter::All,
            StatusFilter::Waiting,
            StatusFilter::Upcoming,
            StatusFilter::Completed,
        ] {
            let expected = filter == StatusFilter::All
                || waiting.status.label().to_uppercase() == filter.label();
            assert_eq!(filter.matches(&waiting), expected);
        }

        // Confirmed has no dedicated filter value; only ALL shows it.
        assert!(StatusFilter::All.matches(&confirmed));
        assert!(!StatusFilter::Waiting.matches(&confirmed));
        assert!(!StatusFilter::Completed.matches(&confirmed));
    }

    #[test]
    fn filters_parse_from_query_values() {
        assert_eq!("WAITING".parse::<StatusFilter>().unwrap(), StatusFilter::Waiting);
        assert_eq!("all".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("THIS_WEEK".parse::<DateFilter>().unwrap(), DateFilter::ThisWeek);
        assert!(matches!(
            "NEXT_WEEK".parse::<DateFilter>(),
            Err(ValidationError::UnknownFilter(_))
        ));
    }

    #[test]
    fn today_compares_at_day_granularity() {
        // Appointment at local midnight today is included even when "now"
        // is late in the evening; yesterday 23:59 is excluded at midnight.
        let midnight_today = appointment(1, "2026-03-02", "00:00", AppointmentStatus::Waiting);
        let yesterday_late = appointment(2, "2026-03-01", "23:59", AppointmentStatus::Waiting);

        assert!(DateFilter::Today.matches(midnight_today.date, at("2026-03-02", "23:59").date()));
        assert!(!DateFilter::Today.matches(yesterday_late.date, at("2026-03-02", "00:00").date()));
    }

    #[test]
    fn this_week_spans_sunday_through_saturday() {
        // 2026-03-04 is a Wednesday; its week is Sun 2026-03-01 through
        // Sat 2026-03-07.
        let today = "2026-03-04".parse::<NaiveDate>().unwrap();
        assert_eq!(today.weekday(), chrono::Weekday::Wed);

        for day in ["2026-03-01", "2026-03-04", "2026-03-07"] {
            assert!(DateFilter::ThisWeek.matches(day.parse().unwrap(), today), "{day}");
        }
        for day in ["2026-02-28", "2026-03-08"] {
            assert!(!DateFilter::ThisWeek.matches(day.parse().unwrap(), today), "{day}");
        }
    }

    #[test]
    fn this_month_matches_month_and_year() {
        let today = "2026-03-15".parse::<NaiveDate>().unwrap();
        assert!(DateFilter::ThisMonth.matches("2026-03-01".parse().unwrap(), today));
        assert!(DateFilter::ThisMonth.matches("2026-03-31".parse().unwrap(), today));
        assert!(!DateFilter::ThisMonth.matches("2026-02-28".parse().unwrap(), today));
        assert!(!DateFilter::ThisMonth.matches("2025-03-15".parse().unwrap(), today));
    }

    #[test]
    fn predicates_combine_with_logical_and() {
        let appointments = vec![
            appointment(1, "2026-03-02", "09:00", AppointmentStatus::Waiting),
            appointment(2, "2026-03-02", "10:00", AppointmentStatus::Completed),
            appointment(3, "2026-03-09", "09:00", AppointmentStatus::Waiting),
        ];
        let visible = filter_appointments(
            &appointments,
            StatusFilter::Waiting,
            DateFilter::Today,
            at("2026-03-02", "12:00"),
        );
        assert_eq!(visible.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn filtering_preserves_relative_order() {
        let appointments = vec![
            appointment(1, "2026-03-02", "09:00", AppointmentStatus::Waiting),
            appointment(2, "2026-03-02", "09:30", AppointmentStatus::Completed),
            appointment(3, "2026-03-02", "10:00", AppointmentStatus::Waiting),
        ];
        let visible = filter_appointments(
            &appointments,
            StatusFilter::Waiting,
            DateFilter::All,
            at("2026-03-02", "12:00"),
        );
        assert_eq!(visible.iter().map(|a| a.id).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn filtering_is_idempotent() {
        let appointments = vec![
            appointment(1, "2026-03-02", "09:00", AppointmentStatus::Waiting),
            appointment(2, "2026-03-05", "09:30", AppointmentStatus::Waiting),
            appointment(3, "2026-04-01", "10:00", AppointmentStatus::Completed),
        ];
        let now = at("2026-03-02", "12:00");

        let once: Vec<Appointment> =
            filter_appointments(&appointments, StatusFilter::Waiting, DateFilter::ThisWeek, now)
                .into_iter()
                .cloned()
                .collect();
        let twice = filter_appointments(&once, StatusFilter::Waiting, DateFilter::ThisWeek, now);

        assert_eq!(
            once.iter().map(|a| a.id).collect::<Vec<_>>(),
            twice.iter().map(|a| a.id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let visible = filter_appointments(
            &[],
            StatusFilter::Completed,
            DateFilter::ThisMonth,
            at("2026-03-02", "12:00"),
        );
        assert!(visible.is_empty());
    }
}
