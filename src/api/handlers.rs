use std::str::FromStr;

use actix_web::{web, HttpResponse};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::api::AppState;
use crate::core::billing;
use crate::core::drafts::{AppointmentDraft, PaymentDraft};
use crate::core::filter::{filter_appointments, DateFilter, StatusFilter};
use crate::error::StoreError;
use crate::models::{Appointment, AppointmentStatus, PaymentStatus, UserProfile};

fn bad_request(message: impl ToString) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({ "error": message.to_string() }))
}

fn store_error(err: StoreError) -> HttpResponse {
    match &err {
        StoreError::UnknownPatient(_)
        | StoreError::UnknownAppointment(_)
        | StoreError::UnknownPayment(_) => {
            HttpResponse::NotFound().json(json!({ "error": err.to_string() }))
        }
        StoreError::Validation(_) | StoreError::InvalidTransition { .. } => bad_request(&err),
        _ => {
            error!("request failed: {err}");
            HttpResponse::InternalServerError().json(json!({ "error": "internal error" }))
        }
    }
}

// ===== Appointments =====

#[derive(Debug, Deserialize)]
pub struct AppointmentQuery {
    pub status: Option<String>,
    pub date: Option<String>,
}

pub async fn list_appointments(
    state: web::Data<AppState>,
    query: web::Query<AppointmentQuery>,
) -> HttpResponse {
    let status = match query.status.as_deref().map(StatusFilter::from_str).transpose() {
        Ok(status) => status.unwrap_or_default(),
        Err(err) => return bad_request(err),
    };
    let date = match query.date.as_deref().map(DateFilter::from_str).transpose() {
        Ok(date) => date.unwrap_or_default(),
        Err(err) => return bad_request(err),
    };

    match state.store.list_appointments().await {
        Ok(appointments) => {
            // The clock is read once, at the edge; the engine itself stays pure.
            let now = Local::now().naive_local();
            let visible: Vec<Appointment> = filter_appointments(&appointments, status, date, now)
                .into_iter()
                .cloned()
                .collect();
            HttpResponse::Ok().json(visible)
        }
        Err(err) => store_error(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAppointmentBody {
    pub patient_id: i64,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub notes: String,
}

pub async fn create_appointment(
    state: web::Data<AppState>,
    body: web::Json<CreateAppointmentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let draft = AppointmentDraft {
        date: body.date,
        time: body.time,
        notes: body.notes,
    };
    let request = match draft.validate(body.patient_id) {
        Ok(request) => request,
        Err(err) => return bad_request(err),
    };
    match state.store.create_appointment(request).await {
        Ok(appointment) => HttpResponse::Created().json(appointment),
        Err(err) => store_error(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
    pub status: String,
}

pub async fn update_appointment_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<StatusBody>,
) -> HttpResponse {
    let next = match AppointmentStatus::from_str(&body.status) {
        Ok(status) => status,
        Err(err) => return bad_request(err),
    };
    match state
        .store
        .update_appointment_status(path.into_inner(), next)
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => store_error(err),
    }
}

// ===== Patients =====

#[derive(Debug, Deserialize)]
pub struct CreatePatientBody {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub email: String,
    pub phone: String,
    pub gender: String,
    pub medical_history: Option<String>,
}

pub async fn create_patient(
    state: web::Data<AppState>,
    body: web::Json<CreatePatientBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let profile = UserProfile {
        first_name: body.first_name,
        last_name: body.last_name,
        date_of_birth: body.date_of_birth,
        email: body.email,
        phone: body.phone,
        gender: body.gender,
    };
    match state.store.create_patient(profile, body.medical_history).await {
        Ok(patient) => HttpResponse::Created().json(patient),
        Err(err) => store_error(err),
    }
}

pub async fn list_patients(state: web::Data<AppState>) -> HttpResponse {
    match state.store.list_patients().await {
        Ok(patients) => HttpResponse::Ok().json(patients),
        Err(err) => store_error(err),
    }
}

pub async fn get_patient(state: web::Data<AppState>, path: web::Path<i64>) -> HttpResponse {
    let id = path.into_inner();
    match state.store.get_patient(id).await {
        Ok(Some(patient)) => HttpResponse::Ok().json(patient),
        Ok(None) => HttpResponse::NotFound().json(json!({ "error": format!("patient {id} does not exist") })),
        Err(err) => store_error(err),
    }
}

pub async fn list_patient_payments(
    state: web::Data<AppState>,
    path: web::Path<i64>,
) -> HttpResponse {
    match state.store.list_payments_for_patient(path.into_inner()).await {
        Ok(payments) => HttpResponse::Ok().json(payments),
        Err(err) => store_error(err),
    }
}

// ===== Payments =====

#[derive(Debug, Deserialize)]
pub struct CreatePaymentBody {
    pub patient_id: i64,
    pub doctor_id: i64,
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub description: String,
}

pub async fn create_payment(
    state: web::Data<AppState>,
    body: web::Json<CreatePaymentBody>,
) -> HttpResponse {
    let body = body.into_inner();
    let draft = PaymentDraft {
        amount: body.amount,
        date: body.date,
        time: body.time,
        description: body.description,
    };
    let request = match draft.validate(body.patient_id, body.doctor_id) {
        Ok(request) => request,
        Err(err) => return bad_request(err),
    };
    match state.store.create_payment(request).await {
        Ok(payment) => HttpResponse::Created().json(payment),
        Err(err) => store_error(err),
    }
}

pub async fn update_payment_status(
    state: web::Data<AppState>,
    path: web::Path<i64>,
    body: web::Json<StatusBody>,
) -> HttpResponse {
    let next = match PaymentStatus::from_str(&body.status) {
        Ok(status) => status,
        Err(err) => return bad_request(err),
    };
    match state
        .store
        .update_payment_status(path.into_inner(), next)
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(err) => store_error(err),
    }
}

// ===== Billing =====

pub async fn billing_summary(state: web::Data<AppState>) -> HttpResponse {
    match state.store.list_payments().await {
        Ok(payments) => HttpResponse::Ok().json(billing::cash_flow(&payments)),
        Err(err) => store_error(err),
    }
}

#[derive(Debug, Deserialize)]
pub struct AuditQuery {
    pub limit: Option<i64>,
}

pub async fn audit_trail(
    state: web::Data<AppState>,
    query: web::Query<AuditQuery>,
) -> HttpResponse {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    match state.store.audit_trail(limit).await {
        Ok(entries) => HttpResponse::Ok().json(entries),
        Err(err) => store_error(err),
    }
}
