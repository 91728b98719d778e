use actix_web::web;

use crate::api::handlers;

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api")
            .route("/appointments", web::get().to(handlers::list_appointments))
            .route("/appointments", web::post().to(handlers::create_appointment))
            .route(
                "/appointments/{id}/status",
                web::post().to(handlers::update_appointment_status),
            )
            .route("/patients", web::get().to(handlers::list_patients))
            .route("/patients", web::post().to(handlers::create_patient))
            .route("/patients/{id}", web::get().to(handlers::get_patient))
            .route(
                "/patients/{id}/payments",
                web::get().to(handlers::list_patient_payments),
            )
            .route("/payments", web::post().to(handlers::create_payment))
            .route(
                "/payments/{id}/status",
                web::post().to(handlers::update_payment_status),
            )
            .route("/billing/summary", web::get().to(handlers::billing_summary))
            .route("/audit", web::get().to(handlers::audit_trail)),
    );
}
