use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::services::{AppointmentService, DashboardService};

pub fn appointment_routes(service: Arc<AppointmentService>) -> Router {
    Router::new()
        .route("/", get(list_appointments).post(create_appointment))
        .route("/search", get(search_appointments))
        .route("/availability", get(check_availability))
        .route("/patient/{patient_id}", get(patient_appointments))
        .route("/doctor/{doctor_id}", get(doctor_appointments))
        .route(
            "/{id}",
            get(get_appointment)
                .put(update_appointment)
                .delete(delete_appointment),
        )
        .with_state(service)
}

pub fn dashboard_routes(service: Arc<DashboardService>) -> Router {
    Router::new()
        .route("/", get(dashboard_stats))
        .with_state(service)
}
