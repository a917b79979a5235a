use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::services::DoctorService;

pub fn doctor_routes(service: Arc<DoctorService>) -> Router {
    Router::new()
        .route("/", get(list_doctors).post(create_doctor))
        .route("/search", get(search_doctors))
        .route(
            "/specialization/{specialization}",
            get(doctors_by_specialization),
        )
        .route(
            "/{id}",
            get(get_doctor).put(update_doctor).delete(delete_doctor),
        )
        .with_state(service)
}
