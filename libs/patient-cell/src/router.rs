use std::sync::Arc;

use axum::{routing::get, Router};

use crate::handlers::*;
use crate::services::PatientService;

pub fn patient_routes(service: Arc<PatientService>) -> Router {
    Router::new()
        .route("/", get(list_patients).post(create_patient))
        .route("/search", get(search_patients))
        .route(
            "/{id}",
            get(get_patient).put(update_patient).delete(delete_patient),
        )
        .with_state(service)
}
