use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use shared_models::error::AppError;

use crate::models::{
    CreatePatientRequest, PatientError, PatientResponse, PatientSearchQuery, UpdatePatientRequest,
};
use crate::services::PatientService;

impl From<PatientError> for AppError {
    fn from(e: PatientError) -> Self {
        match e {
            PatientError::NotFound(_) => AppError::NotFound(e.to_string()),
            PatientError::EmailAlreadyExists { .. } => AppError::Conflict(e.to_string()),
            PatientError::HasActiveAppointments | PatientError::InvalidDateOfBirth => {
                AppError::BadRequest(e.to_string())
            }
            PatientError::ValidationError(msg) => AppError::ValidationError(msg),
            PatientError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn list_patients(
    State(service): State<Arc<PatientService>>,
) -> Result<Json<Vec<PatientResponse>>, AppError> {
    let patients = service.list_patients().await?;
    Ok(Json(patients.into_iter().map(PatientResponse::from).collect()))
}

#[axum::debug_handler]
pub async fn get_patient(
    State(service): State<Arc<PatientService>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = service.get_patient(patient_id).await?;
    Ok(Json(patient.into()))
}

#[axum::debug_handler]
pub async fn create_patient(
    State(service): State<Arc<PatientService>>,
    Json(request): Json<CreatePatientRequest>,
) -> Result<Response, AppError> {
    let patient = service.create_patient(request).await?;
    let location = format!("/api/patients/{}", patient.id);

    let body = Json(PatientResponse::from(patient));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], body).into_response())
}

#[axum::debug_handler]
pub async fn update_patient(
    State(service): State<Arc<PatientService>>,
    Path(patient_id): Path<i64>,
    Json(request): Json<UpdatePatientRequest>,
) -> Result<Json<PatientResponse>, AppError> {
    let patient = service.update_patient(patient_id, request).await?;
    Ok(Json(patient.into()))
}

#[axum::debug_handler]
pub async fn delete_patient(
    State(service): State<Arc<PatientService>>,
    Path(patient_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service.delete_patient(patient_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn search_patients(
    State(service): State<Arc<PatientService>>,
    Query(query): Query<PatientSearchQuery>,
) -> Result<Json<Vec<PatientResponse>>, AppError> {
    let term = query.search_term.unwrap_or_default();
    let patients = service.search_patients(&term).await?;
    Ok(Json(patients.into_iter().map(PatientResponse::from).collect()))
}
