use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use shared_models::error::AppError;

use crate::models::{
    CreateDoctorRequest, DoctorError, DoctorResponse, DoctorSearchQuery, UpdateDoctorRequest,
};
use crate::services::DoctorService;

impl From<DoctorError> for AppError {
    fn from(e: DoctorError) -> Self {
        match e {
            DoctorError::NotFound(_) => AppError::NotFound(e.to_string()),
            DoctorError::EmailAlreadyExists { .. } | DoctorError::LicenseAlreadyExists { .. } => {
                AppError::Conflict(e.to_string())
            }
            DoctorError::HasActiveAppointments => AppError::BadRequest(e.to_string()),
            DoctorError::ValidationError(msg) => AppError::ValidationError(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

fn to_responses(doctors: Vec<crate::models::Doctor>) -> Json<Vec<DoctorResponse>> {
    Json(doctors.into_iter().map(DoctorResponse::from).collect())
}

#[axum::debug_handler]
pub async fn list_doctors(
    State(service): State<Arc<DoctorService>>,
) -> Result<Json<Vec<DoctorResponse>>, AppError> {
    Ok(to_responses(service.list_doctors().await?))
}

#[axum::debug_handler]
pub async fn get_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = service.get_doctor(doctor_id).await?;
    Ok(Json(doctor.into()))
}

#[axum::debug_handler]
pub async fn create_doctor(
    State(service): State<Arc<DoctorService>>,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Response, AppError> {
    let doctor = service.create_doctor(request).await?;
    let location = format!("/api/doctors/{}", doctor.id);

    let body = Json(DoctorResponse::from(doctor));
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], body).into_response())
}

#[axum::debug_handler]
pub async fn update_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(doctor_id): Path<i64>,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<DoctorResponse>, AppError> {
    let doctor = service.update_doctor(doctor_id, request).await?;
    Ok(Json(doctor.into()))
}

#[axum::debug_handler]
pub async fn delete_doctor(
    State(service): State<Arc<DoctorService>>,
    Path(doctor_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service.delete_doctor(doctor_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn search_doctors(
    State(service): State<Arc<DoctorService>>,
    Query(query): Query<DoctorSearchQuery>,
) -> Result<Json<Vec<DoctorResponse>>, AppError> {
    let term = query.search_term.unwrap_or_default();
    Ok(to_responses(service.search_doctors(&term).await?))
}

#[axum::debug_handler]
pub async fn doctors_by_specialization(
    State(service): State<Arc<DoctorService>>,
    Path(specialization): Path<String>,
) -> Result<Json<Vec<DoctorResponse>>, AppError> {
    Ok(to_responses(
        service.doctors_by_specialization(&specialization).await?,
    ))
}
