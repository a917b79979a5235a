use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use shared_models::error::AppError;

use crate::models::{
    AppointmentError, AppointmentResponse, AppointmentSearchQuery, AvailabilityQuery,
    CreateAppointmentRequest, DashboardStats, UpdateAppointmentRequest,
};
use crate::services::{AppointmentService, DashboardService};

impl From<AppointmentError> for AppError {
    fn from(e: AppointmentError) -> Self {
        match e {
            AppointmentError::NotFound(_) => AppError::NotFound(e.to_string()),
            AppointmentError::SlotNotAvailable => AppError::Conflict(e.to_string()),
            AppointmentError::PatientNotFound
            | AppointmentError::DoctorNotAvailable
            | AppointmentError::DateInPast
            | AppointmentError::CannotDeletePast => AppError::BadRequest(e.to_string()),
            AppointmentError::ValidationError(msg) => AppError::ValidationError(msg),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(service): State<Arc<AppointmentService>>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    Ok(Json(service.list_appointments().await?))
}

#[axum::debug_handler]
pub async fn get_appointment(
    State(service): State<Arc<AppointmentService>>,
    Path(appointment_id): Path<i64>,
) -> Result<Json<AppointmentResponse>, AppError> {
    Ok(Json(service.get_appointment(appointment_id).await?))
}

#[axum::debug_handler]
pub async fn create_appointment(
    State(service): State<Arc<AppointmentService>>,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Response, AppError> {
    let appointment = service.create_appointment(request).await?;
    let location = format!("/api/appointments/{}", appointment.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(appointment)).into_response())
}

#[axum::debug_handler]
pub async fn update_appointment(
    State(service): State<Arc<AppointmentService>>,
    Path(appointment_id): Path<i64>,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<AppointmentResponse>, AppError> {
    Ok(Json(service.update_appointment(appointment_id, request).await?))
}

#[axum::debug_handler]
pub async fn delete_appointment(
    State(service): State<Arc<AppointmentService>>,
    Path(appointment_id): Path<i64>,
) -> Result<StatusCode, AppError> {
    service.delete_appointment(appointment_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[axum::debug_handler]
pub async fn patient_appointments(
    State(service): State<Arc<AppointmentService>>,
    Path(patient_id): Path<i64>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    Ok(Json(service.appointments_for_patient(patient_id).await?))
}

#[axum::debug_handler]
pub async fn doctor_appointments(
    State(service): State<Arc<AppointmentService>>,
    Path(doctor_id): Path<i64>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    Ok(Json(service.appointments_for_doctor(doctor_id).await?))
}

#[axum::debug_handler]
pub async fn search_appointments(
    State(service): State<Arc<AppointmentService>>,
    Query(query): Query<AppointmentSearchQuery>,
) -> Result<Json<Vec<AppointmentResponse>>, AppError> {
    Ok(Json(service.search_appointments(query).await?))
}

#[axum::debug_handler]
pub async fn check_availability(
    State(service): State<Arc<AppointmentService>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<bool>, AppError> {
    Ok(Json(service.check_availability(query).await?))
}

#[axum::debug_handler]
pub async fn dashboard_stats(
    State(service): State<Arc<DashboardService>>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(service.stats().await?))
}
