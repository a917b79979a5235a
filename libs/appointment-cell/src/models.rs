use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use shared_database::{Record, StoreError};
use shared_utils::Validator;

// ==============================================================================
// CORE APPOINTMENT MODELS
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum AppointmentStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

impl AppointmentStatus {
    /// Stored and wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Scheduled => "Scheduled",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Cancelled => "Cancelled",
        }
    }

    /// Cancelled appointments do not hold their slot.
    pub fn holds_slot(&self) -> bool {
        !matches!(self, AppointmentStatus::Cancelled)
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored appointment row (`appointments` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    #[serde(with = "shared_utils::time_format")]
    pub appointment_time: NaiveTime,
    pub appointment_type: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_date: NaiveDateTime,
}

impl Record for Appointment {
    const TABLE: &'static str = "appointments";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

/// Appointment as returned by the API, with patient and doctor names resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentResponse {
    pub id: i64,
    pub patient_id: i64,
    pub patient_name: String,
    pub doctor_id: i64,
    pub doctor_name: String,
    pub appointment_date: NaiveDate,
    #[serde(with = "shared_utils::time_format")]
    pub appointment_time: NaiveTime,
    pub appointment_type: String,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    pub created_date: NaiveDateTime,
}

impl AppointmentResponse {
    pub fn new(appointment: Appointment, patient_name: String, doctor_name: String) -> Self {
        Self {
            id: appointment.id,
            patient_id: appointment.patient_id,
            patient_name,
            doctor_id: appointment.doctor_id,
            doctor_name,
            appointment_date: appointment.appointment_date,
            appointment_time: appointment.appointment_time,
            appointment_type: appointment.appointment_type,
            symptoms: appointment.symptoms,
            diagnosis: appointment.diagnosis,
            prescription: appointment.prescription,
            status: appointment.status,
            notes: appointment.notes,
            created_date: appointment.created_date,
        }
    }
}

// ==============================================================================
// REQUEST MODELS
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentRequest {
    pub patient_id: i64,
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    #[serde(with = "shared_utils::time_format")]
    pub appointment_time: NaiveTime,
    pub appointment_type: String,
    pub symptoms: Option<String>,
    pub notes: Option<String>,
}

impl CreateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        let mut v = Validator::new();
        v.required("Appointment type", &self.appointment_type);
        v.finish().map_err(AppointmentError::ValidationError)
    }

    /// A new booking is always `Scheduled`.
    pub fn into_appointment(self, created_at: NaiveDateTime) -> Appointment {
        Appointment {
            id: 0,
            patient_id: self.patient_id,
            doctor_id: self.doctor_id,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time,
            appointment_type: self.appointment_type,
            symptoms: self.symptoms,
            diagnosis: None,
            prescription: None,
            status: AppointmentStatus::Scheduled,
            notes: self.notes,
            created_date: created_at,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAppointmentRequest {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub appointment_date: Option<NaiveDate>,
    #[serde(default, with = "shared_utils::time_format::option")]
    pub appointment_time: Option<NaiveTime>,
    pub appointment_type: Option<String>,
    pub symptoms: Option<String>,
    pub diagnosis: Option<String>,
    pub prescription: Option<String>,
    pub status: Option<AppointmentStatus>,
    pub notes: Option<String>,
}

impl UpdateAppointmentRequest {
    pub fn validate(&self) -> Result<(), AppointmentError> {
        let mut v = Validator::new();
        if let Some(kind) = &self.appointment_type {
            v.required("Appointment type", kind);
        }
        v.finish().map_err(AppointmentError::ValidationError)
    }

    /// Whether the patch moves the appointment in time.
    pub fn reschedules(&self) -> bool {
        self.appointment_date.is_some() || self.appointment_time.is_some()
    }

    pub fn apply_to(self, appointment: &mut Appointment) {
        if let Some(patient_id) = self.patient_id {
            appointment.patient_id = patient_id;
        }
        if let Some(doctor_id) = self.doctor_id {
            appointment.doctor_id = doctor_id;
        }
        if let Some(date) = self.appointment_date {
            appointment.appointment_date = date;
        }
        if let Some(time) = self.appointment_time {
            appointment.appointment_time = time;
        }
        if let Some(kind) = self.appointment_type {
            appointment.appointment_type = kind;
        }
        if let Some(symptoms) = self.symptoms {
            appointment.symptoms = Some(symptoms);
        }
        if let Some(diagnosis) = self.diagnosis {
            appointment.diagnosis = Some(diagnosis);
        }
        if let Some(prescription) = self.prescription {
            appointment.prescription = Some(prescription);
        }
        if let Some(status) = self.status {
            appointment.status = status;
        }
        if let Some(notes) = self.notes {
            appointment.notes = Some(notes);
        }
    }
}

/// Filters for `GET /api/appointments/search`. All present filters must hold.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppointmentSearchQuery {
    pub patient_id: Option<i64>,
    pub doctor_id: Option<i64>,
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    pub appointment_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityQuery {
    pub doctor_id: i64,
    pub appointment_date: NaiveDate,
    #[serde(with = "shared_utils::time_format")]
    pub appointment_time: NaiveTime,
    pub exclude_appointment_id: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_patients: usize,
    pub total_doctors: usize,
    pub total_appointments: usize,
    pub scheduled_appointments: usize,
}

// ==============================================================================
// ERROR TYPES
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment with ID {0} not found")]
    NotFound(i64),

    #[error("Patient not found or inactive.")]
    PatientNotFound,

    #[error("Doctor not found, inactive, or unavailable.")]
    DoctorNotAvailable,

    #[error("Appointment date cannot be in the past.")]
    DateInPast,

    #[error("The selected time slot is not available.")]
    SlotNotAvailable,

    #[error("Cannot delete past or current appointments.")]
    CannotDeletePast,

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for AppointmentError {
    fn from(e: StoreError) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

impl From<patient_cell::PatientError> for AppointmentError {
    fn from(e: patient_cell::PatientError) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}

impl From<doctor_cell::DoctorError> for AppointmentError {
    fn from(e: doctor_cell::DoctorError) -> Self {
        AppointmentError::DatabaseError(e.to_string())
    }
}
