use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use shared_database::{Record, StoreError};
use shared_utils::Validator;

const NAME_MAX: usize = 100;
const ADDRESS_MAX: usize = 200;

/// Stored patient row (`patients` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub registration_date: NaiveDateTime,
    pub is_active: bool,
}

impl Record for Patient {
    const TABLE: &'static str = "patients";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub address: String,
    pub medical_history: Option<String>,
    pub registration_date: NaiveDateTime,
    pub is_active: bool,
}

impl From<Patient> for PatientResponse {
    fn from(patient: Patient) -> Self {
        Self {
            id: patient.id,
            name: patient.name,
            email: patient.email,
            phone_number: patient.phone_number,
            date_of_birth: patient.date_of_birth,
            gender: patient.gender,
            address: patient.address,
            medical_history: patient.medical_history,
            registration_date: patient.registration_date,
            is_active: patient.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePatientRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub date_of_birth: NaiveDate,
    pub gender: String,
    pub address: String,
    pub medical_history: Option<String>,
}

impl CreatePatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        let mut v = Validator::new();
        v.required("Name", &self.name)
            .max_length("Name", &self.name, NAME_MAX)
            .required("Email", &self.email)
            .email(&self.email)
            .required("Phone number", &self.phone_number)
            .phone(&self.phone_number)
            .required("Gender", &self.gender)
            .required("Address", &self.address)
            .max_length("Address", &self.address, ADDRESS_MAX);
        v.finish().map_err(PatientError::ValidationError)
    }

    /// New active record; the store assigns the id.
    pub fn into_patient(self, registered_at: NaiveDateTime) -> Patient {
        Patient {
            id: 0,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            date_of_birth: self.date_of_birth,
            gender: self.gender,
            address: self.address,
            medical_history: self.medical_history,
            registration_date: registered_at,
            is_active: true,
        }
    }
}

/// Partial update: only the fields that are present change.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePatientRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
    pub gender: Option<String>,
    pub address: Option<String>,
    pub medical_history: Option<String>,
    pub is_active: Option<bool>,
}

impl UpdatePatientRequest {
    pub fn validate(&self) -> Result<(), PatientError> {
        let mut v = Validator::new();
        if let Some(name) = &self.name {
            v.required("Name", name).max_length("Name", name, NAME_MAX);
        }
        if let Some(email) = &self.email {
            v.required("Email", email).email(email);
        }
        if let Some(phone) = &self.phone_number {
            v.required("Phone number", phone).phone(phone);
        }
        if let Some(gender) = &self.gender {
            v.required("Gender", gender);
        }
        if let Some(address) = &self.address {
            v.required("Address", address).max_length("Address", address, ADDRESS_MAX);
        }
        v.finish().map_err(PatientError::ValidationError)
    }

    pub fn apply_to(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(email) = self.email {
            patient.email = email;
        }
        if let Some(phone_number) = self.phone_number {
            patient.phone_number = phone_number;
        }
        if let Some(date_of_birth) = self.date_of_birth {
            patient.date_of_birth = date_of_birth;
        }
        if let Some(gender) = self.gender {
            patient.gender = gender;
        }
        if let Some(address) = self.address {
            patient.address = address;
        }
        if let Some(medical_history) = self.medical_history {
            patient.medical_history = Some(medical_history);
        }
        if let Some(is_active) = self.is_active {
            patient.is_active = is_active;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientSearchQuery {
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum PatientError {
    #[error("Patient with ID {0} not found")]
    NotFound(i64),

    #[error("A patient with this email already exists.")]
    EmailAlreadyExists { email: String },

    #[error("Cannot delete patient with active appointments.")]
    HasActiveAppointments,

    #[error("Date of birth cannot be in the future")]
    InvalidDateOfBirth,

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for PatientError {
    fn from(e: StoreError) -> Self {
        PatientError::DatabaseError(e.to_string())
    }
}
