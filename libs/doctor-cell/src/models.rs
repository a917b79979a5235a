use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use shared_database::{Record, StoreError};
use shared_utils::Validator;

const NAME_MAX: usize = 100;
const SPECIALIZATION_MAX: usize = 100;
const LICENSE_MAX: usize = 50;
const EXPERIENCE_MIN: i32 = 0;
const EXPERIENCE_MAX: i32 = 50;

/// Stored doctor row (`doctors` table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub specialization: String,
    pub license_number: String,
    pub years_of_experience: i32,
    pub is_available: bool,
    pub hire_date: NaiveDateTime,
    pub is_active: bool,
}

impl Doctor {
    /// Active and taking appointments.
    pub fn is_bookable(&self) -> bool {
        self.is_active && self.is_available
    }
}

impl Record for Doctor {
    const TABLE: &'static str = "doctors";

    fn id(&self) -> i64 {
        self.id
    }

    fn set_id(&mut self, id: i64) {
        self.id = id;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub specialization: String,
    pub license_number: String,
    pub years_of_experience: i32,
    pub is_available: bool,
    pub hire_date: NaiveDateTime,
    pub is_active: bool,
}

impl From<Doctor> for DoctorResponse {
    fn from(doctor: Doctor) -> Self {
        Self {
            id: doctor.id,
            name: doctor.name,
            email: doctor.email,
            phone_number: doctor.phone_number,
            specialization: doctor.specialization,
            license_number: doctor.license_number,
            years_of_experience: doctor.years_of_experience,
            is_available: doctor.is_available,
            hire_date: doctor.hire_date,
            is_active: doctor.is_active,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDoctorRequest {
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub specialization: String,
    pub license_number: String,
    pub years_of_experience: i32,
}

impl CreateDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
        let mut v = Validator::new();
        v.required("Name", &self.name)
            .max_length("Name", &self.name, NAME_MAX)
            .required("Email", &self.email)
            .email(&self.email)
            .required("Phone number", &self.phone_number)
            .phone(&self.phone_number)
            .required("Specialization", &self.specialization)
            .max_length("Specialization", &self.specialization, SPECIALIZATION_MAX)
            .required("License number", &self.license_number)
            .max_length("License number", &self.license_number, LICENSE_MAX)
            .range(
                "Years of experience",
                self.years_of_experience,
                EXPERIENCE_MIN,
                EXPERIENCE_MAX,
            );
        v.finish().map_err(DoctorError::ValidationError)
    }

    /// New doctors start active and available.
    pub fn into_doctor(self, hired_at: NaiveDateTime) -> Doctor {
        Doctor {
            id: 0,
            name: self.name,
            email: self.email,
            phone_number: self.phone_number,
            specialization: self.specialization,
            license_number: self.license_number,
            years_of_experience: self.years_of_experience,
            is_available: true,
            hire_date: hired_at,
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDoctorRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
    pub specialization: Option<String>,
    pub license_number: Option<String>,
    pub years_of_experience: Option<i32>,
    pub is_available: Option<bool>,
    pub is_active: Option<bool>,
}

impl UpdateDoctorRequest {
    pub fn validate(&self) -> Result<(), DoctorError> {
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
        if let Some(specialization) = &self.specialization {
            v.required("Specialization", specialization)
                .max_length("Specialization", specialization, SPECIALIZATION_MAX);
        }
        if let Some(license) = &self.license_number {
            v.required("License number", license)
                .max_length("License number", license, LICENSE_MAX);
        }
        if let Some(years) = self.years_of_experience {
            v.range("Years of experience", years, EXPERIENCE_MIN, EXPERIENCE_MAX);
        }
        v.finish().map_err(DoctorError::ValidationError)
    }

    pub fn apply_to(self, doctor: &mut Doctor) {
        if let Some(name) = self.name {
            doctor.name = name;
        }
        if let Some(email) = self.email {
            doctor.email = email;
        }
        if let Some(phone_number) = self.phone_number {
            doctor.phone_number = phone_number;
        }
        if let Some(specialization) = self.specialization {
            doctor.specialization = specialization;
        }
        if let Some(license_number) = self.license_number {
            doctor.license_number = license_number;
        }
        if let Some(years) = self.years_of_experience {
            doctor.years_of_experience = years;
        }
        if let Some(is_available) = self.is_available {
            doctor.is_available = is_available;
        }
        if let Some(is_active) = self.is_active {
            doctor.is_active = is_active;
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DoctorSearchQuery {
    pub search_term: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor with ID {0} not found")]
    NotFound(i64),

    #[error("A doctor with this email already exists.")]
    EmailAlreadyExists { email: String },

    #[error("A doctor with this license number already exists.")]
    LicenseAlreadyExists { license_number: String },

    #[error("Cannot delete doctor with active appointments.")]
    HasActiveAppointments,

    #[error("{0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}

impl From<StoreError> for DoctorError {
    fn from(e: StoreError) -> Self {
        DoctorError::DatabaseError(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn request() -> CreateDoctorRequest {
        CreateDoctorRequest {
            name: "Dr. Gregory House".into(),
            email: "house@ppth.org".into(),
            phone_number: "609-555-0142".into(),
            specialization: "Diagnostics".into(),
            license_number: "NJ-88213".into(),
            years_of_experience: 20,
        }
    }

    fn hired() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2020, 1, 6)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap()
    }

    #[test]
    fn experience_must_be_within_range() {
        let mut bad = request();
        bad.years_of_experience = 51;

        match bad.validate() {
            Err(DoctorError::ValidationError(message)) => {
                assert_eq!(message, "Years of experience must be between 0 and 50");
            }
            other => panic!("expected validation error, got {:?}", other),
        }

        bad.years_of_experience = -1;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn license_number_is_bounded() {
        let mut bad = request();
        bad.license_number = "L".repeat(51);
        assert!(bad.validate().is_err());
        assert!(request().validate().is_ok());
    }

    #[test]
    fn new_doctor_is_bookable() {
        let doctor = request().into_doctor(hired());
        assert!(doctor.is_bookable());
        assert_eq!(doctor.hire_date, hired());
    }

    #[test]
    fn patch_can_take_doctor_off_the_schedule() {
        let mut doctor = request().into_doctor(hired());

        UpdateDoctorRequest {
            is_available: Some(false),
            ..Default::default()
        }
        .apply_to(&mut doctor);

        assert!(doctor.is_active);
        assert!(!doctor.is_bookable());
        assert_eq!(doctor.specialization, "Diagnostics");
    }

    #[test]
    fn reads_stored_row() {
        let row = shared_utils::test_utils::MockSupabaseResponses::doctor_row(
            3,
            "house@ppth.org",
            "Dr. Gregory House",
            "Diagnostics",
        );
        let doctor: Doctor = serde_json::from_value(row).unwrap();
        assert_eq!(doctor.license_number, "LIC-3");
        assert_eq!(doctor.years_of_experience, 10);
        assert!(doctor.is_bookable());
    }
}
