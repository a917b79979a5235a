use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use shared_database::{Condition, Query, RecordStore, SortOrder, StoreError};
use shared_utils::Clock;

use crate::models::{CreatePatientRequest, Patient, PatientError, UpdatePatientRequest};

/// Answers whether a patient is still referenced by a non-cancelled appointment.
///
/// Implemented by the appointment cell; patients cannot be deactivated while
/// this returns true.
#[async_trait]
pub trait PatientReferences: Send + Sync {
    async fn patient_has_open_appointments(&self, patient_id: i64) -> Result<bool, StoreError>;
}

pub struct PatientService {
    patients: Arc<dyn RecordStore<Patient>>,
    references: Arc<dyn PatientReferences>,
    clock: Arc<dyn Clock>,
}

impl PatientService {
    pub fn new(
        patients: Arc<dyn RecordStore<Patient>>,
        references: Arc<dyn PatientReferences>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            patients,
            references,
            clock,
        }
    }

    /// All active patients, by name.
    pub async fn list_patients(&self) -> Result<Vec<Patient>, PatientError> {
        let query = Query::new()
            .eq("is_active", true)
            .order_by("name", SortOrder::Asc);
        Ok(self.patients.query(&query).await?)
    }

    pub async fn get_patient(&self, patient_id: i64) -> Result<Patient, PatientError> {
        debug!("Fetching patient: {}", patient_id);

        self.find_active(patient_id)
            .await?
            .ok_or(PatientError::NotFound(patient_id))
    }

    /// The patient if it exists and is active.
    pub async fn find_active(&self, patient_id: i64) -> Result<Option<Patient>, PatientError> {
        Ok(self
            .patients
            .get(patient_id)
            .await?
            .filter(|p| p.is_active))
    }

    /// The patient regardless of its active flag.
    pub async fn lookup(&self, patient_id: i64) -> Result<Option<Patient>, PatientError> {
        Ok(self.patients.get(patient_id).await?)
    }

    pub async fn create_patient(&self, request: CreatePatientRequest) -> Result<Patient, PatientError> {
        debug!("Creating new patient for: {}", request.email);

        request.validate()?;
        if request.date_of_birth > self.clock.today() {
            return Err(PatientError::InvalidDateOfBirth);
        }

        // Inactive patients keep their email reserved.
        if self.email_taken(&request.email, None).await? {
            warn!("Rejected patient registration, email {} already in use", request.email);
            return Err(PatientError::EmailAlreadyExists { email: request.email });
        }

        let patient = request.into_patient(self.clock.now());
        let created = self.patients.insert(patient).await?;

        info!("Patient created with ID: {}", created.id);
        Ok(created)
    }

    pub async fn update_patient(
        &self,
        patient_id: i64,
        request: UpdatePatientRequest,
    ) -> Result<Patient, PatientError> {
        debug!("Updating patient: {}", patient_id);

        request.validate()?;
        let mut patient = self.get_patient(patient_id).await?;

        if let Some(date_of_birth) = request.date_of_birth {
            if date_of_birth > self.clock.today() {
                return Err(PatientError::InvalidDateOfBirth);
            }
        }

        if let Some(email) = request.email.as_deref() {
            if email != patient.email && self.email_taken(email, Some(patient_id)).await? {
                warn!("Rejected email change for patient {}, {} already in use", patient_id, email);
                return Err(PatientError::EmailAlreadyExists { email: email.to_string() });
            }
        }

        if request.is_active == Some(false)
            && self.references.patient_has_open_appointments(patient_id).await?
        {
            warn!("Patient {} still has open appointments, refusing to deactivate", patient_id);
            return Err(PatientError::HasActiveAppointments);
        }

        request.apply_to(&mut patient);
        let updated = self.patients.update(patient).await?;

        info!("Patient {} updated", patient_id);
        Ok(updated)
    }

    /// Soft delete: the row stays, flagged inactive.
    pub async fn delete_patient(&self, patient_id: i64) -> Result<(), PatientError> {
        debug!("Deactivating patient: {}", patient_id);

        let mut patient = self.get_patient(patient_id).await?;

        if self.references.patient_has_open_appointments(patient_id).await? {
            warn!("Patient {} still has open appointments, refusing to deactivate", patient_id);
            return Err(PatientError::HasActiveAppointments);
        }

        patient.is_active = false;
        self.patients.update(patient).await?;

        info!("Patient {} deactivated", patient_id);
        Ok(())
    }

    /// Substring search over name, email and phone number among active patients.
    pub async fn search_patients(&self, term: &str) -> Result<Vec<Patient>, PatientError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(PatientError::ValidationError("Search term is required".to_string()));
        }
        debug!("Searching patients for: {}", term);

        let query = Query::new()
            .eq("is_active", true)
            .any_of(vec![
                Condition::Contains("name", term.to_string()),
                Condition::Contains("email", term.to_string()),
                Condition::Contains("phone_number", term.to_string()),
            ])
            .order_by("name", SortOrder::Asc);

        Ok(self.patients.query(&query).await?)
    }

    pub async fn count_active(&self) -> Result<usize, PatientError> {
        Ok(self.patients.count(&Query::new().eq("is_active", true)).await?)
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, PatientError> {
        let mut query = Query::new().eq("email", email);
        if let Some(id) = except {
            query = query.not_eq("id", id);
        }
        Ok(self.patients.exists(&query).await?)
    }
}
