use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use shared_database::{Condition, Query, RecordStore, SortOrder, StoreError};
use shared_utils::Clock;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, UpdateDoctorRequest};

/// Answers whether a doctor still has non-cancelled appointments.
#[async_trait]
pub trait DoctorReferences: Send + Sync {
    async fn doctor_has_open_appointments(&self, doctor_id: i64) -> Result<bool, StoreError>;
}

pub struct DoctorService {
    doctors: Arc<dyn RecordStore<Doctor>>,
    references: Arc<dyn DoctorReferences>,
    clock: Arc<dyn Clock>,
}

impl DoctorService {
    pub fn new(
        doctors: Arc<dyn RecordStore<Doctor>>,
        references: Arc<dyn DoctorReferences>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            doctors,
            references,
            clock,
        }
    }

    pub async fn list_doctors(&self) -> Result<Vec<Doctor>, DoctorError> {
        let query = Query::new()
            .eq("is_active", true)
            .order_by("name", SortOrder::Asc);
        Ok(self.doctors.query(&query).await?)
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor: {}", doctor_id);

        self.doctors
            .get(doctor_id)
            .await?
            .filter(|d| d.is_active)
            .ok_or(DoctorError::NotFound(doctor_id))
    }

    /// The doctor if it is active and accepting appointments.
    pub async fn find_bookable(&self, doctor_id: i64) -> Result<Option<Doctor>, DoctorError> {
        Ok(self
            .doctors
            .get(doctor_id)
            .await?
            .filter(Doctor::is_bookable))
    }

    pub async fn lookup(&self, doctor_id: i64) -> Result<Option<Doctor>, DoctorError> {
        Ok(self.doctors.get(doctor_id).await?)
    }

    pub async fn create_doctor(&self, request: CreateDoctorRequest) -> Result<Doctor, DoctorError> {
        debug!("Creating new doctor: {}", request.email);

        request.validate()?;
        self.ensure_unique(&request.email, &request.license_number, None)
            .await?;

        let doctor = request.into_doctor(self.clock.now());
        let created = self.doctors.insert(doctor).await?;

        info!("Doctor created with ID: {}", created.id);
        Ok(created)
    }

    pub async fn update_doctor(
        &self,
        doctor_id: i64,
        request: UpdateDoctorRequest,
    ) -> Result<Doctor, DoctorError> {
        debug!("Updating doctor: {}", doctor_id);

        request.validate()?;
        let mut doctor = self.get_doctor(doctor_id).await?;

        let email = request.email.as_deref().filter(|e| *e != doctor.email);
        if let Some(email) = email {
            if self.email_taken(email, Some(doctor_id)).await? {
                warn!("Rejected email change for doctor {}, {} already in use", doctor_id, email);
                return Err(DoctorError::EmailAlreadyExists { email: email.to_string() });
            }
        }

        let license = request
            .license_number
            .as_deref()
            .filter(|l| *l != doctor.license_number);
        if let Some(license) = license {
            if self.license_taken(license, Some(doctor_id)).await? {
                return Err(DoctorError::LicenseAlreadyExists {
                    license_number: license.to_string(),
                });
            }
        }

        if request.is_active == Some(false)
            && self.references.doctor_has_open_appointments(doctor_id).await?
        {
            warn!("Doctor {} still has open appointments, refusing to deactivate", doctor_id);
            return Err(DoctorError::HasActiveAppointments);
        }

        request.apply_to(&mut doctor);
        let updated = self.doctors.update(doctor).await?;

        info!("Doctor {} updated", doctor_id);
        Ok(updated)
    }

    pub async fn delete_doctor(&self, doctor_id: i64) -> Result<(), DoctorError> {
        debug!("Deactivating doctor: {}", doctor_id);

        let mut doctor = self.get_doctor(doctor_id).await?;

        if self.references.doctor_has_open_appointments(doctor_id).await? {
            warn!("Doctor {} still has open appointments, refusing to deactivate", doctor_id);
            return Err(DoctorError::HasActiveAppointments);
        }

        doctor.is_active = false;
        self.doctors.update(doctor).await?;

        info!("Doctor {} deactivated", doctor_id);
        Ok(())
    }

    pub async fn search_doctors(&self, term: &str) -> Result<Vec<Doctor>, DoctorError> {
        let term = term.trim();
        if term.is_empty() {
            return Err(DoctorError::ValidationError("Search term is required".to_string()));
        }

        let query = Query::new()
            .eq("is_active", true)
            .any_of(
                ["name", "email", "phone_number", "specialization"]
                    .into_iter()
                    .map(|field| Condition::Contains(field, term.to_string()))
                    .collect(),
            )
            .order_by("name", SortOrder::Asc);

        Ok(self.doctors.query(&query).await?)
    }

    /// Active doctors whose specialization contains `specialization`.
    pub async fn doctors_by_specialization(
        &self,
        specialization: &str,
    ) -> Result<Vec<Doctor>, DoctorError> {
        let specialization = specialization.trim();
        if specialization.is_empty() {
            return Err(DoctorError::ValidationError(
                "Specialization is required".to_string(),
            ));
        }

        let query = Query::new()
            .eq("is_active", true)
            .contains("specialization", specialization)
            .order_by("name", SortOrder::Asc);

        Ok(self.doctors.query(&query).await?)
    }

    pub async fn count_active(&self) -> Result<usize, DoctorError> {
        Ok(self.doctors.count(&Query::new().eq("is_active", true)).await?)
    }

    async fn ensure_unique(
        &self,
        email: &str,
        license_number: &str,
        except: Option<i64>,
    ) -> Result<(), DoctorError> {
        if self.email_taken(email, except).await? {
            warn!("Rejected doctor registration, email {} already in use", email);
            return Err(DoctorError::EmailAlreadyExists { email: email.to_string() });
        }
        if self.license_taken(license_number, except).await? {
            warn!("Rejected doctor registration, license {} already in use", license_number);
            return Err(DoctorError::LicenseAlreadyExists {
                license_number: license_number.to_string(),
            });
        }
        Ok(())
    }

    async fn email_taken(&self, email: &str, except: Option<i64>) -> Result<bool, DoctorError> {
        self.taken(Query::new().eq("email", email), except).await
    }

    async fn license_taken(&self, license: &str, except: Option<i64>) -> Result<bool, DoctorError> {
        self.taken(Query::new().eq("license_number", license), except).await
    }

    async fn taken(&self, mut query: Query, except: Option<i64>) -> Result<bool, DoctorError> {
        if let Some(id) = except {
            query = query.not_eq("id", id);
        }
        Ok(self.doctors.exists(&query).await?)
    }
}
