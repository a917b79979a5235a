use std::sync::Arc;

use async_trait::async_trait;

use doctor_cell::DoctorReferences;
use patient_cell::PatientReferences;
use shared_database::{Query, RecordStore, StoreError};

use crate::models::{Appointment, AppointmentStatus};

/// Blocks deactivation of patients and doctors who still have
/// non-cancelled appointments.
#[derive(Clone)]
pub struct OpenAppointmentGuard {
    appointments: Arc<dyn RecordStore<Appointment>>,
}

impl OpenAppointmentGuard {
    pub fn new(appointments: Arc<dyn RecordStore<Appointment>>) -> Self {
        Self { appointments }
    }

    async fn any_open(&self, column: &'static str, id: i64) -> Result<bool, StoreError> {
        let query = Query::new()
            .eq(column, id)
            .not_eq("status", AppointmentStatus::Cancelled.as_str());
        self.appointments.exists(&query).await
    }
}

#[async_trait]
impl PatientReferences for OpenAppointmentGuard {
    async fn patient_has_open_appointments(&self, patient_id: i64) -> Result<bool, StoreError> {
        self.any_open("patient_id", patient_id).await
    }
}

#[async_trait]
impl DoctorReferences for OpenAppointmentGuard {
    async fn doctor_has_open_appointments(&self, doctor_id: i64) -> Result<bool, StoreError> {
        self.any_open("doctor_id", doctor_id).await
    }
}
