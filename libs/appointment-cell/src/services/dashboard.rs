use std::sync::Arc;

use doctor_cell::DoctorService;
use patient_cell::PatientService;
use shared_database::{Query, RecordStore};

use crate::models::{Appointment, AppointmentError, AppointmentStatus, DashboardStats};

/// Headline counts for the admin dashboard.
pub struct DashboardService {
    appointments: Arc<dyn RecordStore<Appointment>>,
    patients: Arc<PatientService>,
    doctors: Arc<DoctorService>,
}

impl DashboardService {
    pub fn new(
        appointments: Arc<dyn RecordStore<Appointment>>,
        patients: Arc<PatientService>,
        doctors: Arc<DoctorService>,
    ) -> Self {
        Self {
            appointments,
            patients,
            doctors,
        }
    }

    pub async fn stats(&self) -> Result<DashboardStats, AppointmentError> {
        let scheduled = Query::new().eq("status", AppointmentStatus::Scheduled.as_str());

        Ok(DashboardStats {
            total_patients: self.patients.count_active().await?,
            total_doctors: self.doctors.count_active().await?,
            total_appointments: self.appointments.count(&Query::new()).await?,
            scheduled_appointments: self.appointments.count(&scheduled).await?,
        })
    }
}
