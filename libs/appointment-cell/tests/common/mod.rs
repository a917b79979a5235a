#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveTime};

use appointment_cell::models::{Appointment, CreateAppointmentRequest};
use appointment_cell::services::{AppointmentService, DashboardService, OpenAppointmentGuard};
use doctor_cell::models::{CreateDoctorRequest, Doctor};
use doctor_cell::DoctorService;
use patient_cell::models::{CreatePatientRequest, Patient};
use patient_cell::PatientService;
use shared_database::{MemoryStore, RecordStore};
use shared_utils::test_utils::{fixed_clock, reference_now};
use shared_utils::FixedClock;

/// All services wired over in-memory tables, with the clock at
/// `reference_now()` (2025-06-02 09:00).
pub struct Hospital {
    pub clock: Arc<FixedClock>,
    pub patients: Arc<PatientService>,
    pub doctors: Arc<DoctorService>,
    pub appointments: Arc<AppointmentService>,
    pub dashboard: Arc<DashboardService>,
}

impl Hospital {
    pub fn new() -> Self {
        let clock = fixed_clock();
        let appointment_store: Arc<dyn RecordStore<Appointment>> =
            Arc::new(MemoryStore::<Appointment>::new());
        let guard = Arc::new(OpenAppointmentGuard::new(appointment_store.clone()));

        let patients = Arc::new(PatientService::new(
            Arc::new(MemoryStore::<Patient>::new()),
            guard.clone(),
            clock.clone(),
        ));
        let doctors = Arc::new(DoctorService::new(
            Arc::new(MemoryStore::<Doctor>::new()),
            guard,
            clock.clone(),
        ));
        let appointments = Arc::new(AppointmentService::new(
            appointment_store.clone(),
            patients.clone(),
            doctors.clone(),
            clock.clone(),
        ));
        let dashboard = Arc::new(DashboardService::new(
            appointment_store,
            patients.clone(),
            doctors.clone(),
        ));

        Self {
            clock,
            patients,
            doctors,
            appointments,
            dashboard,
        }
    }

    pub async fn patient(&self, name: &str, email: &str) -> Patient {
        self.patients
            .create_patient(CreatePatientRequest {
                name: name.to_string(),
                email: email.to_string(),
                phone_number: "555-0100".to_string(),
                date_of_birth: NaiveDate::from_ymd_opt(1980, 2, 29).unwrap(),
                gender: "Other".to_string(),
                address: "1 Hospital Road".to_string(),
                medical_history: None,
            })
            .await
            .unwrap()
    }

    pub async fn doctor(&self, name: &str, email: &str, license: &str) -> Doctor {
        self.doctors
            .create_doctor(CreateDoctorRequest {
                name: name.to_string(),
                email: email.to_string(),
                phone_number: "555-0200".to_string(),
                specialization: "Cardiology".to_string(),
                license_number: license.to_string(),
                years_of_experience: 8,
            })
            .await
            .unwrap()
    }
}

pub fn today() -> NaiveDate {
    reference_now().date()
}

pub fn tomorrow() -> NaiveDate {
    today() + Duration::days(1)
}

pub fn at(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

pub fn booking(patient_id: i64, doctor_id: i64, date: NaiveDate, time: NaiveTime) -> CreateAppointmentRequest {
    CreateAppointmentRequest {
        patient_id,
        doctor_id,
        appointment_date: date,
        appointment_time: time,
        appointment_type: "Consultation".to_string(),
        symptoms: None,
        notes: None,
    }
}
