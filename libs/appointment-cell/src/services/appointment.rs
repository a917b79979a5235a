use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use doctor_cell::DoctorService;
use patient_cell::PatientService;
use shared_database::{Query, RecordStore, SortOrder};
use shared_utils::Clock;

use crate::models::{
    Appointment, AppointmentError, AppointmentResponse, AppointmentSearchQuery,
    AvailabilityQuery, CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::availability::AvailabilityService;

/// Books, reschedules and removes appointments.
///
/// Availability checks and the writes that depend on them run under
/// `booking`, so two requests in this process cannot both claim a slot.
/// Separate processes sharing one database are not covered; that needs a
/// constraint in the database itself.
pub struct AppointmentService {
    appointments: Arc<dyn RecordStore<Appointment>>,
    availability: AvailabilityService,
    patients: Arc<PatientService>,
    doctors: Arc<DoctorService>,
    clock: Arc<dyn Clock>,
    booking: Mutex<()>,
}

impl AppointmentService {
    pub fn new(
        appointments: Arc<dyn RecordStore<Appointment>>,
        patients: Arc<PatientService>,
        doctors: Arc<DoctorService>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            availability: AvailabilityService::new(appointments.clone()),
            appointments,
            patients,
            doctors,
            clock,
            booking: Mutex::new(()),
        }
    }

    fn newest_first() -> Query {
        Query::new()
            .order_by("appointment_date", SortOrder::Desc)
            .order_by("appointment_time", SortOrder::Asc)
    }

    pub async fn list_appointments(&self) -> Result<Vec<AppointmentResponse>, AppointmentError> {
        let appointments = self.appointments.query(&Self::newest_first()).await?;
        self.to_responses(appointments).await
    }

    pub async fn get_appointment(&self, appointment_id: i64) -> Result<AppointmentResponse, AppointmentError> {
        debug!("Fetching appointment: {}", appointment_id);

        let appointment = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        self.to_response(appointment).await
    }

    pub async fn appointments_for_patient(
        &self,
        patient_id: i64,
    ) -> Result<Vec<AppointmentResponse>, AppointmentError> {
        let query = Self::newest_first().eq("patient_id", patient_id);
        let appointments = self.appointments.query(&query).await?;
        self.to_responses(appointments).await
    }

    pub async fn appointments_for_doctor(
        &self,
        doctor_id: i64,
    ) -> Result<Vec<AppointmentResponse>, AppointmentError> {
        let query = Self::newest_first().eq("doctor_id", doctor_id);
        let appointments = self.appointments.query(&query).await?;
        self.to_responses(appointments).await
    }

    pub async fn search_appointments(
        &self,
        search: AppointmentSearchQuery,
    ) -> Result<Vec<AppointmentResponse>, AppointmentError> {
        debug!("Searching appointments: {:?}", search);

        let mut query = Self::newest_first();
        if let Some(patient_id) = search.patient_id {
            query = query.eq("patient_id", patient_id);
        }
        if let Some(doctor_id) = search.doctor_id {
            query = query.eq("doctor_id", doctor_id);
        }
        if let Some(from) = search.from_date {
            query = query.at_least("appointment_date", from.to_string());
        }
        if let Some(to) = search.to_date {
            query = query.at_most("appointment_date", to.to_string());
        }
        if let Some(status) = search.status {
            query = query.eq("status", status.as_str());
        }
        if let Some(kind) = search.appointment_type.filter(|t| !t.is_empty()) {
            query = query.eq("appointment_type", kind);
        }

        let appointments = self.appointments.query(&query).await?;
        self.to_responses(appointments).await
    }

    pub async fn check_availability(&self, request: AvailabilityQuery) -> Result<bool, AppointmentError> {
        Ok(self
            .availability
            .is_slot_available(
                request.doctor_id,
                request.appointment_date,
                request.appointment_time,
                request.exclude_appointment_id,
            )
            .await?)
    }

    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<AppointmentResponse, AppointmentError> {
        debug!(
            "Booking patient {} with doctor {} on {} at {}",
            request.patient_id, request.doctor_id, request.appointment_date, request.appointment_time
        );

        request.validate()?;
        self.ensure_patient_active(request.patient_id).await?;
        self.ensure_doctor_bookable(request.doctor_id).await?;

        if request.appointment_date < self.clock.today() {
            warn!("Rejected booking on past date {}", request.appointment_date);
            return Err(AppointmentError::DateInPast);
        }

        let _booking = self.booking.lock().await;

        let free = self
            .availability
            .is_slot_available(request.doctor_id, request.appointment_date, request.appointment_time, None)
            .await?;
        if !free {
            warn!(
                "Slot {} {} for doctor {} is taken",
                request.appointment_date, request.appointment_time, request.doctor_id
            );
            return Err(AppointmentError::SlotNotAvailable);
        }

        let appointment = request.into_appointment(self.clock.now());
        let created = self.appointments.insert(appointment).await?;

        info!("Appointment created with ID: {}", created.id);
        self.to_response(created).await
    }

    pub async fn update_appointment(
        &self,
        appointment_id: i64,
        request: UpdateAppointmentRequest,
    ) -> Result<AppointmentResponse, AppointmentError> {
        debug!("Updating appointment: {}", appointment_id);

        request.validate()?;

        let _booking = self.booking.lock().await;

        let mut appointment = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        if let Some(patient_id) = request.patient_id {
            self.ensure_patient_active(patient_id).await?;
        }
        if let Some(doctor_id) = request.doctor_id {
            self.ensure_doctor_bookable(doctor_id).await?;
        }

        let date = request.appointment_date.unwrap_or(appointment.appointment_date);
        let time = request.appointment_time.unwrap_or(appointment.appointment_time);
        let doctor_id = request.doctor_id.unwrap_or(appointment.doctor_id);
        let status = request.status.unwrap_or(appointment.status);

        if request.reschedules() && date < self.clock.today() {
            warn!("Rejected move of appointment {} to past date {}", appointment_id, date);
            return Err(AppointmentError::DateInPast);
        }

        // A change of doctor, or reviving a cancelled booking, claims a slot
        // just like moving the date or time does.
        let claims_slot = request.reschedules()
            || request.doctor_id.is_some()
            || (!appointment.status.holds_slot() && status.holds_slot());

        if claims_slot && status.holds_slot() {
            let free = self
                .availability
                .is_slot_available(doctor_id, date, time, Some(appointment_id))
                .await?;
            if !free {
                warn!("Slot {} {} for doctor {} is taken", date, time, doctor_id);
                return Err(AppointmentError::SlotNotAvailable);
            }
        }

        request.apply_to(&mut appointment);
        let updated = self.appointments.update(appointment).await?;

        info!("Appointment {} updated", appointment_id);
        self.to_response(updated).await
    }

    /// Removes a future appointment.
    ///
    /// Refused when the appointment's date is today or earlier and its
    /// time-of-day is not later than the current time-of-day.
    pub async fn delete_appointment(&self, appointment_id: i64) -> Result<(), AppointmentError> {
        debug!("Deleting appointment: {}", appointment_id);

        let appointment = self
            .appointments
            .get(appointment_id)
            .await?
            .ok_or(AppointmentError::NotFound(appointment_id))?;

        if appointment.appointment_date <= self.clock.today()
            && appointment.appointment_time <= self.clock.time_of_day()
        {
            warn!("Refusing to delete past appointment {}", appointment_id);
            return Err(AppointmentError::CannotDeletePast);
        }

        if !self.appointments.remove(appointment_id).await? {
            return Err(AppointmentError::NotFound(appointment_id));
        }

        info!("Appointment {} deleted", appointment_id);
        Ok(())
    }

    async fn ensure_patient_active(&self, patient_id: i64) -> Result<(), AppointmentError> {
        if self.patients.find_active(patient_id).await?.is_none() {
            warn!("Patient {} is missing or inactive", patient_id);
            return Err(AppointmentError::PatientNotFound);
        }
        Ok(())
    }

    async fn ensure_doctor_bookable(&self, doctor_id: i64) -> Result<(), AppointmentError> {
        if self.doctors.find_bookable(doctor_id).await?.is_none() {
            warn!("Doctor {} is missing, inactive or unavailable", doctor_id);
            return Err(AppointmentError::DoctorNotAvailable);
        }
        Ok(())
    }

    async fn to_response(&self, appointment: Appointment) -> Result<AppointmentResponse, AppointmentError> {
        let patient_name = self
            .patients
            .lookup(appointment.patient_id)
            .await?
            .map(|p| p.name)
            .unwrap_or_default();
        let doctor_name = self
            .doctors
            .lookup(appointment.doctor_id)
            .await?
            .map(|d| d.name)
            .unwrap_or_default();

        Ok(AppointmentResponse::new(appointment, patient_name, doctor_name))
    }

    /// Resolves names once per distinct patient and doctor.
    async fn to_responses(
        &self,
        appointments: Vec<Appointment>,
    ) -> Result<Vec<AppointmentResponse>, AppointmentError> {
        let mut patient_names: HashMap<i64, String> = HashMap::new();
        let mut doctor_names: HashMap<i64, String> = HashMap::new();
        let mut responses = Vec::with_capacity(appointments.len());

        for appointment in appointments {
            if !patient_names.contains_key(&appointment.patient_id) {
                let name = self
                    .patients
                    .lookup(appointment.patient_id)
                    .await?
                    .map(|p| p.name)
                    .unwrap_or_default();
                patient_names.insert(appointment.patient_id, name);
            }
            if !doctor_names.contains_key(&appointment.doctor_id) {
                let name = self
                    .doctors
                    .lookup(appointment.doctor_id)
                    .await?
                    .map(|d| d.name)
                    .unwrap_or_default();
                doctor_names.insert(appointment.doctor_id, name);
            }

            let patient_name = patient_names
                .get(&appointment.patient_id)
                .cloned()
                .unwrap_or_default();
            let doctor_name = doctor_names
                .get(&appointment.doctor_id)
                .cloned()
                .unwrap_or_default();
            responses.push(AppointmentResponse::new(appointment, patient_name, doctor_name));
        }

        Ok(responses)
    }
}
