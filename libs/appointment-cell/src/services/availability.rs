use std::sync::Arc;

use chrono::{NaiveDate, NaiveTime, Timelike};
use tracing::debug;

use shared_database::{Query, RecordStore, StoreError};

use crate::models::{Appointment, AppointmentStatus};

/// Every appointment occupies a fixed window of this many minutes.
pub const SLOT_MINUTES: u32 = 30;

fn minute_of_day(time: NaiveTime) -> u32 {
    time.hour() * 60 + time.minute()
}

/// Half-open windows `[start, start + SLOT_MINUTES)` intersect.
///
/// Computed in minutes since midnight, so a late slot ends past minute 1440
/// instead of wrapping onto the early morning.
pub fn slots_overlap(existing: NaiveTime, requested: NaiveTime) -> bool {
    let existing = minute_of_day(existing);
    let requested = minute_of_day(requested);
    existing < requested + SLOT_MINUTES && existing + SLOT_MINUTES > requested
}

pub struct AvailabilityService {
    appointments: Arc<dyn RecordStore<Appointment>>,
}

impl AvailabilityService {
    pub fn new(appointments: Arc<dyn RecordStore<Appointment>>) -> Self {
        Self { appointments }
    }

    /// Whether `doctor_id` can take a new appointment at `date`/`time`.
    ///
    /// Cancelled appointments and `exclude_appointment_id` are ignored.
    pub async fn is_slot_available(
        &self,
        doctor_id: i64,
        date: NaiveDate,
        time: NaiveTime,
        exclude_appointment_id: Option<i64>,
    ) -> Result<bool, StoreError> {
        debug!(
            "Checking availability for doctor {} on {} at {}",
            doctor_id, date, time
        );

        let mut query = Query::new()
            .eq("doctor_id", doctor_id)
            .eq("appointment_date", date.to_string())
            .not_eq("status", AppointmentStatus::Cancelled.as_str());
        if let Some(id) = exclude_appointment_id {
            query = query.not_eq("id", id);
        }

        let booked = self.appointments.query(&query).await?;

        if booked.iter().any(|a| a.appointment_time == time) {
            debug!("Doctor {} already booked at {} {}", doctor_id, date, time);
            return Ok(false);
        }

        let clash = booked
            .iter()
            .find(|a| slots_overlap(a.appointment_time, time));
        if let Some(existing) = clash {
            debug!(
                "Requested {} overlaps appointment {} at {}",
                time, existing.id, existing.appointment_time
            );
            return Ok(false);
        }

        Ok(true)
    }
}
