use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::json;

use shared_config::{AppConfig, StoreBackend};

use crate::clock::FixedClock;

pub struct TestConfig {
    pub supabase_url: String,
    pub supabase_anon_key: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
        }
    }
}

impl TestConfig {
    /// Points the config at a mock PostgREST server.
    pub fn with_supabase_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            store_backend: StoreBackend::Supabase,
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            ..AppConfig::default()
        }
    }
}

/// 2025-06-02 09:00, a Monday morning. Tests schedule relative to this.
pub fn reference_now() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 6, 2)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .unwrap_or_default()
}

pub fn fixed_clock() -> Arc<FixedClock> {
    Arc::new(FixedClock::at(reference_now()))
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn patient_row(id: i64, email: &str, name: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": email,
            "phone_number": "+353 1 555 0100",
            "date_of_birth": "1990-01-01",
            "gender": "Female",
            "address": "1 Main Street, Dublin",
            "medical_history": null,
            "registration_date": "2025-01-01T08:00:00",
            "is_active": true
        })
    }

    pub fn doctor_row(id: i64, email: &str, name: &str, specialization: &str) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "email": email,
            "phone_number": "+353 1 555 0200",
            "specialization": specialization,
            "license_number": format!("LIC-{}", id),
            "years_of_experience": 10,
            "is_available": true,
            "hire_date": "2020-01-01T08:00:00",
            "is_active": true
        })
    }

    pub fn appointment_row(id: i64, patient_id: i64, doctor_id: i64, date: &str, time: &str) -> serde_json::Value {
        json!({
            "id": id,
            "patient_id": patient_id,
            "doctor_id": doctor_id,
            "appointment_date": date,
            "appointment_time": time,
            "appointment_type": "Consultation",
            "symptoms": null,
            "diagnosis": null,
            "prescription": null,
            "status": "Scheduled",
            "notes": null,
            "created_date": "2025-06-01T08:00:00"
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "message": message,
            "code": code
        })
    }
}
