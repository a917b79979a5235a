use std::sync::Arc;

use axum::{routing::get, Router};

use appointment_cell::{
    appointment_routes, dashboard_routes, Appointment, AppointmentService, DashboardService,
    OpenAppointmentGuard,
};
use doctor_cell::{doctor_routes, DoctorService};
use patient_cell::{patient_routes, PatientService};
use shared_config::AppConfig;
use shared_database::StoreFactory;
use shared_utils::Clock;

pub struct AppServices {
    pub patients: Arc<PatientService>,
    pub doctors: Arc<DoctorService>,
    pub appointments: Arc<AppointmentService>,
    pub dashboard: Arc<DashboardService>,
}

impl AppServices {
    /// Opens the three tables on the configured backend and wires the cells together.
    pub fn build(config: &AppConfig, clock: Arc<dyn Clock>) -> Self {
        let stores = StoreFactory::from_config(config);
        let appointment_store = stores.open::<Appointment>();
        let guard = Arc::new(OpenAppointmentGuard::new(appointment_store.clone()));

        let patients = Arc::new(PatientService::new(stores.open(), guard.clone(), clock.clone()));
        let doctors = Arc::new(DoctorService::new(stores.open(), guard, clock.clone()));
        let appointments = Arc::new(AppointmentService::new(
            appointment_store.clone(),
            patients.clone(),
            doctors.clone(),
            clock,
        ));
        let dashboard = Arc::new(DashboardService::new(
            appointment_store,
            patients.clone(),
            doctors.clone(),
        ));

        Self {
            patients,
            doctors,
            appointments,
            dashboard,
        }
    }
}

pub fn create_router(services: AppServices) -> Router {
    Router::new()
        .route("/", get(|| async { "Hospital API is running!" }))
        .nest("/api/patients", patient_routes(services.patients))
        .nest("/api/doctors", doctor_routes(services.doctors))
        .nest("/api/appointments", appointment_routes(services.appointments))
        .nest("/api/dashboard", dashboard_routes(services.dashboard))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use shared_utils::test_utils::fixed_clock;
    use tower::ServiceExt;

    fn app() -> Router {
        create_router(AppServices::build(&AppConfig::default(), fixed_clock()))
    }

    async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn root_reports_liveness() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"Hospital API is running!");
    }

    #[tokio::test]
    async fn admin_walkthrough_across_cells() {
        let app = app();

        let patient = json!({
            "name": "Ada Byron",
            "email": "a@x.com",
            "phoneNumber": "555-0100",
            "dateOfBirth": "1990-12-10",
            "gender": "Female",
            "address": "12 St James's Square"
        });
        let (status, _) = send(&app, "POST", "/api/patients", Some(patient.clone())).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "POST", "/api/patients", Some(patient)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "A patient with this email already exists.");

        let doctor = json!({
            "name": "Dr. Quinn",
            "email": "quinn@x.com",
            "phoneNumber": "555-0200",
            "specialization": "Cardiology",
            "licenseNumber": "L1",
            "yearsOfExperience": 10
        });
        let (status, _) = send(&app, "POST", "/api/doctors", Some(doctor)).await;
        assert_eq!(status, StatusCode::CREATED);

        let book = |time: &str| {
            json!({
                "patientId": 1,
                "doctorId": 1,
                "appointmentDate": "2025-06-03",
                "appointmentTime": time,
                "appointmentType": "Consultation"
            })
        };

        let (status, body) = send(&app, "POST", "/api/appointments", Some(book("10:00"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["status"], "Scheduled");

        let (status, _) = send(&app, "POST", "/api/appointments", Some(book("10:15"))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, "POST", "/api/appointments", Some(book("10:30"))).await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(&app, "DELETE", "/api/patients/1", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Cannot delete patient with active appointments.");

        let (status, body) = send(&app, "GET", "/api/dashboard", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["totalAppointments"], 2);
        assert_eq!(body["scheduledAppointments"], 2);
    }
}
