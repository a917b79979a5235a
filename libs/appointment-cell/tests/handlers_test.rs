mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use appointment_cell::{appointment_routes, dashboard_routes};

use common::{tomorrow, Hospital};

fn routes(hospital: &Hospital) -> Router {
    appointment_routes(hospital.appointments.clone())
}

fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn seeded() -> (Hospital, i64, i64) {
    let hospital = Hospital::new();
    let ada = hospital.patient("Ada Byron", "ada@example.com").await;
    let quinn = hospital.doctor("Dr. Quinn", "quinn@example.com", "L1").await;
    (hospital, ada.id, quinn.id)
}

fn booking_body(patient_id: i64, doctor_id: i64, time: &str) -> Value {
    json!({
        "patientId": patient_id,
        "doctorId": doctor_id,
        "appointmentDate": tomorrow().to_string(),
        "appointmentTime": time,
        "appointmentType": "Consultation",
        "symptoms": "Headache"
    })
}

#[tokio::test]
async fn post_books_and_returns_location() {
    let (hospital, patient_id, doctor_id) = seeded().await;

    let response = routes(&hospital)
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:00"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/appointments/1"
    );

    let body = body_json(response).await;
    assert_eq!(body["status"], "Scheduled");
    assert_eq!(body["appointmentTime"], "10:00");
    assert_eq!(body["patientName"], "Ada Byron");
    assert_eq!(body["doctorName"], "Dr. Quinn");
    assert_eq!(body["createdDate"], "2025-06-02T09:00:00");
}

#[tokio::test]
async fn taken_slot_is_a_bad_request_with_message() {
    let (hospital, patient_id, doctor_id) = seeded().await;
    let app = routes(&hospital);

    app.clone()
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:00"))))
        .await
        .unwrap();

    let response = app
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:15"))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "The selected time slot is not available."
    );
}

#[tokio::test]
async fn availability_endpoint_answers_with_a_boolean() {
    let (hospital, patient_id, doctor_id) = seeded().await;
    let app = routes(&hospital);

    app.clone()
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:00"))))
        .await
        .unwrap();

    let busy = format!(
        "/availability?doctorId={}&appointmentDate={}&appointmentTime=10:20",
        doctor_id,
        tomorrow()
    );
    let response = app.clone().oneshot(request("GET", &busy, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(false));

    let own_slot = format!(
        "/availability?doctorId={}&appointmentDate={}&appointmentTime=10:00&excludeAppointmentId=1",
        doctor_id,
        tomorrow()
    );
    let response = app.oneshot(request("GET", &own_slot, None)).await.unwrap();
    assert_eq!(body_json(response).await, json!(true));
}

#[tokio::test]
async fn put_records_diagnosis() {
    let (hospital, patient_id, doctor_id) = seeded().await;
    let app = routes(&hospital);

    app.clone()
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:00"))))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request(
            "PUT",
            "/1",
            Some(json!({ "diagnosis": "Migraine", "status": "Completed" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(app.oneshot(request("GET", "/1", None)).await.unwrap()).await;
    assert_eq!(body["diagnosis"], "Migraine");
    assert_eq!(body["status"], "Completed");
    assert_eq!(body["symptoms"], "Headache");
}

#[tokio::test]
async fn search_and_foreign_key_listings() {
    let (hospital, patient_id, doctor_id) = seeded().await;
    let app = routes(&hospital);

    app.clone()
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:00"))))
        .await
        .unwrap();

    let uri = format!("/search?doctorId={}&status=Scheduled&fromDate={}", doctor_id, tomorrow());
    let body = body_json(app.clone().oneshot(request("GET", &uri, None)).await.unwrap()).await;
    assert_eq!(body.as_array().map(Vec::len), Some(1));

    let uri = format!("/patient/{}", patient_id);
    let body = body_json(app.clone().oneshot(request("GET", &uri, None)).await.unwrap()).await;
    assert_eq!(body[0]["doctorName"], "Dr. Quinn");

    let body = body_json(app.oneshot(request("GET", "/doctor/99", None)).await.unwrap()).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn delete_and_missing_appointments() {
    let (hospital, patient_id, doctor_id) = seeded().await;
    let app = routes(&hospital);

    app.clone()
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:00"))))
        .await
        .unwrap();

    let response = app.clone().oneshot(request("DELETE", "/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(request("GET", "/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Appointment with ID 1 not found");
}

#[tokio::test]
async fn dashboard_reports_counts() {
    let (hospital, patient_id, doctor_id) = seeded().await;
    routes(&hospital)
        .oneshot(request("POST", "/", Some(booking_body(patient_id, doctor_id, "10:00"))))
        .await
        .unwrap();

    let response = dashboard_routes(hospital.dashboard.clone())
        .oneshot(request("GET", "/", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({
            "totalPatients": 1,
            "totalDoctors": 1,
            "totalAppointments": 1,
            "scheduledAppointments": 1
        })
    );
}
