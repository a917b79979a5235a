use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use doctor_cell::doctor_routes;
use doctor_cell::models::Doctor;
use doctor_cell::services::{DoctorReferences, DoctorService};
use shared_database::{MemoryStore, StoreError};
use shared_utils::test_utils::fixed_clock;

struct NoAppointments;

#[async_trait]
impl DoctorReferences for NoAppointments {
    async fn doctor_has_open_appointments(&self, _doctor_id: i64) -> Result<bool, StoreError> {
        Ok(false)
    }
}

fn app() -> Router {
    let service = DoctorService::new(
        Arc::new(MemoryStore::<Doctor>::new()),
        Arc::new(NoAppointments),
        fixed_clock(),
    );
    doctor_routes(Arc::new(service))
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

fn quinn() -> Value {
    json!({
        "name": "Dr. Quinn",
        "email": "quinn@example.com",
        "phoneNumber": "555-0200",
        "specialization": "Family Medicine",
        "licenseNumber": "LIC-1",
        "yearsOfExperience": 12
    })
}

#[tokio::test]
async fn create_then_fetch_doctor() {
    let app = app();

    let response = app
        .clone()
        .oneshot(request("POST", "/", Some(quinn())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(
        response.headers().get(header::LOCATION).unwrap(),
        "/api/doctors/1"
    );

    let response = app.oneshot(request("GET", "/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["licenseNumber"], "LIC-1");
    assert_eq!(body["isAvailable"], true);
    assert_eq!(body["yearsOfExperience"], 12);
}

#[tokio::test]
async fn duplicate_license_is_rejected() {
    let app = app();
    app.clone()
        .oneshot(request("POST", "/", Some(quinn())))
        .await
        .unwrap();

    let mut other = quinn();
    other["email"] = json!("other@example.com");
    let response = app
        .oneshot(request("POST", "/", Some(other)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "A doctor with this license number already exists."
    );
}

#[tokio::test]
async fn specialization_route_decodes_path() {
    let app = app();
    app.clone()
        .oneshot(request("POST", "/", Some(quinn())))
        .await
        .unwrap();

    let response = app
        .oneshot(request("GET", "/specialization/Family%20Medicine", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body[0]["name"], "Dr. Quinn");
}

#[tokio::test]
async fn experience_out_of_range_is_rejected() {
    let mut body = quinn();
    body["yearsOfExperience"] = json!(75);

    let response = app()
        .oneshot(request("POST", "/", Some(body)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        "Years of experience must be between 0 and 50"
    );
}

#[tokio::test]
async fn deleted_doctor_is_not_found() {
    let app = app();
    app.clone()
        .oneshot(request("POST", "/", Some(quinn())))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(request("DELETE", "/1", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.oneshot(request("GET", "/1", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["error"], "Doctor with ID 1 not found");
}
