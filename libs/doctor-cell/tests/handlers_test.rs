use std::sync::Arc;

use assert_matches::assert_matches;
use axum::extract::{Path, Query, State};
use serde_json::json;
use uuid::Uuid;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use doctor_cell::handlers::*;
use doctor_cell::models::DoctorError;
use doctor_cell::services::DoctorService;
use shared_models::error::AppError;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

#[tokio::test]
async fn test_get_doctor_by_id_handler() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_state();
    let doctor_id = Uuid::new_v4().to_string();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_directory"))
        .and(query_param("id", format!("eq.{}", doctor_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::doctor_row(&doctor_id, "Dr. Adams", "Neurology"),
        ])))
        .mount(&mock_server)
        .await;

    let response = get_doctor_by_id(State(state), Path(doctor_id.clone())).await.unwrap().0;
    assert_eq!(response["doctor"]["id"], doctor_id.as_str());
    assert_eq!(response["doctor"]["specialization"], "Neurology");
}

#[tokio::test]
async fn test_get_doctor_by_id_handler_not_found() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_state();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctor_directory"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let result = get_doctor_by_id(State(state), Path(Uuid::new_v4().to_string())).await;
    assert_matches!(result, Err(AppError::NotFound(msg)) if msg == "Doctor not found");
}

#[tokio::test]
async fn test_search_handler_trims_blank_filters() {
    let mock_server = MockServer::start().await;
    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_state();

    let result = search_doctors_mobile(
        State(state),
        Query(SearchDoctorsQuery {
            q: Some("   ".to_string()),
            specialization: Some(String::new()),
        }),
    )
    .await;

    assert_matches!(result, Err(err) if matches!(err.0, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_doctor_exists() {
    let mock_server = MockServer::start().await;
    let known = Uuid::new_v4();

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .and(query_param("id", format!("eq.{}", known)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{ "id": known }])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/doctors"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_state();
    let service = DoctorService::new(Arc::clone(&state.supabase));

    assert!(service.doctor_exists(known).await.unwrap());
    assert!(!service.doctor_exists(Uuid::new_v4()).await.unwrap());
}

#[tokio::test]
async fn test_search_without_criteria_makes_no_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let state = TestConfig::with_supabase_url(&mock_server.uri()).to_state();
    let service = DoctorService::new(Arc::clone(&state.supabase));

    assert_matches!(
        service.search_doctors(None, None).await,
        Err(DoctorError::MissingSearchCriteria)
    );
}
