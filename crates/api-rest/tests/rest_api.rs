//! Integration tests for the REST API.
//!
//! Each test builds a router over an in-memory store and drives it with `oneshot` requests,
//! so no socket is bound.

use std::path::PathBuf;
use std::sync::Arc;

use api_rest::{router, AppState};
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use ontop_core::{CoreConfig, IdentityService, RecordStore, UserIdScheme};
use serde_json::{json, Value};
use tower::ServiceExt;

const DOCUMENT: &str = r#"{
    "eCW": [
        { "patientID": "P1", "patientName": "Jane Doe", "patientDOB": "1990-05-12",
          "patientGender": "F", "patientZipCode": "10001", "providers": "eCW",
          "providerURL": "https://ecw.example/P1", "features": "bp" },
        { "patientID": "P2", "patientName": "John Roe", "patientDOB": "1970-02-02",
          "patientGender": "M", "patientZipCode": "20002", "providers": "eCW, AMD",
          "providerURL": "https://ecw.example/P2", "features": "labs" }
    ],
    "AMD": [
        { "patientID": "P3", "patientName": "Jane Doe", "patientDOB": "1991-01-01",
          "patientGender": "F", "patientZipCode": "10001", "providers": "AMD",
          "providerURL": "https://amd.example/P3", "features": "imaging" }
    ]
}"#;

fn groups() -> Vec<String> {
    vec!["eCW".into(), "AMD".into(), "Quest".into()]
}

fn app_with(store: RecordStore) -> Router {
    let cfg = Arc::new(
        CoreConfig::new(
            PathBuf::from("unused.json"),
            groups(),
            UserIdScheme::Short,
            PathBuf::from("."),
        )
        .expect("valid config"),
    );
    router(AppState::new(IdentityService::with_store(cfg, store)))
}

fn app() -> Router {
    app_with(RecordStore::from_json_str(DOCUMENT, &groups()).expect("parse document"))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let (status, bytes, _) = send_raw(app, method, uri, body).await;
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, value)
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Vec<u8>, axum::http::HeaderMap) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.expect("router response");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("read body")
        .to_bytes()
        .to_vec();
    (status, bytes, headers)
}

fn group_ids(search: &Value, group: &str) -> Vec<String> {
    search[group]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["patientID"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health_reports_record_count() {
    let (status, body) = send(&app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["records"], 3);
}

#[tokio::test]
async fn groups_lists_every_record_by_membership() {
    let (status, body) = send(&app(), Method::GET, "/groups", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(group_ids(&body, "eCW"), vec!["P1", "P2"]);
    assert_eq!(group_ids(&body, "AMD"), vec!["P2", "P3"]);
    assert!(group_ids(&body, "Quest").is_empty());
    assert_eq!(body.as_object().unwrap().len(), 3);
}

#[tokio::test]
async fn groups_are_keyed_in_configured_order() {
    let (status, bytes, _) = send_raw(&app(), Method::GET, "/groups", None).await;
    assert_eq!(status, StatusCode::OK);

    let text = String::from_utf8(bytes).unwrap();
    let ecw = text.find("\"eCW\":[").expect("eCW key");
    let amd = text.find("\"AMD\":[").expect("AMD key");
    let quest = text.find("\"Quest\":[]").expect("empty Quest key");
    assert!(ecw < amd && amd < quest);
}

#[tokio::test]
async fn search_applies_all_criteria() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/search",
        Some(json!({ "name": "JANE", "zipCode": "10001", "dob": "1990" })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(group_ids(&body, "eCW"), vec!["P1"]);
    assert!(group_ids(&body, "AMD").is_empty());
    assert!(group_ids(&body, "Quest").is_empty());
}

#[tokio::test]
async fn toggle_merge_and_export() {
    let app = app();
    send(&app, Method::POST, "/search", Some(json!({ "name": "jane" }))).await;

    let (status, selection) = send(
        &app,
        Method::POST,
        "/selection/toggle",
        Some(json!({ "patientID": "P3", "providers": "AMD" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selection["records"].as_array().unwrap().len(), 1);

    send(
        &app,
        Method::POST,
        "/selection/toggle",
        Some(json!({ "patientID": "P1", "providers": "eCW" })),
    )
    .await;

    let (status, merged) = send(&app, Method::POST, "/merge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(merged["patientID"], "P3, P1");
    assert_eq!(merged["patientName"], "Jane Doe");
    assert_eq!(merged["patientDOB"], "1991-01-01");
    assert_eq!(merged["providers"], "AMD, eCW");
    assert_eq!(merged["userID"].as_str().unwrap().len(), 6);

    // The merge consumed the selection.
    let (_, selection) = send(&app, Method::GET, "/selection", None).await;
    assert!(selection["records"].as_array().unwrap().is_empty());

    let (status, current) = send(&app, Method::GET, "/merged", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(current, merged);

    let (status, bytes, headers) = send_raw(&app, Method::GET, "/merged/export", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"merged_patient.json\""
    );
    let text = String::from_utf8(bytes).unwrap();
    assert!(text.contains("\n  \"userID\""));
    assert_eq!(serde_json::from_str::<Value>(&text).unwrap(), merged);
}

#[tokio::test]
async fn toggle_accepts_records_outside_the_current_view() {
    let app = app();
    send(&app, Method::POST, "/search", Some(json!({ "name": "john" }))).await;

    let (status, selection) = send(
        &app,
        Method::POST,
        "/selection/toggle",
        Some(json!({ "patientID": "P1", "providers": "eCW" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(selection["records"][0]["patientID"], "P1");
}

#[tokio::test]
async fn toggle_unknown_record_is_not_found() {
    let (status, _) = send(
        &app(),
        Method::POST,
        "/selection/toggle",
        Some(json!({ "patientID": "P1", "providers": "AMD" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_merge_clears_merged_record() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/selection/toggle",
        Some(json!({ "patientID": "P2", "providers": "eCW, AMD" })),
    )
    .await;
    let (status, _) = send(&app, Method::POST, "/merge", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, Method::POST, "/merge", None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, _) = send(&app, Method::GET, "/merged", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _, _) = send_raw(&app, Method::GET, "/merged/export", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn clear_selection_empties_it() {
    let app = app();
    send(
        &app,
        Method::POST,
        "/selection/toggle",
        Some(json!({ "patientID": "P1", "providers": "eCW" })),
    )
    .await;

    let (status, body) = send(&app, Method::DELETE, "/selection", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["records"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_store_searches_return_empty_groups() {
    let app = app_with(RecordStore::empty());
    let (status, body) = send(&app, Method::POST, "/search", Some(json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    let groups = body.as_object().unwrap();
    assert_eq!(groups.len(), 3);
    assert!(groups.values().all(|records| records == &json!([])));
}
