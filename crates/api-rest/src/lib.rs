//! # API REST
//!
//! REST API for the Ontop identity query and merge engine.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, serialising operator actions)
//!
//! All record semantics live in `ontop-core`; handlers only translate between HTTP and
//! [`SessionState`] transitions.

#![warn(rust_2018_idioms)]

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{delete, get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use utoipa::{OpenApi, ToSchema};
use utoipa_swagger_ui::SwaggerUi;

use ontop_core::{
    export::to_pretty_json, FilterCriteria, GroupedResult, IdentityService, MergedRecord,
    PatientRecord, RecordKey, SessionState, EXPORT_FILENAME,
};

/// Application state shared across REST API handlers.
///
/// The session sits behind an async mutex so operator actions run one at a time, each to
/// completion.
#[derive(Clone)]
pub struct AppState {
    service: IdentityService,
    session: Arc<Mutex<SessionState>>,
}

impl AppState {
    pub fn new(service: IdentityService) -> Self {
        Self {
            service,
            session: Arc::new(Mutex::new(SessionState::new())),
        }
    }
}

#[derive(Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
    /// Number of records in the loaded store.
    pub records: usize,
}

#[derive(Serialize, ToSchema)]
pub struct SelectionRes {
    pub records: Vec<PatientRecord>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_groups,
        search,
        get_selection,
        clear_selection,
        toggle_selection,
        merge,
        get_merged,
        export_merged,
    ),
    components(schemas(
        HealthRes,
        SelectionRes,
        FilterCriteria,
        PatientRecord,
        RecordKey,
        MergedRecord,
    ))
)]
pub struct ApiDoc;

/// Builds the REST router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/groups", get(list_groups))
        .route("/search", post(search))
        .route("/selection", get(get_selection))
        .route("/selection", delete(clear_selection))
        .route("/selection/toggle", post(toggle_selection))
        .route("/merge", post(merge))
        .route("/merged", get(get_merged))
        .route("/merged/export", get(export_merged))
        .merge(
            SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn selection_res(state: &SessionState) -> SelectionRes {
    SelectionRes {
        records: state.selection().all().to_vec(),
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Health check response", body = HealthRes)
    )
)]
/// Health check endpoint
///
/// Reports liveness and how many records were loaded. An empty store is still healthy.
#[axum::debug_handler]
async fn health(State(state): State<AppState>) -> Json<HealthRes> {
    Json(HealthRes {
        ok: true,
        message: "Ontop REST API is alive".into(),
        records: state.service.store().len(),
    })
}

#[utoipa::path(
    get,
    path = "/groups",
    responses(
        (status = 200, description = "Every record, keyed by provider group in configured order", body = std::collections::HashMap<String, Vec<PatientRecord>>)
    )
)]
/// List the whole store by provider group
///
/// Equivalent to a search with no criteria. Does not change the session.
async fn list_groups(State(state): State<AppState>) -> Json<GroupedResult> {
    Json(state.service.search(&FilterCriteria::new()))
}

#[utoipa::path(
    post,
    path = "/search",
    request_body = FilterCriteria,
    responses(
        (status = 200, description = "Matches keyed by provider group in configured order; groups without matches map to an empty list", body = std::collections::HashMap<String, Vec<PatientRecord>>)
    )
)]
/// Run a search
///
/// Replaces the session's criteria and search results. The selection is kept.
async fn search(
    State(state): State<AppState>,
    Json(criteria): Json<FilterCriteria>,
) -> Json<GroupedResult> {
    let mut session = state.session.lock().await;
    let current = std::mem::take(&mut *session);
    *session = state.service.apply_filter(current.with_criteria(criteria));

    Json(session.results().clone())
}

#[utoipa::path(
    get,
    path = "/selection",
    responses(
        (status = 200, description = "Selected records in selection order", body = SelectionRes)
    )
)]
async fn get_selection(State(state): State<AppState>) -> Json<SelectionRes> {
    let session = state.session.lock().await;
    Json(selection_res(&session))
}

#[utoipa::path(
    delete,
    path = "/selection",
    responses(
        (status = 200, description = "Selection cleared", body = SelectionRes)
    )
)]
async fn clear_selection(State(state): State<AppState>) -> Json<SelectionRes> {
    let mut session = state.session.lock().await;
    let current = std::mem::take(&mut *session);
    *session = current.clear_selection();
    Json(selection_res(&session))
}

#[utoipa::path(
    post,
    path = "/selection/toggle",
    request_body = RecordKey,
    responses(
        (status = 200, description = "Selection after the toggle", body = SelectionRes),
        (status = 404, description = "No record with that patientID and providers")
    )
)]
/// Toggle a record in or out of the selection
///
/// The record is looked up in the latest search results first, then in the whole store, so
/// records outside the current view can still be selected.
async fn toggle_selection(
    State(state): State<AppState>,
    Json(key): Json<RecordKey>,
) -> Result<Json<SelectionRes>, (StatusCode, &'static str)> {
    let mut session = state.session.lock().await;

    let record = session
        .results()
        .find(&key)
        .or_else(|| state.service.store().find(&key))
        .cloned()
        .ok_or((StatusCode::NOT_FOUND, "Record not found"))?;

    let current = std::mem::take(&mut *session);
    *session = current.toggle_selection(&record);
    Ok(Json(selection_res(&session)))
}

#[utoipa::path(
    post,
    path = "/merge",
    responses(
        (status = 200, description = "Merged record", body = MergedRecord),
        (status = 204, description = "Selection was empty; no merged record")
    )
)]
/// Merge the current selection
///
/// On success the selection is cleared and the merged record replaces any earlier one. An
/// empty selection clears the merged record and returns 204.
async fn merge(State(state): State<AppState>) -> Response {
    let mut session = state.session.lock().await;
    let current = std::mem::take(&mut *session);
    *session = state.service.merge(current);

    match session.merged() {
        Some(merged) => Json(merged.clone()).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/merged",
    responses(
        (status = 200, description = "Current merged record", body = MergedRecord),
        (status = 404, description = "No merged record")
    )
)]
async fn get_merged(
    State(state): State<AppState>,
) -> Result<Json<MergedRecord>, (StatusCode, &'static str)> {
    let session = state.session.lock().await;
    session
        .merged()
        .cloned()
        .map(Json)
        .ok_or((StatusCode::NOT_FOUND, "No merged record"))
}

#[utoipa::path(
    get,
    path = "/merged/export",
    responses(
        (status = 200, description = "Pretty-printed merged record as a download", body = MergedRecord),
        (status = 404, description = "No merged record"),
        (status = 500, description = "Internal server error")
    )
)]
/// Download the current merged record
///
/// Served as an attachment named `merged_patient.json`.
async fn export_merged(
    State(state): State<AppState>,
) -> Result<Response, (StatusCode, &'static str)> {
    let session = state.session.lock().await;
    let merged = session
        .merged()
        .ok_or((StatusCode::NOT_FOUND, "No merged record"))?;

    let body = to_pretty_json(merged).map_err(|e| {
        tracing::error!("Export merged record error: {:?}", e);
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/json".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", EXPORT_FILENAME),
            ),
        ],
        body,
    )
        .into_response())
}
