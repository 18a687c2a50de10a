use std::sync::Arc;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use shared::protocol::API_PREFIX;
use shared::types::{Button, SystemMetrics, WakeJobStatus};
use crate::buttons;
use crate::metrics;
use crate::net::probe::Probe;
use crate::state_manager::StateHandle;
use crate::wake_manager::{JobId, WakeManager};

#[derive(Clone)]
pub struct AppState {
    pub state: StateHandle,
    pub wake: WakeManager,
    pub prober: Arc<dyn Probe>,
}

#[derive(Serialize)]
pub struct WakeResponse {
    pub status: &'static str,
    /// Fire-and-forget acknowledgment: the signal was handed to the network
    /// stack, not a delivery guarantee.
    pub logged: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WakeJobCreated {
    pub job_id: JobId,
    #[serde(flatten)]
    pub status: WakeJobStatus,
}

#[derive(Serialize)]
pub struct StatusResponse {
    pub online: bool,
}

#[derive(Deserialize)]
pub struct MaintenanceRequest {
    pub set: Option<bool>,
}

#[derive(Serialize)]
pub struct MaintenanceResponse {
    pub status: &'static str,
    pub maintenance: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClearResponse {
    pub status: &'static str,
    pub cache_cleared: DateTime<Utc>,
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/system", get(get_system))
        .route("/buttons", get(get_buttons))
        .route("/maintenance", post(post_maintenance))
        .route("/clear", post(post_clear))
        .route("/wake", post(post_wake))
        .route("/wake/confirm", post(post_wake_confirm))
        .route("/wake/jobs/:id", get(get_wake_job))
        .route("/status/:target", get(get_status));

    Router::new().nest(API_PREFIX, api).with_state(state)
}

async fn get_system() -> Json<SystemMetrics> {
    Json(metrics::collect().await)
}

async fn get_buttons(State(state): State<AppState>) -> Result<Json<Vec<Button>>, StatusCode> {
    let configured = state.state.buttons().await.map_err(internal)?;
    let runtime = state.state.runtime().await.map_err(internal)?;
    let metrics = metrics::collect().await;

    let rendered = buttons::render(configured, &metrics, &runtime, state.prober.as_ref()).await;
    Ok(Json(rendered))
}

async fn post_maintenance(
    State(state): State<AppState>,
    body: Option<Json<MaintenanceRequest>>,
) -> Result<Json<MaintenanceResponse>, StatusCode> {
    let set = body.and_then(|Json(req)| req.set);
    let update = state.state.set_maintenance(set).await.map_err(internal)?;

    // A failed write-back still returns 200: the runtime flag did change.
    let message = update
        .persist_error
        .map(|e| format!("Maintenance updated in memory but failed to persist: {}", e));

    Ok(Json(MaintenanceResponse {
        status: "ok",
        maintenance: update.maintenance,
        message,
    }))
}

async fn post_clear(State(state): State<AppState>) -> Result<Json<ClearResponse>, StatusCode> {
    let at = state.state.clear_cache().await.map_err(internal)?;
    Ok(Json(ClearResponse {
        status: "ok",
        cache_cleared: at,
    }))
}

/// Wake-only variant: send the signal and acknowledge. Reachability is the
/// caller's problem; pair with GET /status/{target}.
async fn post_wake(State(state): State<AppState>) -> Result<Json<WakeResponse>, StatusCode> {
    state.wake.wake().await.map_err(internal)?;
    Ok(Json(WakeResponse {
        status: "ok",
        logged: true,
    }))
}

/// Full orchestration: send the signal, then confirm the poll plan in a
/// background job. The job id is returned immediately; progress is read
/// from GET /wake/jobs/{id}.
async fn post_wake_confirm(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<WakeJobCreated>), StatusCode> {
    let job_id = state.wake.wake_and_confirm().await.map_err(internal)?;

    Ok((
        StatusCode::ACCEPTED,
        Json(WakeJobCreated {
            job_id,
            status: WakeJobStatus::Signaled,
        }),
    ))
}

async fn get_wake_job(
    State(state): State<AppState>,
    Path(id): Path<JobId>,
) -> Result<Json<WakeJobStatus>, StatusCode> {
    state
        .wake
        .job_status(id)
        .await
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

/// Single probe, no signaling, no polling. Probe failures of any kind are
/// reported as offline, never as an HTTP error.
async fn get_status(
    State(state): State<AppState>,
    Path(target): Path<String>,
) -> Json<StatusResponse> {
    let online = state.prober.is_online(&target).await;
    Json(StatusResponse { online })
}

fn internal<E: std::fmt::Display>(e: E) -> StatusCode {
    tracing::error!("Request failed: {}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}
