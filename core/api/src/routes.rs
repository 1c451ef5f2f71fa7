// Path and File Name : /home/netsnare/rebuild/core/api/src/routes.rs
// Author: Qv9Xw2LpTzK4dRmY7cHgUeB1nJf8oAiS5kWxZ3tMqD0
// Details of functionality of this file: HTTP boundary handlers - trap tunnel, agent lifecycle, operator actions and session queries

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Path, State};
use axum::http::StatusCode;
use axum::response::Json;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use netsnare_dispatch::{DispatchError, JobStatus, UNINSTALL_COMMAND};
use netsnare_emulation::Protocol;
use netsnare_fleet::{EnrollmentStatus, ScanReport};
use netsnare_recorder::{Frame, SessionRecord};

use crate::server::CoreState;

// ---------------------------------------------------------------------------
// Trap tunnel
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapInitRequest {
    #[serde(rename = "type")]
    pub protocol: Protocol,
    pub actor_id: Option<Uuid>,
    /// True attacker address as observed at the edge socket.
    pub attacker_ip: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapInitResponse {
    pub session_id: Uuid,
    pub output: String,
}

pub async fn trap_init(
    State(state): State<CoreState>,
    Json(payload): Json<TrapInitRequest>,
) -> Json<TrapInitResponse> {
    let (session_id, output) =
        state
            .trap
            .init(payload.protocol, payload.actor_id, payload.attacker_ip);
    Json(TrapInitResponse { session_id, output })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapInteractRequest {
    pub session_id: Uuid,
    pub input: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrapInteractResponse {
    pub output: String,
    pub closed: bool,
}

pub async fn trap_interact(
    State(state): State<CoreState>,
    Json(payload): Json<TrapInteractRequest>,
) -> Json<TrapInteractResponse> {
    // Unknown session ids degrade to the engine's fallback reply; the edge
    // relay loop must never see an error here.
    let reply = state.trap.interact(payload.session_id, &payload.input).await;
    Json(TrapInteractResponse {
        output: reply.output,
        closed: reply.closed,
    })
}

// ---------------------------------------------------------------------------
// Agent lifecycle
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatRequest {
    pub hardware_id: String,
    pub os: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartbeatResponse {
    pub status: EnrollmentStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<String>,
}

pub async fn agent_heartbeat(
    State(state): State<CoreState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    Json(payload): Json<HeartbeatRequest>,
) -> Result<Json<HeartbeatResponse>, StatusCode> {
    if payload.hardware_id.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let observed_ip = connect_info
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_default();

    let decision = state.fleet.heartbeat(
        &payload.hardware_id,
        &observed_ip,
        payload.os.as_deref(),
    );
    Ok(Json(HeartbeatResponse {
        status: decision.status,
        actor_id: decision.actor_id,
        latest_version: decision.latest_version,
    }))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PolledJob {
    pub id: Uuid,
    pub command: String,
}

pub async fn agent_poll_commands(
    State(state): State<CoreState>,
    Path(actor_id): Path<Uuid>,
) -> Result<Json<Vec<PolledJob>>, StatusCode> {
    // A command poll is liveness traffic under the same sticky rule as a
    // heartbeat. A deleted actor is still allowed to drain its queue so the
    // final self-uninstall job can reach it.
    if state.fleet.touch(actor_id).is_err() && state.queue.list_for(actor_id).is_empty() {
        return Err(StatusCode::NOT_FOUND);
    }

    let jobs = state
        .queue
        .poll(actor_id)
        .map(|job| PolledJob {
            id: job.id,
            command: job.command,
        })
        .into_iter()
        .collect();
    Ok(Json(jobs))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportResultRequest {
    pub job_id: Uuid,
    pub status: JobStatus,
    pub output: Option<String>,
}

pub async fn agent_report_result(
    State(state): State<CoreState>,
    Json(payload): Json<ReportResultRequest>,
) -> Result<StatusCode, StatusCode> {
    state
        .queue
        .report(payload.job_id, payload.status, payload.output)
        .map_err(|e| match e {
            DispatchError::JobNotFound(_) => StatusCode::NOT_FOUND,
            DispatchError::InvalidTransition(..) => StatusCode::BAD_REQUEST,
        })?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRequest {
    pub actor_id: Uuid,
    #[serde(flatten)]
    pub report: ScanReport,
}

pub async fn agent_report_scan(
    State(state): State<CoreState>,
    Json(payload): Json<ScanRequest>,
) -> Result<StatusCode, StatusCode> {
    state
        .fleet
        .record_scan(payload.actor_id, &payload.report)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRequest {
    pub actor_id: Option<Uuid>,
    pub source_ip: String,
    pub port: Option<u16>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub details: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    pub accepted: bool,
}

pub async fn agent_report_alert(
    State(state): State<CoreState>,
    Json(payload): Json<AlertRequest>,
) -> Result<Json<AlertResponse>, StatusCode> {
    if payload.source_ip.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let accepted = state.watchdog.report_alert(
        payload.actor_id,
        &payload.source_ip,
        payload.port,
        &payload.kind,
        &payload.details,
    );
    Ok(Json(AlertResponse { accepted }))
}

// ---------------------------------------------------------------------------
// Operator actions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueCommandRequest {
    pub actor_id: Uuid,
    pub command: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnqueueCommandResponse {
    pub job_id: Uuid,
}

pub async fn operator_enqueue_command(
    State(state): State<CoreState>,
    Json(payload): Json<EnqueueCommandRequest>,
) -> Result<Json<EnqueueCommandResponse>, StatusCode> {
    if payload.command.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    if state.fleet.get(payload.actor_id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    let job_id = state.queue.enqueue(payload.actor_id, payload.command);
    Ok(Json(EnqueueCommandResponse { job_id }))
}

pub async fn operator_list_commands(
    State(state): State<CoreState>,
    Path(actor_id): Path<Uuid>,
) -> Json<Vec<netsnare_dispatch::CommandJob>> {
    Json(state.queue.list_for(actor_id))
}

pub async fn operator_list_enrollments(
    State(state): State<CoreState>,
) -> Json<Vec<netsnare_fleet::PendingActor>> {
    Json(state.fleet.list_pending())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveRequest {
    pub gateway_id: Option<String>,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveResponse {
    pub actor_id: Uuid,
}

pub async fn operator_approve_enrollment(
    State(state): State<CoreState>,
    Path(pending_id): Path<Uuid>,
    Json(payload): Json<ApproveRequest>,
) -> Result<Json<ApproveResponse>, StatusCode> {
    if payload.name.is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let actor_id = state
        .fleet
        .approve(pending_id, payload.gateway_id, payload.name)
        .map_err(|e| {
            warn!("Enrollment approval failed: {}", e);
            StatusCode::NOT_FOUND
        })?;
    Ok(Json(ApproveResponse { actor_id }))
}

pub async fn operator_reject_enrollment(
    State(state): State<CoreState>,
    Path(pending_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    state
        .fleet
        .reject(pending_id)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn operator_acknowledge_actor(
    State(state): State<CoreState>,
    Path(actor_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    state
        .watchdog
        .acknowledge(actor_id)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn operator_list_actors(
    State(state): State<CoreState>,
) -> Json<Vec<netsnare_fleet::Actor>> {
    Json(state.fleet.list())
}

pub async fn operator_delete_actor(
    State(state): State<CoreState>,
    Path(actor_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    if state.fleet.get(actor_id).is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    // Best-effort self-uninstall: an explicit job the agent picks up on its
    // next poll, enqueued before the actor record disappears.
    state
        .queue
        .enqueue(actor_id, UNINSTALL_COMMAND.to_string());
    state
        .fleet
        .remove(actor_id)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    info!("Actor {} deleted by operator", actor_id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Sessions
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: Uuid,
    pub actor_id: Option<Uuid>,
    pub attacker_ip: String,
    pub protocol: Protocol,
    pub start_time: DateTime<Utc>,
    pub duration_seconds: f64,
    pub closed: bool,
    pub frames: Vec<Frame>,
}

impl From<SessionRecord> for SessionView {
    fn from(record: SessionRecord) -> Self {
        let duration_seconds = record.duration_seconds();
        Self {
            id: record.id,
            actor_id: record.actor_id,
            attacker_ip: record.attacker_ip,
            protocol: record.protocol,
            start_time: record.start_time,
            duration_seconds,
            closed: record.closed,
            frames: record.frames,
        }
    }
}

pub async fn sessions_list(State(state): State<CoreState>) -> Json<Vec<SessionView>> {
    Json(
        state
            .history
            .list_recent()
            .into_iter()
            .map(SessionView::from)
            .collect(),
    )
}

pub async fn sessions_delete(
    State(state): State<CoreState>,
    Path(session_id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    if state.history.remove(session_id) {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}
