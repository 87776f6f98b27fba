use std::collections::BTreeMap;
use std::time::Duration;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::admin::AppState;
use crate::driver::Connection;
use crate::error::PoolError;
use crate::replica::{ConnectionStatus, StatusReport};

/// Pool errors rendered as JSON.
#[derive(Debug)]
pub struct ApiError(pub PoolError);

impl From<PoolError> for ApiError {
    fn from(e: PoolError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            PoolError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            PoolError::NoConnections => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({ "error": self.0.to_string() }))).into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ProbeResult {
    pub group: String,
    pub error: Option<String>,
    pub active: Vec<usize>,
    pub inactive: Vec<usize>,
    pub db_list: Vec<ConnectionStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HeartbeatResult {
    pub group: String,
    pub running: bool,
    /// False when the request did not change anything.
    pub changed: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct HeartbeatParams {
    pub interval_ms: Option<u64>,
}

pub async fn get_status<C: Connection>(
    State(state): State<AppState<C>>,
) -> Result<Json<BTreeMap<String, StatusReport>>, ApiError> {
    Ok(Json(state.registry.status().await?))
}

pub async fn get_group_status<C: Connection>(
    State(state): State<AppState<C>>,
    Path(group): Path<String>,
) -> Result<Json<StatusReport>, ApiError> {
    let set = state.registry.get(&group)?;
    Ok(Json(set.status().await?))
}

pub async fn probe_group<C: Connection>(
    State(state): State<AppState<C>>,
    Path(group): Path<String>,
) -> Result<Json<ProbeResult>, ApiError> {
    let set = state.registry.get(&group)?;
    let error = set.probe().await.err().map(|e| e.to_string());
    let partition = set.partition();

    Ok(Json(ProbeResult {
        group,
        error,
        active: partition.active(),
        inactive: partition.inactive().to_vec(),
        db_list: set.connection_statuses(),
    }))
}

pub async fn start_heartbeat<C: Connection>(
    State(state): State<AppState<C>>,
    Path(group): Path<String>,
    Query(params): Query<HeartbeatParams>,
) -> Result<Json<HeartbeatResult>, ApiError> {
    let set = state.registry.get(&group)?;
    let interval = params
        .interval_ms
        .filter(|ms| *ms > 0)
        .map(Duration::from_millis)
        .unwrap_or(state.heartbeat_interval);

    let changed = set.start_heartbeat(interval);
    Ok(Json(HeartbeatResult {
        group,
        running: set.is_heartbeat_running(),
        changed,
    }))
}

pub async fn stop_heartbeat<C: Connection>(
    State(state): State<AppState<C>>,
    Path(group): Path<String>,
) -> Result<Json<HeartbeatResult>, ApiError> {
    let set = state.registry.get(&group)?;
    let changed = set.stop_heartbeat().await;
    Ok(Json(HeartbeatResult {
        group,
        running: set.is_heartbeat_running(),
        changed,
    }))
}
