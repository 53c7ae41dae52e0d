//! Sync trigger and status endpoints.
//!
//! POST bodies are `{"force": bool, "background": bool}`, both optional.
//! A per-kind sync answers non-200 only when that kind itself failed;
//! `/sync/all` always answers 200 - "3 of 4 succeeded" is a valid outcome
//! the report describes, not a transport error.

use bytes::Bytes;
use http_body_util::Full;
use hyper::{Response, StatusCode};
use serde::Deserialize;

use crate::model::EntityKind;
use crate::routes::error_response;
use crate::server::http::{bad_request_response, json_response};
use crate::server::AppState;
use crate::sync::SyncStatus;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SyncRequest {
    pub force: bool,
    pub background: bool,
}

/// Parse a sync request body; an empty body means all defaults
fn parse_request(body: &Bytes) -> Result<SyncRequest, String> {
    if body.is_empty() {
        return Ok(SyncRequest::default());
    }

    serde_json::from_slice(body).map_err(|e| format!("invalid sync request body: {e}"))
}

/// GET /sync/status
pub async fn sync_status(state: &AppState) -> Response<Full<Bytes>> {
    match state.reporter.status().await {
        Ok(status) => json_response(StatusCode::OK, &status),
        Err(e) => error_response(&e),
    }
}

/// POST /sync/all
pub async fn sync_all(state: &AppState, body: &Bytes) -> Response<Full<Bytes>> {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(message) => return bad_request_response(&message),
    };

    let report = state
        .engine
        .sync_all(request.force, request.background)
        .await;

    // Partial failure is a legitimate aggregate outcome
    json_response(StatusCode::OK, &report)
}

/// POST /sync/{kind}
pub async fn sync_kind(
    state: &AppState,
    kind: EntityKind,
    body: &Bytes,
) -> Response<Full<Bytes>> {
    let request = match parse_request(body) {
        Ok(request) => request,
        Err(message) => return bad_request_response(&message),
    };

    let report = state
        .engine
        .sync_one(kind, request.force, request.background)
        .await;

    let status = match report.status {
        SyncStatus::Failed => StatusCode::BAD_GATEWAY,
        _ => StatusCode::OK,
    };

    json_response(status, &report)
}
