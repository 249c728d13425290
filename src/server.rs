//! HTTP API for the diagnostics store.
//!
//! Two routes: `POST /api/diagnostics` accepts a submission and answers
//! with the issued reference code, `GET /api/diagnostics/:id` returns the
//! stored record. Error taxonomy maps to status codes here: bad payload
//! shape or malformed id → 400, unknown id → 404, anything internal →
//! 500 with the cause logged, never echoed.

use crate::headers::RequestMeta;
use crate::refid::ReferenceId;
use crate::store::Store;
use crate::types::StoreError;
use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use eyre::{Context, Result};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Body of a successful submission response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitResponse {
    success: bool,
    reference_id: ReferenceId,
    message: String,
}

/// Body of every error response.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

/// Build the API router around a shared store handle.
pub fn router(store: Arc<Store>) -> Router {
    Router::new()
        .route("/api/diagnostics", post(submit_diagnostics))
        .route("/api/diagnostics/:id", get(get_diagnostics))
        .with_state(store)
}

/// Bind and serve until the process is stopped.
pub async fn serve(store: Store, addr: SocketAddr) -> Result<()> {
    let app = router(Arc::new(store));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    log::info!("Serving diagnostics API on http://{addr}");
    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .await
        .context("Server error")?;
    Ok(())
}

async fn submit_diagnostics(
    State(store): State<Arc<Store>>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    payload: Result<Json<serde_json::Value>, JsonRejection>,
) -> Response {
    // An unparseable body gets the same answer as a non-object payload.
    let Ok(Json(payload)) = payload else {
        return error_body(StatusCode::BAD_REQUEST, StoreError::InvalidPayload.to_string(), None);
    };

    let meta = request_meta(&headers, peer);
    match store.submit(payload, &meta) {
        Ok(record) => {
            log::info!("Stored diagnostics submission {}", record.reference_id);
            let body = SubmitResponse {
                success: true,
                message: format!(
                    "Diagnostics stored. Quote reference code {} when contacting support.",
                    record.reference_id
                ),
                reference_id: record.reference_id,
            };
            (StatusCode::OK, Json(body)).into_response()
        }
        Err(report) => error_response(&report),
    }
}

async fn get_diagnostics(State(store): State<Arc<Store>>, Path(id): Path<String>) -> Response {
    match store.retrieve(&id) {
        Ok(record) => (StatusCode::OK, Json(record)).into_response(),
        Err(report) => error_response(&report),
    }
}

/// Translate the request's HTTP headers and peer address into the store's
/// transport-neutral metadata. Non-UTF-8 header values are skipped.
fn request_meta(headers: &HeaderMap, peer: SocketAddr) -> RequestMeta {
    let mut meta = RequestMeta::new().with_peer_addr(peer.ip());
    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            meta.insert_header(name.as_str(), value);
        }
    }
    meta
}

/// Status code for a failed store operation.
fn error_status(report: &eyre::Report) -> StatusCode {
    match report.downcast_ref::<StoreError>() {
        Some(StoreError::InvalidPayload) | Some(StoreError::MalformedId(_)) => StatusCode::BAD_REQUEST,
        Some(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
        // Retry exhaustion and I/O failures are internal.
        Some(StoreError::ExhaustedRetries) | None => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(report: &eyre::Report) -> Response {
    let status = error_status(report);
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        log::error!("Internal error handling diagnostics request: {report:?}");
        return error_body(
            status,
            "Internal server error".to_string(),
            Some("The diagnostics request could not be processed.".to_string()),
        );
    }
    error_body(status, report.to_string(), None)
}

fn error_body(status: StatusCode, error: String, message: Option<String>) -> Response {
    (status, Json(ErrorBody { error, message })).into_response()
}
