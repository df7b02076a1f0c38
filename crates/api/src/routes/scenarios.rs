//! Scenario entry points
//!
//! Each `GET /testN` runs one scenario and maps its result onto the HTTP
//! response:
//!
//! | Result | Status | Body |
//! |--------|--------|------|
//! | success | upstream status | upstream body |
//! | fallback | fallback status | fallback body, plus `x-retry-fallback: true` |
//! | exhausted on status errors | 500 | error JSON |
//! | exhausted on transport errors | 502 | error JSON |
//! | rejected by the filter | original upstream status | upstream body |
//! | cancelled | 500 | error JSON |
//!
//! Every scenario response carries `x-retry-attempts`.

use axum::extract::State;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use retrykit_common::RetryError;
use retrykit_core::{ScenarioId, ScenarioResolution, ScenarioResult};
use retrykit_domain::constants::{HEADER_RETRY_ATTEMPTS, HEADER_RETRY_FALLBACK};
use retrykit_domain::{RetryKitError, UpstreamFailure, UpstreamReply};
use serde_json::{json, Value};
use tracing::warn;

use crate::state::AppState;

/// Run `id` and render its result.
pub async fn run(State(state): State<AppState>, id: ScenarioId) -> Response {
    let result = state.scenarios.run_with_cancellation(id, &state.shutdown).await;
    ScenarioResponse(result).into_response()
}

/// Catalog of scenario routes
pub async fn list() -> Json<Value> {
    let scenarios: Vec<Value> = ScenarioId::all()
        .iter()
        .map(|id| {
            json!({
                "id": id.as_str(),
                "route": id.route(),
                "upstream_path": id.upstream_path(),
            })
        })
        .collect();
    Json(json!({ "scenarios": scenarios }))
}

/// HTTP rendering of a [`ScenarioResult`]
#[derive(Debug)]
pub struct ScenarioResponse(pub ScenarioResult);

impl IntoResponse for ScenarioResponse {
    fn into_response(self) -> Response {
        let ScenarioResult { scenario, resolution, attempts, .. } = self.0;

        let mut response = match resolution {
            ScenarioResolution::Success(reply) => reply_response(reply),
            ScenarioResolution::Recovered(reply) => {
                let mut response = reply_response(reply);
                response.headers_mut().insert(
                    HeaderName::from_static(HEADER_RETRY_FALLBACK),
                    HeaderValue::from_static("true"),
                );
                response
            }
            ScenarioResolution::Failed(err) => failure_response(scenario, err),
        };

        response
            .headers_mut()
            .insert(HeaderName::from_static(HEADER_RETRY_ATTEMPTS), HeaderValue::from(attempts));
        response
    }
}

fn reply_response(reply: UpstreamReply) -> Response {
    (status_or_bad_gateway(reply.status), reply.body).into_response()
}

fn failure_response(scenario: ScenarioId, err: RetryError<UpstreamFailure>) -> Response {
    match err {
        RetryError::NonRetryable { source: UpstreamFailure::Status { status, body }, .. } => {
            (status_or_bad_gateway(status), body).into_response()
        }
        RetryError::NonRetryable { source: source @ UpstreamFailure::Transport { .. }, .. } => {
            warn!(%scenario, error = %source, "Upstream unreachable");
            error_body(StatusCode::BAD_GATEWAY, source.into())
        }
        RetryError::Exhausted { ref last_error, .. } => {
            let status = if last_error.status_code().is_some() {
                StatusCode::INTERNAL_SERVER_ERROR
            } else {
                StatusCode::BAD_GATEWAY
            };
            error_body(status, err.into())
        }
        RetryError::Cancelled { .. } => error_body(StatusCode::INTERNAL_SERVER_ERROR, err.into()),
    }
}

fn error_body(status: StatusCode, error: RetryKitError) -> Response {
    (status, Json(error)).into_response()
}

fn status_or_bad_gateway(status: u16) -> StatusCode {
    StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY)
}
