use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use retrykit_domain::constants::{
    PATH_ALWAYS_FAIL, PATH_COUNTER, PATH_COUNTER_RESET, PATH_FAIL_THEN_NOT_FOUND, PATH_FAIL_TWICE,
    PATH_FAIL_TWICE_SLOW, SIMULATOR_PERIOD, SUCCESS_BODY,
};
use serde_json::{json, Value};
use tracing::info;

use super::SimulatorState;

/// Routes for the simulated upstream, with `state` already applied.
pub fn simulator_router<S>(state: SimulatorState) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    Router::new()
        .route(PATH_ALWAYS_FAIL, post(always_fail))
        .route(PATH_FAIL_TWICE, post(fail_twice))
        .route(PATH_FAIL_TWICE_SLOW, post(fail_twice_slow))
        .route(PATH_FAIL_THEN_NOT_FOUND, post(fail_then_not_found))
        .route(PATH_COUNTER, get(counter))
        .route(PATH_COUNTER_RESET, post(reset_counter))
        .with_state(state)
}

async fn always_fail(State(state): State<SimulatorState>) -> Response {
    info!(
        counter = state.counter.current(),
        path = PATH_ALWAYS_FAIL,
        at = %Utc::now(),
        "Simulator call"
    );
    StatusCode::SERVICE_UNAVAILABLE.into_response()
}

async fn fail_twice(State(state): State<SimulatorState>) -> Response {
    recover_every_period(&state, PATH_FAIL_TWICE)
}

async fn fail_twice_slow(State(state): State<SimulatorState>) -> Response {
    tokio::time::sleep(state.slow_delay).await;
    recover_every_period(&state, PATH_FAIL_TWICE_SLOW)
}

async fn fail_then_not_found(State(state): State<SimulatorState>) -> Response {
    let count = count_call(&state, PATH_FAIL_THEN_NOT_FOUND);
    if count % SIMULATOR_PERIOD == 0 {
        StatusCode::NOT_FOUND.into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

async fn counter(State(state): State<SimulatorState>) -> Json<Value> {
    Json(json!({ "counter": state.counter.current() }))
}

async fn reset_counter(State(state): State<SimulatorState>) -> Json<Value> {
    let previous = state.counter.reset();
    info!(previous, "Simulator counter reset");
    Json(json!({ "counter": 0, "previous": previous }))
}

fn recover_every_period(state: &SimulatorState, path: &'static str) -> Response {
    let count = count_call(state, path);
    if count % SIMULATOR_PERIOD == 0 {
        (StatusCode::OK, SUCCESS_BODY).into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

fn count_call(state: &SimulatorState, path: &'static str) -> u64 {
    let count = state.counter.next();
    info!(counter = count, path, at = %Utc::now(), "Simulator call");
    count
}
