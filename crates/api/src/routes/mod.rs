//! HTTP routes

pub mod health;
pub mod scenarios;

use axum::extract::State;
use axum::routing::get;
use axum::Router;
use retrykit_core::ScenarioId;
use retrykit_infra::simulator_router;

use crate::state::AppState;

/// Health, scenario and (when enabled) simulator routes.
pub fn build_router(state: AppState) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health))
        .route("/scenarios", get(scenarios::list));

    for id in ScenarioId::all() {
        router = router.route(&id.route(), get(move |state: State<AppState>| scenarios::run(state, id)));
    }

    let simulator = state.simulator.clone();
    let router = router.with_state(state);

    match simulator {
        Some(simulator) => router.merge(simulator_router(simulator)),
        None => router,
    }
}
