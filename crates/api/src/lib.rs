//! # retrykit API
//!
//! HTTP surface of the retry demonstrator: one `GET` route per scenario, a
//! health check, and the flaky endpoint simulator the scenarios call by
//! default.

pub mod routes;
pub mod shutdown;
pub mod state;

pub use routes::build_router;
pub use state::AppState;
