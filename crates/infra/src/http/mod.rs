//! HTTP access to the flaky upstream

pub mod classify;
pub mod client;

pub use classify::{HttpOutcomeClassifier, RawResponse};
pub use client::{HttpClient, HttpClientBuilder};
