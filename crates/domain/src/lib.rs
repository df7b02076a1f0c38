//! # retrykit Domain
//!
//! Domain types shared by the retrykit crates.
//!
//! This crate contains:
//! - Configuration structures (`Config` and its sections)
//! - The upstream reply/failure model the retry engine classifies
//! - Domain error types and Result definitions
//! - Domain constants
//!
//! ## Architecture
//! - Depends only on `retrykit-common`
//! - No I/O; pure data and conversions

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod upstream;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use upstream::*;
