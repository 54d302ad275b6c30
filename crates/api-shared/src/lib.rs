//! # API Shared
//!
//! Shared utilities and definitions for HPR APIs.
//!
//! Contains:
//! - JSON wire types with OpenAPI schemas (`wire` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the `hpr-run` binary for common functionality.

pub mod health;
pub mod wire;

pub use health::HealthService;
pub use wire::*;
