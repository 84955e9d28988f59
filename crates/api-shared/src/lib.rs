//! # API Shared
//!
//! Shared utilities and definitions for the export APIs.
//!
//! Contains:
//! - Wire request/response messages (`messages` module), with OpenAPI schemas
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` and the CLI for common functionality.

pub mod health;
pub mod messages;

pub use health::HealthService;
pub use messages::*;
