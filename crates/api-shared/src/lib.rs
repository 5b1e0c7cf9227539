//! # API Shared
//!
//! Shared utilities and definitions for the vaccination tracker APIs.
//!
//! Contains:
//! - Request and response bodies (`dto` module) with their OpenAPI schemas
//! - Shared services like `HealthService`
//! - Session token extraction from request headers
//!
//! Used by `api-rest` for common functionality.

pub mod auth;
pub mod dto;
pub mod health;

pub use dto::*;
pub use health::HealthService;
