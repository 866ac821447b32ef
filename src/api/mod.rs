//! HTTP API layer: route tables, handlers, and structured errors.

pub mod error;
pub mod handlers;
mod rest;

pub use error::{ApiError, ErrorCode};
pub use rest::{public_router, router};
