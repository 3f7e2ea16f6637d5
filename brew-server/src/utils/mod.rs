//! Utilities
//!
//! - [`AppError`] / [`AppResult`] - re-exported from `shared::error`
//! - [`logger`] - tracing subscriber setup
//! - [`money`] - decimal arithmetic for prices
//! - [`validation`] - input validation helpers

pub mod logger;
pub mod money;
pub mod validation;

pub use shared::error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
