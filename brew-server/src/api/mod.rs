//! HTTP API
//!
//! - [`health`] - liveness and component checks (no identity required)
//! - [`categories`], [`drinks`], [`ingredients`], [`recipes`] - catalog
//! - [`orders`] - cart and order lifecycle
//! - [`machines`] - machine and procedure directory (admin)
//!
//! Reads are open to any identified caller; catalog writes and directory
//! routes are admin-only.

pub mod categories;
pub mod drinks;
pub mod health;
pub mod ingredients;
pub mod machines;
pub mod orders;
pub mod recipes;

use axum::Router;

use crate::core::ServerState;
use crate::db::repository::RepoError;
use crate::utils::{AppError, ErrorCode};

pub use crate::utils::AppResult;

/// All routes, without state or outer middleware
pub fn routes() -> Router<ServerState> {
    Router::<ServerState>::new()
        .merge(health::router())
        .merge(categories::router())
        .merge(drinks::router())
        .merge(ingredients::router())
        .merge(recipes::router())
        .merge(orders::router())
        .merge(machines::router())
}

/// Map repository errors, giving not-found and unique violations a
/// resource-specific code
pub(crate) fn repo_error(err: RepoError, not_found: ErrorCode, duplicate: ErrorCode) -> AppError {
    match err {
        RepoError::NotFound(msg) => AppError::with_message(not_found, msg),
        RepoError::Duplicate(msg) => AppError::with_message(duplicate, msg),
        other => other.into(),
    }
}
