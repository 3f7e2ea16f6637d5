//! Core module - configuration, state, background tasks and the HTTP server
//!
//! - [`Config`] - environment-driven configuration
//! - [`ServerState`] - shared handles (pool, cache, bus, orders)
//! - [`BackgroundTasks`] - worker / periodic task registry
//! - [`Server`] - HTTP server
//! - [`ServerError`] - startup errors

pub mod config;
pub mod error;
pub mod server;
pub mod state;
pub mod tasks;

pub use config::Config;
pub use error::{Result, ServerError};
pub use server::{Server, build_app};
pub use state::ServerState;
pub use tasks::{BackgroundTasks, TaskKind};
