//! Shared types for the Brew ordering backend
//!
//! Common types used by the server and its clients: domain models, the
//! unified error system, message bus payloads and small utilities.

pub mod error;
pub mod message;
pub mod models;
pub mod util;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

// Message bus re-exports (for convenient access)
pub use message::{BusMessage, MachineAction, MachineInstruction, MachineResult};

// Pagination re-exports
pub use models::{PageQuery, PaginatedResponse};
