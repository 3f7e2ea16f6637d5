//! Transport abstraction
//!
//! Producers publish through [`Transport`] so the instruction publisher does
//! not depend on the concrete channel. [`MessageBus`](super::MessageBus) is
//! the server-side implementation; [`MemoryTransport`] is a subscriber
//! handle that can also publish (used by tests and in-process consumers).

mod memory;

pub use memory::MemoryTransport;

use async_trait::async_trait;

use crate::utils::AppError;

#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    /// Publish an encoded payload on `topic`
    async fn publish(&self, topic: &str, payload: Vec<u8>) -> Result<(), AppError>;
}
