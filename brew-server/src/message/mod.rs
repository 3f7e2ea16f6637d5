//! In-process message bus
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │              MessageBus              │
//! │   broadcast::Sender<BusMessage>      │
//! └──────────────────┬───────────────────┘
//!                    │ Transport::publish(topic, payload)
//!         ┌──────────┴──────────┐
//!         ▼                     ▼
//!  machine_queue consumers   machine_result worker
//!  (MemoryTransport)         (instructions::worker)
//! ```
//!
//! Every subscriber sees every message; consumers filter by topic.

pub mod bus;
pub mod transport;

pub use bus::{MessageBus, TransportConfig};
pub use shared::message::{BusMessage, MACHINE_QUEUE, MACHINE_RESULT};
pub use transport::{MemoryTransport, Transport};
