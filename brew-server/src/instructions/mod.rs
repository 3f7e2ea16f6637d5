//! Machine instructions
//!
//! After an order is confirmed, every unit of every line becomes one
//! [`MachineInstruction`](shared::message::MachineInstruction) on the
//! `machine_queue` topic. Machine controllers report back on
//! `machine_result`, consumed by [`worker::run_machine_result_worker`].

pub mod builder;
pub mod directory;
pub mod publisher;
pub mod reconcile;
pub mod worker;

pub use builder::build_instruction;
pub use directory::{Directory, SqliteDirectory};
pub use publisher::{InstructionPublisher, PublishReport};
pub use reconcile::{check_all_procedures, reconcile, reconcile_procedure};
