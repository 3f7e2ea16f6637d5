//! Data models
//!
//! Shared between brew-server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All relational IDs are `i64` (SQLite INTEGER PRIMARY KEY); timestamps are
//! Unix milliseconds.

pub mod category;
pub mod drink;
pub mod ingredient;
pub mod order;
pub mod page;
pub mod procedure;
pub mod recipe;

// Re-exports
pub use category::*;
pub use drink::*;
pub use ingredient::*;
pub use order::*;
pub use page::*;
pub use procedure::*;
pub use recipe::*;
