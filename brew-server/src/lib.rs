//! Brew Server - coffee-shop ordering backend
//!
//! # Overview
//!
//! - **Orders** (`orders`): one cart per user, confirm/cancel/complete state
//!   machine, stock reservation against the ingredient ledger
//! - **Instructions** (`instructions`): per-unit machine instructions built
//!   from preparation procedures, published after confirmation
//! - **Message bus** (`message`): in-process broadcast transport
//! - **Database** (`db`): SQLite through `sqlx`, embedded migrations
//! - **Cache** (`cache`): read-through cache with TTL for catalog and order reads
//! - **HTTP API** (`api`): REST routes, identity from gateway headers
//!
//! # Layout
//!
//! ```text
//! brew-server/src/
//! ├── core/          # config, state, server, background tasks
//! ├── auth/          # CurrentUser, identity middleware
//! ├── api/           # HTTP routes and handlers
//! ├── cache/         # Cache trait + dashmap backend
//! ├── db/            # pool, migrations, repositories, demo seed
//! ├── instructions/  # directory, builder, publisher, drift check, worker
//! ├── message/       # MessageBus + transports
//! ├── orders/        # ledger, resolver, cart, lifecycle
//! └── utils/         # logger, money, validation
//! ```

pub mod api;
pub mod auth;
pub mod cache;
pub mod core;
pub mod db;
pub mod instructions;
pub mod message;
pub mod orders;
pub mod utils;

pub use auth::CurrentUser;
pub use core::{Config, Server, ServerState};
pub use message::{BusMessage, MessageBus};
pub use orders::{OrderError, OrdersManager};
pub use utils::{AppError, AppResult};

pub use utils::{ApiResponse, ErrorCategory, ErrorCode};

pub use utils::logger::{init_logger, init_logger_with_file};

// Security logging macro
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

/// Load `.env`, create the work directory and install the logger
pub fn setup_environment() -> std::io::Result<Config> {
    dotenv::dotenv().ok();
    let config = Config::from_env();
    config.ensure_work_dir_structure()?;

    let log_dir = config.logs_dir();
    init_logger_with_file(
        Some(&config.log_level),
        Some(config.log_json),
        log_dir.to_str(),
    );
    Ok(config)
}

pub fn print_banner() {
    println!(
        r#"
    ____
   / __ )________ _      __
  / __  / ___/ _ \ | /| / /
 / /_/ / /  /  __/ |/ |/ /
/_____/_/   \___/|__/|__/
    "#
    );
}
