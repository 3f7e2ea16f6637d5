//! Server state

use std::sync::Arc;
use std::time::{Duration, Instant};

use shared::models::PageQuery;
use sqlx::SqlitePool;

use crate::cache::CacheService;
use crate::core::tasks::{BackgroundTasks, TaskKind};
use crate::core::{Config, Result, ServerError};
use crate::db::{DbService, seed};
use crate::instructions::{self, Directory, InstructionPublisher, SqliteDirectory};
use crate::message::{MessageBus, Transport, TransportConfig};
use crate::orders::OrdersManager;

const CACHE_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Shared server state
///
/// Cloning is cheap; every field is a handle.
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub db: DbService,
    pub cache: CacheService,
    pub message_bus: MessageBus,
    pub directory: Arc<dyn Directory>,
    pub orders: OrdersManager,
    started_at: Instant,
}

impl ServerState {
    /// Wire the services around an opened database
    pub fn new(config: Config, db: DbService) -> Self {
        let cache = CacheService::in_memory(config.cache_ttl());
        let message_bus = MessageBus::from_config(TransportConfig {
            channel_capacity: config.bus_channel_capacity,
        });
        let directory: Arc<dyn Directory> = Arc::new(SqliteDirectory::new(db.pool.clone()));
        let transport: Arc<dyn Transport> = Arc::new(message_bus.clone());
        let publisher = Arc::new(InstructionPublisher::new(directory.clone(), transport));
        let orders = OrdersManager::new(db.pool.clone(), cache.clone(), publisher);

        Self {
            config,
            db,
            cache,
            message_bus,
            directory,
            orders,
            started_at: Instant::now(),
        }
    }

    /// Create the work directory, open the database and optionally seed it
    pub async fn initialize(config: &Config) -> Result<Self> {
        config.ensure_work_dir_structure()?;

        let db_path = config.database_file();
        let db_path = db_path
            .to_str()
            .ok_or_else(|| ServerError::Config(format!("Non UTF-8 database path: {db_path:?}")))?;
        let db = DbService::new(db_path).await?;

        if config.seed_demo_data && seed::seed_demo_data(&db.pool).await? {
            tracing::info!("Demo catalog loaded");
        }

        let state = Self::new(config.clone(), db);
        match instructions::check_all_procedures(state.pool(), state.directory.as_ref()).await {
            Ok(drifted) if !drifted.is_empty() => {
                tracing::warn!(drinks = drifted.len(), "Procedures out of sync with recipes");
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(error = %e, "Procedure drift check failed"),
        }
        Ok(state)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.db.pool
    }

    /// Page request with the configured default and maximum size
    pub fn page_query(&self, page: Option<u32>, limit: Option<u32>) -> PageQuery {
        PageQuery::new(page.unwrap_or(1), limit.unwrap_or(self.config.default_page_size))
            .normalized(self.config.max_page_size)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }

    /// Start the machine-result worker and the cache sweeper
    pub fn start_background_tasks(&self) -> BackgroundTasks {
        let mut tasks = BackgroundTasks::new();

        let token = tasks.shutdown_token();
        tasks.spawn(
            "machine_result_worker",
            TaskKind::Worker,
            instructions::worker::run_machine_result_worker(
                self.message_bus.clone(),
                self.orders.clone(),
                token,
            ),
        );

        let token = tasks.shutdown_token();
        let cache = self.cache.clone();
        tasks.spawn("cache_sweeper", TaskKind::Periodic, async move {
            let mut interval = tokio::time::interval(CACHE_SWEEP_INTERVAL);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        cache.purge_expired();
                    }
                }
            }
        });

        tasks.log_summary();
        tasks
    }
}
