use std::path::PathBuf;

/// Server configuration
///
/// # Environment variables
///
/// Every field can be overridden from the environment (a `.env` file is
/// loaded by `main` first):
///
/// | Variable | Default | Description |
/// |----------|---------|-------------|
/// | WORK_DIR | ./data | Working directory (database, logs) |
/// | DATABASE_PATH | `{WORK_DIR}/database/brew.db` | SQLite file |
/// | HTTP_PORT | 3000 | HTTP API port |
/// | ENVIRONMENT | development | development / staging / production |
/// | LOG_LEVEL | info | tracing level |
/// | LOG_JSON | false | JSON log lines |
/// | LOG_DIR | `{WORK_DIR}/logs` | Daily rolling log files |
/// | CACHE_TTL_SECS | 1800 | Read-through cache TTL |
/// | BUS_CHANNEL_CAPACITY | 1024 | Message bus buffer size |
/// | REQUEST_TIMEOUT_MS | 30000 | Per-request timeout |
/// | DEFAULT_PAGE_SIZE | 20 | Page size when the client sends none |
/// | MAX_PAGE_SIZE | 100 | Upper bound for page size |
/// | SEED_DEMO_DATA | false | Load the demo catalog into an empty database |
///
/// # Example
///
/// ```ignore
/// WORK_DIR=/data/brew HTTP_PORT=8080 cargo run
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    /// Working directory for the database and logs
    pub work_dir: String,
    /// Explicit database file; `None` means `{work_dir}/database/brew.db`
    pub database_path: Option<String>,
    /// HTTP API port
    pub http_port: u16,
    /// Runtime environment: development | staging | production
    pub environment: String,
    pub log_level: String,
    pub log_json: bool,
    /// Explicit log directory; `None` means `{work_dir}/logs`
    pub log_dir: Option<String>,
    /// Read-through cache TTL in seconds
    pub cache_ttl_secs: u64,
    /// Message bus broadcast buffer
    pub bus_channel_capacity: usize,
    /// Request timeout (ms)
    pub request_timeout_ms: u64,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub seed_demo_data: bool,
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from the environment, falling back to defaults
    pub fn from_env() -> Self {
        Self {
            work_dir: std::env::var("WORK_DIR").unwrap_or_else(|_| "./data".into()),
            database_path: std::env::var("DATABASE_PATH").ok(),
            http_port: env_or("HTTP_PORT", 3000),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".into()),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".into()),
            log_json: env_or("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok(),
            cache_ttl_secs: env_or("CACHE_TTL_SECS", 1800),
            bus_channel_capacity: env_or("BUS_CHANNEL_CAPACITY", 1024),
            request_timeout_ms: env_or("REQUEST_TIMEOUT_MS", 30000),
            default_page_size: env_or("DEFAULT_PAGE_SIZE", 20),
            max_page_size: env_or("MAX_PAGE_SIZE", 100),
            seed_demo_data: env_or("SEED_DEMO_DATA", false),
        }
    }

    /// Override the working directory and port
    ///
    /// Used by tests to point the server at a temporary directory.
    pub fn with_overrides(work_dir: impl Into<String>, http_port: u16) -> Self {
        let mut config = Self::from_env();
        config.work_dir = work_dir.into();
        config.database_path = None;
        config.log_dir = None;
        config.http_port = http_port;
        config.seed_demo_data = false;
        config
    }

    pub fn database_dir(&self) -> PathBuf {
        PathBuf::from(&self.work_dir).join("database")
    }

    /// Resolved database file path
    pub fn database_file(&self) -> PathBuf {
        match &self.database_path {
            Some(p) => PathBuf::from(p),
            None => self.database_dir().join("brew.db"),
        }
    }

    /// Resolved log directory
    pub fn logs_dir(&self) -> PathBuf {
        match &self.log_dir {
            Some(p) => PathBuf::from(p),
            None => PathBuf::from(&self.work_dir).join("logs"),
        }
    }

    /// Create the working directory layout
    pub fn ensure_work_dir_structure(&self) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.work_dir)?;
        if let Some(parent) = self.database_file().parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::create_dir_all(self.logs_dir())?;
        Ok(())
    }

    pub fn cache_ttl(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
