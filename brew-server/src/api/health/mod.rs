//! Health routes
//!
//! | Path | Method | Notes |
//! |------|--------|-------|
//! | /health | GET | liveness |
//! | /health/detailed | GET | database and message bus checks |
//!
//! Both live outside `/api` and need no identity headers.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/detailed", get(detailed_health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    status: &'static str,
    version: &'static str,
    uptime_seconds: u64,
    checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    database: CheckResult,
    message_bus: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    /// ok | error
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    subscribers: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl CheckResult {
    fn ok() -> Self {
        Self {
            status: "ok",
            latency_ms: None,
            subscribers: None,
            message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            latency_ms: None,
            subscribers: None,
            message: Some(message.into()),
        }
    }

    fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

pub async fn detailed_health(State(state): State<ServerState>) -> Json<DetailedHealthResponse> {
    let db_start = std::time::Instant::now();
    let database = match sqlx::query_scalar::<_, i64>("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => CheckResult {
            latency_ms: Some(db_start.elapsed().as_millis() as u64),
            ..CheckResult::ok()
        },
        Err(e) => CheckResult::error(format!("Database error: {e}")),
    };

    // the machine-result worker holds a subscription while it runs
    let subscribers = state.message_bus.subscriber_count();
    let message_bus = if subscribers > 0 {
        CheckResult {
            subscribers: Some(subscribers),
            ..CheckResult::ok()
        }
    } else {
        CheckResult::error("No active subscribers")
    };

    let all_ok = database.is_ok() && message_bus.is_ok();
    Json(DetailedHealthResponse {
        status: if all_ok { "healthy" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        uptime_seconds: state.uptime().as_secs(),
        checks: HealthChecks {
            database,
            message_bus,
        },
    })
}
