//! Long-running tasks owned by the server
//!
//! Two kinds run today: the `machine_result` worker and the periodic cache
//! sweeper. Both watch one shared [`CancellationToken`].

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use futures::FutureExt;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    /// Bus consumer
    Worker,
    /// Timer driven
    Periodic,
}

impl TaskKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Worker => "worker",
            TaskKind::Periodic => "periodic",
        }
    }
}

struct Entry {
    name: &'static str,
    kind: TaskKind,
    handle: JoinHandle<()>,
}

/// Spawned tasks plus the token that stops them
#[derive(Default)]
pub struct BackgroundTasks {
    entries: Vec<Entry>,
    shutdown: CancellationToken,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown panic")
}

impl BackgroundTasks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    /// Spawn `future`; a panic is logged and leaves the runtime running
    pub fn spawn<F>(&mut self, name: &'static str, kind: TaskKind, future: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let shutdown = self.shutdown.clone();
        let handle = tokio::spawn(async move {
            match AssertUnwindSafe(future).catch_unwind().await {
                Ok(()) if shutdown.is_cancelled() => {}
                Ok(()) => tracing::warn!(task = name, kind = kind.as_str(), "Task exited before shutdown"),
                Err(payload) => tracing::error!(
                    task = name,
                    kind = kind.as_str(),
                    panic = panic_message(payload.as_ref()),
                    "Task panicked"
                ),
            }
        });
        tracing::debug!(task = name, kind = kind.as_str(), "Task started");
        self.entries.push(Entry { name, kind, handle });
    }

    pub fn log_summary(&self) {
        let workers = self.entries.iter().filter(|e| e.kind == TaskKind::Worker).count();
        tracing::info!(
            workers,
            periodic = self.entries.len() - workers,
            "Background tasks running"
        );
    }

    /// Tasks that already exited; each one is logged
    pub fn check_health(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.handle.is_finished())
            .inspect(|e| tracing::error!(task = e.name, kind = e.kind.as_str(), "Task no longer running"))
            .count()
    }

    /// Cancel the token and join every task
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for entry in self.entries {
            if let Err(e) = entry.handle.await {
                tracing::error!(task = entry.name, error = ?e, "Task join failed");
            }
        }
        tracing::info!("Background tasks stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_shutdown_joins_worker() {
        let mut tasks = BackgroundTasks::new();
        let token = tasks.shutdown_token();
        tasks.spawn("machine_result_worker", TaskKind::Worker, async move {
            token.cancelled().await;
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(tasks.check_health(), 0);
        tasks.shutdown().await;
    }

    #[tokio::test]
    async fn test_panicked_sweeper_counts_as_unhealthy() {
        let mut tasks = BackgroundTasks::new();
        tasks.spawn("cache_sweeper", TaskKind::Periodic, async {
            panic!("sweep failed");
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(tasks.check_health(), 1);
        tasks.shutdown().await;
    }

    #[test]
    fn test_panic_message() {
        let boxed: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(boxed.as_ref()), "static");
        let boxed: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(boxed.as_ref()), "owned");
        let boxed: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(boxed.as_ref()), "unknown panic");
    }
}
