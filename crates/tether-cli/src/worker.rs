//! Poll loop run by tetherd

use std::sync::Arc;
use std::time::Duration;

use tether_connection::{FatalError, InvokeError, ResilientInvoker};
use tether_core::Value;

/// Outcome counters for a finished run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    pub polls: u64,
    pub failures: u64,
    pub affected_rows: u64,
}

/// Runs one statement on a fixed interval through the resilient invoker.
pub struct PollWorker {
    invoker: Arc<ResilientInvoker>,
    statement: String,
    params: Vec<Value>,
    interval: Duration,
}

impl PollWorker {
    pub fn new(
        invoker: Arc<ResilientInvoker>,
        statement: impl Into<String>,
        params: Vec<Value>,
        interval: Duration,
    ) -> Self {
        Self {
            invoker,
            statement: statement.into(),
            params,
            interval,
        }
    }

    /// Poll until `max_polls` is reached, the process is interrupted, or the
    /// resilience layer gives up.
    ///
    /// Operational failures have already been reported by the invoker; the
    /// loop counts them and keeps polling.
    pub async fn run(&self, max_polls: Option<u64>) -> Result<WorkerStats, FatalError> {
        let mut stats = WorkerStats::default();

        loop {
            stats.polls += 1;
            match self.invoker.execute(&self.statement, &self.params).await {
                Ok(result) => {
                    stats.affected_rows += result.affected_rows;
                    tracing::debug!(
                        poll = stats.polls,
                        affected_rows = result.affected_rows,
                        "poll completed"
                    );
                }
                Err(InvokeError::Operational(failure)) => {
                    stats.failures += 1;
                    tracing::warn!(
                        poll = stats.polls,
                        code = failure.code(),
                        "poll failed, will retry next interval"
                    );
                }
                Err(InvokeError::Fatal(fatal)) => return Err(fatal),
            }

            if max_polls.is_some_and(|max| stats.polls >= max) {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("interrupted, stopping worker");
                    break;
                }
            }
        }

        tracing::info!(
            polls = stats.polls,
            failures = stats.failures,
            affected_rows = stats.affected_rows,
            "worker stopped"
        );
        Ok(stats)
    }
}
