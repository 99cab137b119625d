//! Resilient operation runner
//!
//! Every operation goes through one explicit loop:
//!
//! ```text
//! CONNECTED  --fails, transient--> RECOVERING
//! RECOVERING --reconnect ok------> REPLAYING
//! RECOVERING --reconnect fails---> RECOVERING
//! REPLAYING  --replay ok---------> CONNECTED (counter reset)
//! REPLAYING  --fails, transient--> RECOVERING
//! any        --counter = ceiling-> TERMINATED (fatal signal)
//! CONNECTED  --fails, other------> CONNECTED (failure reported)
//! ```

use std::backtrace::{Backtrace, BacktraceStatus};
use std::future::Future;
use std::sync::Arc;

use tether_core::{Connection, TetherError, Value, format_params};
use tokio::sync::Mutex;

use super::{FailureKind, FatalError, InvokeError, OperationalFailure, classify};
use crate::{ConnectionManager, ErrorSink};

/// Description of an operation, used only for logging and failure reports.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub operation: &'a str,
    pub sql: Option<&'a str>,
    pub params: &'a [Value],
}

impl<'a> Invocation<'a> {
    /// An operation that is not a single SQL statement
    pub fn new(operation: &'a str) -> Self {
        Self {
            operation,
            sql: None,
            params: &[],
        }
    }

    /// An operation running `sql` with `params`
    pub fn statement(operation: &'a str, sql: &'a str, params: &'a [Value]) -> Self {
        Self {
            operation,
            sql: Some(sql),
            params,
        }
    }
}

/// Where a recovery loop was entered from; decides the fatal variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Setup,
    Operation,
}

/// Runs operations against the manager's live session, absorbing
/// connection loss by reconnecting and replaying.
///
/// One invocation at a time holds the gate for its whole
/// attempt/recover/replay cycle, so no task ever executes against a handle
/// that another task is replacing.
pub struct ResilientInvoker {
    manager: Arc<ConnectionManager>,
    sink: Arc<dyn ErrorSink>,
    gate: Mutex<()>,
}

impl ResilientInvoker {
    /// Wrap a manager that already holds (or will lazily recover) a session.
    pub fn new(manager: Arc<ConnectionManager>, sink: Arc<dyn ErrorSink>) -> Self {
        Self {
            manager,
            sink,
            gate: Mutex::new(()),
        }
    }

    /// Open the manager's first session, retrying connection failures up to
    /// the retry ceiling.
    ///
    /// Any failure to open or configure the session counts as connection
    /// loss; there is no operation to replay afterwards.
    pub async fn establish(
        manager: Arc<ConnectionManager>,
        sink: Arc<dyn ErrorSink>,
    ) -> Result<Self, FatalError> {
        let invoker = Self::new(manager, sink);
        {
            let _gate = invoker.gate.lock().await;
            invoker.recover(Phase::Setup).await?;
        }
        invoker.manager.reset_retries();
        Ok(invoker)
    }

    pub fn manager(&self) -> &Arc<ConnectionManager> {
        &self.manager
    }

    /// Run `operation` against the live session.
    ///
    /// On connection loss the session is re-established and `operation` is
    /// called again with the new handle, so it must be safe to replay.
    /// Operations inside an open transaction are not: the transaction is
    /// gone with the old session.
    pub async fn invoke<T, F, Fut>(
        &self,
        invocation: Invocation<'_>,
        mut operation: F,
    ) -> Result<T, InvokeError>
    where
        F: FnMut(Arc<dyn Connection>) -> Fut,
        Fut: Future<Output = tether_core::Result<T>>,
    {
        let _gate = self.gate.lock().await;
        let mut replays = 0u32;

        loop {
            let outcome = match self.manager.current_handle().await {
                Ok(conn) => operation(conn).await,
                Err(err) => Err(err),
            };

            let err = match outcome {
                Ok(value) => {
                    if replays > 0 {
                        tracing::info!(
                            operation = invocation.operation,
                            replays,
                            "operation succeeded after reconnect"
                        );
                    }
                    self.manager.reset_retries();
                    return Ok(value);
                }
                Err(err) => err,
            };

            match classify(&err) {
                FailureKind::Operational => {
                    // A replay that reached the server ends the run of losses.
                    if replays > 0 {
                        self.manager.reset_retries();
                    }
                    return Err(self.report_operational(invocation, err).into());
                }
                FailureKind::TransientConnectionLoss => {
                    tracing::warn!(
                        operation = invocation.operation,
                        code = err.vendor_code(),
                        error = %err,
                        "connection lost during operation"
                    );
                    self.count_failure(Phase::Operation, err)?;
                    self.recover(Phase::Operation).await?;
                    replays += 1;
                    tracing::debug!(operation = invocation.operation, replays, "replaying operation");
                }
            }
        }
    }

    /// Reconnect until a session is open or the ceiling is reached.
    async fn recover(&self, phase: Phase) -> Result<(), FatalError> {
        loop {
            match self.manager.reconnect().await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    tracing::warn!(
                        code = err.vendor_code(),
                        error = %err,
                        attempt = self.manager.retry_count() + 1,
                        "reconnect failed"
                    );
                    self.count_failure(phase, err)?;
                }
            }
        }
    }

    /// Record one connection-loss failure; at the ceiling, report once and
    /// turn it into the fatal signal.
    fn count_failure(&self, phase: Phase, err: TetherError) -> Result<(), FatalError> {
        let failures = self.manager.record_transient_failure();
        let ceiling = self.manager.retry_ceiling();

        if failures < ceiling {
            return Ok(());
        }

        let message = format!("Maximum retries made ({})", ceiling);
        tracing::error!(ceiling, error = %err, "{}", message);
        self.sink.error(&message);

        Err(match phase {
            Phase::Setup => FatalError::SetupFailure {
                ceiling,
                last_error: err,
            },
            Phase::Operation => FatalError::RecoveryExhausted {
                ceiling,
                last_error: err,
            },
        })
    }

    fn report_operational(&self, invocation: Invocation<'_>, err: TetherError) -> OperationalFailure {
        let failure = OperationalFailure {
            operation: invocation.operation.to_string(),
            sql: invocation.sql.map(str::to_string),
            params: invocation.params.to_vec(),
            source: err,
        };

        let backtrace = Backtrace::capture();
        tracing::error!(
            operation = %failure.operation,
            sql = failure.sql.as_deref(),
            params = %format_params(&failure.params),
            code = failure.code(),
            error = %failure.source,
            backtrace = %backtrace,
            "operation failed"
        );

        let mut line = failure.report();
        if backtrace.status() == BacktraceStatus::Captured {
            line.push('\n');
            line.push_str(&backtrace.to_string());
        }
        self.sink.error(&line);

        failure
    }
}

impl std::fmt::Debug for ResilientInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResilientInvoker")
            .field("manager", &self.manager)
            .finish_non_exhaustive()
    }
}
