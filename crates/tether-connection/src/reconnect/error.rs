//! Failure taxonomy of the resilience layer

use tether_core::{TetherError, Value, format_params};
use thiserror::Error;

/// How a failed operation is handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// "Server has gone away" or "lost connection during query": reconnect and replay
    TransientConnectionLoss,
    /// Anything else: report to the caller, never retry
    Operational,
}

/// Classify a failure by its vendor code.
pub fn classify(error: &TetherError) -> FailureKind {
    if error.is_connection_loss() {
        FailureKind::TransientConnectionLoss
    } else {
        FailureKind::Operational
    }
}

/// A failure the caller should handle itself (bad SQL, constraint violation,
/// permission error, deadlock...). The session is still considered healthy.
#[derive(Error, Debug)]
#[error("{operation} failed: {source}")]
pub struct OperationalFailure {
    /// Name of the failed operation (e.g., "execute", "query_row")
    pub operation: String,
    /// SQL text, when the operation ran a statement
    pub sql: Option<String>,
    /// Bound parameters
    pub params: Vec<Value>,
    #[source]
    pub source: TetherError,
}

impl OperationalFailure {
    /// The vendor code of the underlying failure, if any
    pub fn code(&self) -> Option<u16> {
        self.source.vendor_code()
    }

    /// One-line description used for console reports
    pub fn report(&self) -> String {
        let code = self
            .code()
            .map_or_else(|| "-".to_string(), |code| code.to_string());
        let mut line = format!(
            "{} failed [{}] {}",
            self.operation,
            code,
            self.source.message()
        );
        if let Some(sql) = &self.sql {
            line.push_str(&format!(" | sql: {} | params: {}", sql, format_params(&self.params)));
        }
        line
    }
}

/// Conditions that end the worker. Only the process entry point acts on them.
#[derive(Error, Debug)]
pub enum FatalError {
    /// Connection loss kept recurring until the retry ceiling was reached
    #[error("Maximum retries made ({ceiling}): {last_error}")]
    RecoveryExhausted { ceiling: u32, last_error: TetherError },

    /// The initial session could not be opened and configured
    #[error("Could not establish a database session after {ceiling} attempts: {last_error}")]
    SetupFailure { ceiling: u32, last_error: TetherError },
}

impl FatalError {
    /// The retry ceiling that was exhausted
    pub fn ceiling(&self) -> u32 {
        match self {
            Self::RecoveryExhausted { ceiling, .. } | Self::SetupFailure { ceiling, .. } => {
                *ceiling
            }
        }
    }

    /// The failure that exhausted the ceiling
    pub fn last_error(&self) -> &TetherError {
        match self {
            Self::RecoveryExhausted { last_error, .. } | Self::SetupFailure { last_error, .. } => {
                last_error
            }
        }
    }
}

/// Result of a resilient operation that did not succeed
#[derive(Error, Debug)]
pub enum InvokeError {
    /// The operation failed for a reason other than connection loss
    #[error(transparent)]
    Operational(#[from] OperationalFailure),

    /// Recovery is impossible; the process should exit
    #[error(transparent)]
    Fatal(#[from] FatalError),
}

impl InvokeError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Fatal(_))
    }

    /// The vendor code of the underlying failure, if any
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::Operational(failure) => failure.code(),
            Self::Fatal(fatal) => fatal.last_error().vendor_code(),
        }
    }
}
