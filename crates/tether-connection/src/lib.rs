//! Tether Connection - a single long-lived, self-healing database session
//!
//! This crate owns the connection lifecycle for daemon-style workers:
//!
//! - [`ConnectionManager`] holds the one live handle, its configuration and
//!   the consecutive-failure counter, and (re)opens sessions.
//! - [`ResilientInvoker`] runs operations against that handle, reconnecting
//!   and replaying on connection loss until the retry ceiling is hit.
//! - [`ErrorSink`] receives the console error lines for failures.

mod manager;
mod query;
pub mod reconnect;
mod sink;

pub use manager::ConnectionManager;
pub use reconnect::{
    DEFAULT_MAX_RETRIES, FailureKind, FatalError, InvokeError, Invocation, OperationalFailure,
    ReconnectConfig, ResilientInvoker, classify,
};
pub use sink::{ConsoleSink, ErrorSink, format_error_line};
