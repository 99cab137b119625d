//! Reconnect-and-replay for connection-loss failures
//!
//! This module decides what happens when an operation against the live
//! session fails: connection loss is absorbed by reconnecting and replaying
//! the operation, any other failure is reported back to the caller, and a
//! run of consecutive connection losses reaching the retry ceiling becomes a
//! fatal signal for the process entry point to act on.
//!
//! # Example
//!
//! ```ignore
//! use tether_connection::{ConnectionManager, ConsoleSink, ReconnectConfig, ResilientInvoker};
//!
//! let manager = Arc::new(ConnectionManager::new(driver, config, ReconnectConfig::default()));
//! let invoker = ResilientInvoker::establish(manager, Arc::new(ConsoleSink)).await?;
//!
//! // Survives "server has gone away" between calls
//! let rows = invoker.query("SELECT id FROM jobs WHERE state = ?", &["ready".into()]).await?;
//! ```

mod config;
mod error;
mod invoker;


pub use config::{DEFAULT_MAX_RETRIES, ReconnectConfig};
pub use error::{FailureKind, FatalError, InvokeError, OperationalFailure, classify};
pub use invoker::{Invocation, ResilientInvoker};
