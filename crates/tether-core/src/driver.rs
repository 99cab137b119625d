//! Database driver trait definition

use crate::{Connection, ConnectionConfig, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Opens database sessions.
///
/// A driver is stateless apart from its own settings; every call to
/// [`DatabaseDriver::connect`] opens a brand new physical session.
#[async_trait]
pub trait DatabaseDriver: Send + Sync {
    /// Get the driver identifier (e.g., "mysql")
    fn name(&self) -> &'static str;

    /// Get the default port
    fn default_port(&self) -> Option<u16> {
        None
    }

    /// Open a new session with the given configuration
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>>;
}
