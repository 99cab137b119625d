//! MySQL driver implementation

use async_trait::async_trait;
use std::sync::Arc;
use tether_core::{Connection, ConnectionConfig, DatabaseDriver, Result, TetherError};

use crate::MySqlConnection;

/// MySQL database driver
pub struct MySqlDriver;

impl MySqlDriver {
    /// Create a new MySQL driver instance
    pub fn new() -> Self {
        tracing::debug!("MySQL driver initialized");
        Self
    }
}

impl Default for MySqlDriver {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DatabaseDriver for MySqlDriver {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn default_port(&self) -> Option<u16> {
        Some(3306)
    }

    #[tracing::instrument(skip(self, config), fields(host = %config.host, database = ?config.database))]
    async fn connect(&self, config: &ConnectionConfig) -> Result<Arc<dyn Connection>> {
        if config.driver != "mysql" && config.driver != "mariadb" {
            return Err(TetherError::Configuration(format!(
                "MySQL driver cannot open a '{}' connection",
                config.driver
            )));
        }
        let connection = MySqlConnection::connect(config).await?;
        Ok(Arc::new(connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_metadata() {
        let driver = MySqlDriver::new();
        assert_eq!(driver.name(), "mysql");
        assert_eq!(driver.default_port(), Some(3306));
    }

    #[tokio::test]
    async fn test_rejects_foreign_driver_config() {
        let mut config = ConnectionConfig::new_mysql("localhost", 3306, "jobs", "worker");
        config.driver = "postgres".into();
        let result = MySqlDriver::new().connect(&config).await;
        assert!(matches!(result, Err(TetherError::Configuration(_))));
    }
}
