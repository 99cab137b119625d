//! Error types for Tether

use thiserror::Error;

/// Vendor error codes reported by MySQL-compatible servers and client libraries.
pub mod codes {
    /// `CR_SERVER_GONE_ERROR`: "MySQL server has gone away"
    pub const SERVER_GONE_AWAY: u16 = 2006;
    /// `CR_SERVER_LOST`: "Lost connection to MySQL server during query"
    pub const SERVER_LOST: u16 = 2013;
    /// `ER_PARSE_ERROR`: SQL syntax error
    pub const PARSE_ERROR: u16 = 1064;
    /// `ER_ACCESS_DENIED_ERROR`
    pub const ACCESS_DENIED: u16 = 1045;
    /// `ER_DUP_ENTRY`
    pub const DUPLICATE_ENTRY: u16 = 1062;
    /// `ER_LOCK_DEADLOCK`
    pub const DEADLOCK: u16 = 1213;

    /// The two codes that mean the session was lost while the server is
    /// presumed reachable again after reconnecting.
    pub const TRANSIENT_CONNECTION_LOSS: [u16; 2] = [SERVER_GONE_AWAY, SERVER_LOST];
}

/// Core error type for Tether operations
#[derive(Error, Debug)]
pub enum TetherError {
    /// A failure reported by the database driver, with its numeric vendor code.
    #[error("Driver error {code}: {message}")]
    Driver { code: u16, message: String },

    #[error("Query error: {0}")]
    Query(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("{0}")]
    Other(String),
}

impl TetherError {
    /// Build a driver error from a vendor code and message.
    pub fn driver(code: u16, message: impl Into<String>) -> Self {
        Self::Driver {
            code,
            message: message.into(),
        }
    }

    /// The numeric vendor code, if the failure came from the driver.
    pub fn vendor_code(&self) -> Option<u16> {
        match self {
            Self::Driver { code, .. } => Some(*code),
            _ => None,
        }
    }

    /// Whether this failure is one of the two recognised connection-loss codes.
    pub fn is_connection_loss(&self) -> bool {
        self.vendor_code()
            .is_some_and(|code| codes::TRANSIENT_CONNECTION_LOSS.contains(&code))
    }

    /// The human-readable message without the code prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Driver { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

/// Result type alias for Tether operations
pub type Result<T> = std::result::Result<T, TetherError>;
