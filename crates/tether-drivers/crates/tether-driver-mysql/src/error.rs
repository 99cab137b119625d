//! Translation of `mysql_async` failures into vendor-coded errors

use mysql_async::{DriverError, Error as MySqlError};
use tether_core::{TetherError, codes};

/// Map a `mysql_async` error onto [`TetherError`].
///
/// Server errors keep their own code. Socket-level failures have no server
/// code, so they are reported the way the C client does: an I/O error on a
/// live session is `CR_SERVER_LOST` (2013) and a session the driver already
/// knows is closed is `CR_SERVER_GONE_ERROR` (2006).
pub fn map_mysql_error(err: MySqlError) -> TetherError {
    match err {
        MySqlError::Server(server) => TetherError::driver(server.code, server.message),
        MySqlError::Io(io) => TetherError::driver(
            codes::SERVER_LOST,
            format!("Lost connection to MySQL server during query: {}", io),
        ),
        MySqlError::Driver(DriverError::ConnectionClosed) => TetherError::driver(
            codes::SERVER_GONE_AWAY,
            "MySQL server has gone away: connection closed",
        ),
        MySqlError::Driver(driver) => TetherError::Query(format!("MySQL driver error: {}", driver)),
        MySqlError::Url(url) => TetherError::Configuration(format!("Invalid MySQL URL: {}", url)),
        other => TetherError::Other(other.to_string()),
    }
}
