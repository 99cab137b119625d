//! MySQL/MariaDB driver implementation

mod connection;
mod driver;
mod error;

pub use connection::MySqlConnection;
pub use driver::MySqlDriver;
pub use error::map_mysql_error;
