//! Tether Core - driver-neutral abstractions for resilient database access
//!
//! This crate provides the traits and types shared by the driver and
//! connection crates:
//!
//! - `DatabaseDriver` - opens sessions from a `ConnectionConfig`
//! - `Connection` - a single live database session
//! - `TetherError` - errors carrying the database's numeric vendor code
//! - `sql` - parameterized INSERT/UPDATE/DELETE builders
//! - Common types like `Value`, `Row`, `QueryResult`

mod config;
mod connection;
mod driver;
mod error;
pub mod sql;
mod types;

pub use config::*;
pub use connection::*;
pub use driver::*;
pub use error::*;
pub use types::*;
