//! Connection trait

use crate::{QueryResult, Result, StatementResult, Value};
use async_trait::async_trait;

/// A single live database session.
///
/// Implementations must report every failure as an `Err` carrying the
/// vendor code where one exists; a session never signals failure through
/// a silent return value.
#[async_trait]
pub trait Connection: Send + Sync {
    /// Get the driver name (e.g., "mysql")
    fn driver_name(&self) -> &str;

    /// Prepare `sql`, bind `params` positionally and execute it, returning the
    /// rowcount and any generated identifier (INSERT/UPDATE/DELETE/SET)
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult>;

    /// Prepare `sql`, bind `params` positionally and fetch every row (SELECT)
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult>;

    /// Identifier generated by the most recent successful INSERT on this session
    async fn last_insert_id(&self) -> Result<Option<u64>>;
}
