//! Resilient statement and fetch helpers
//!
//! Thin wrappers that run a single statement through
//! [`ResilientInvoker::invoke`]. Fetch helpers keep "no matching row"
//! (`Ok(None)` / empty `Vec`) apart from "the query failed" (`Err`).

use tether_core::sql::{DeleteStatement, InsertStatement, Statement, UpdateStatement};
use tether_core::{QueryResult, Result as CoreResult, Row, StatementResult, Value};

use crate::{InvokeError, Invocation, OperationalFailure, ResilientInvoker};

impl ResilientInvoker {
    /// Execute a data-modifying statement
    pub async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult, InvokeError> {
        self.run_statement("execute", sql, params).await
    }

    /// Fetch every row
    pub async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult, InvokeError> {
        self.invoke(Invocation::statement("query", sql, params), |conn| async move {
            conn.query(sql, params).await
        })
        .await
    }

    /// Fetch the first row, `None` when nothing matched
    pub async fn query_row(&self, sql: &str, params: &[Value]) -> Result<Option<Row>, InvokeError> {
        self.invoke(Invocation::statement("query_row", sql, params), |conn| async move {
            conn.query(sql, params).await
        })
        .await
        .map(QueryResult::into_first_row)
    }

    /// Fetch the first column of the first row.
    ///
    /// `None` means no row matched; a matched SQL NULL is `Some(Value::Null)`.
    pub async fn query_scalar(&self, sql: &str, params: &[Value]) -> Result<Option<Value>, InvokeError> {
        self.invoke(Invocation::statement("query_scalar", sql, params), |conn| async move {
            conn.query(sql, params).await
        })
        .await
        .map(|result| {
            result
                .into_first_row()
                .map(|row| row.values.into_iter().next().unwrap_or(Value::Null))
        })
    }

    /// Fetch the first column of every row
    pub async fn query_column(&self, sql: &str, params: &[Value]) -> Result<Vec<Value>, InvokeError> {
        self.invoke(Invocation::statement("query_column", sql, params), |conn| async move {
            conn.query(sql, params).await
        })
        .await
        .map(QueryResult::into_first_column)
    }

    /// Insert one row, returning the generated identifier if the table has one
    pub async fn insert(&self, statement: InsertStatement) -> Result<Option<u64>, InvokeError> {
        let statement = Self::built("insert", statement.build())?;
        self.run_statement("insert", &statement.sql, &statement.params)
            .await
            .map(|result| result.last_insert_id)
    }

    /// Update rows, returning the affected row count
    pub async fn update(&self, statement: UpdateStatement) -> Result<u64, InvokeError> {
        let statement = Self::built("update", statement.build())?;
        self.run_statement("update", &statement.sql, &statement.params)
            .await
            .map(|result| result.affected_rows)
    }

    /// Delete rows, returning the affected row count
    pub async fn delete(&self, statement: DeleteStatement) -> Result<u64, InvokeError> {
        let statement = Self::built("delete", statement.build())?;
        self.run_statement("delete", &statement.sql, &statement.params)
            .await
            .map(|result| result.affected_rows)
    }

    /// Identifier generated by the last INSERT on the current session.
    ///
    /// After a reconnect the new session has no such identifier.
    pub async fn last_insert_id(&self) -> Result<Option<u64>, InvokeError> {
        self.invoke(Invocation::new("last_insert_id"), |conn| async move {
            conn.last_insert_id().await
        })
        .await
    }

    async fn run_statement(
        &self,
        operation: &str,
        sql: &str,
        params: &[Value],
    ) -> Result<StatementResult, InvokeError> {
        self.invoke(Invocation::statement(operation, sql, params), |conn| async move {
            conn.execute(sql, params).await
        })
        .await
    }

    /// A statement that could not be built never reaches the database.
    fn built(operation: &str, statement: CoreResult<Statement>) -> Result<Statement, InvokeError> {
        statement.map_err(|source| {
            tracing::error!(operation, error = %source, "could not build statement");
            OperationalFailure {
                operation: operation.to_string(),
                sql: None,
                params: Vec::new(),
                source,
            }
            .into()
        })
    }
}
