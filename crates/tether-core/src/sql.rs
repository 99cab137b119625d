//! Parameterized INSERT/UPDATE/DELETE builders
//!
//! Builders only shape SQL text and positional parameters; running the
//! statement is left to whoever holds a connection. Identifiers are quoted
//! with backticks and values are always bound as `?` parameters.

use crate::{Result, TetherError, Value};

/// SQL text plus the positional parameters it binds, in order
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub params: Vec<Value>,
}

/// Escape a MySQL identifier (column name, etc.)
pub fn quote_identifier(identifier: &str) -> String {
    format!("`{}`", identifier.replace('`', "``"))
}

/// Escape a table name which may include a schema (e.g., "schema.table").
///
/// Names with more than one dot or an empty part are rejected.
pub fn quote_table_name(table_name: &str) -> Result<String> {
    let parts: Vec<&str> = table_name.split('.').collect();
    if parts.len() > 2 || parts.iter().any(|part| part.is_empty()) {
        return Err(TetherError::Query(format!(
            "invalid table name '{}': expected `table` or `schema.table`",
            table_name
        )));
    }
    Ok(parts
        .iter()
        .map(|part| quote_identifier(part))
        .collect::<Vec<_>>()
        .join("."))
}

/// A WHERE clause made of `AND`-joined conditions
#[derive(Debug, Clone, Default)]
struct Filter {
    clauses: Vec<String>,
    params: Vec<Value>,
}

impl Filter {
    fn eq(&mut self, column: &str, value: Value) {
        if value.is_null() {
            self.clauses
                .push(format!("{} IS NULL", quote_identifier(column)));
        } else {
            self.clauses.push(format!("{} = ?", quote_identifier(column)));
            self.params.push(value);
        }
    }

    fn raw(&mut self, clause: &str, params: Vec<Value>) {
        self.clauses.push(format!("({})", clause));
        self.params.extend(params);
    }

    fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    fn render(&self) -> String {
        self.clauses.join(" AND ")
    }
}

/// `INSERT INTO t (a, b) VALUES (?, ?)`
#[derive(Debug, Clone)]
pub struct InsertStatement {
    table: String,
    values: Vec<(String, Value)>,
}

impl InsertStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            values: Vec::new(),
        }
    }

    /// Add a column and the value to insert into it
    pub fn value(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.push((column.into(), value.into()));
        self
    }

    pub fn build(self) -> Result<Statement> {
        if self.values.is_empty() {
            return Err(TetherError::Query(format!(
                "INSERT into {} has no columns",
                self.table
            )));
        }

        let (columns, params): (Vec<String>, Vec<Value>) = self
            .values
            .into_iter()
            .map(|(column, value)| (quote_identifier(&column), value))
            .unzip();
        let placeholders = vec!["?"; params.len()].join(", ");

        Ok(Statement {
            sql: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_table_name(&self.table)?,
                columns.join(", "),
                placeholders
            ),
            params,
        })
    }
}

/// `UPDATE t SET a = ? WHERE b = ?`
///
/// Refuses to build without a WHERE clause unless [`UpdateStatement::all_rows`]
/// was called.
#[derive(Debug, Clone)]
pub struct UpdateStatement {
    table: String,
    assignments: Vec<(String, Value)>,
    filter: Filter,
    all_rows: bool,
}

impl UpdateStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            assignments: Vec::new(),
            filter: Filter::default(),
            all_rows: false,
        }
    }

    pub fn set(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.assignments.push((column.into(), value.into()));
        self
    }

    /// `column = ?`, or `column IS NULL` for a NULL value
    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter.eq(column, value.into());
        self
    }

    /// A caller-written condition using `?` placeholders for `params`
    pub fn where_raw(mut self, clause: &str, params: Vec<Value>) -> Self {
        self.filter.raw(clause, params);
        self
    }

    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    pub fn build(self) -> Result<Statement> {
        if self.assignments.is_empty() {
            return Err(TetherError::Query(format!(
                "UPDATE of {} has no assignments",
                self.table
            )));
        }
        if self.filter.is_empty() && !self.all_rows {
            return Err(TetherError::Query(format!(
                "UPDATE of {} has no WHERE clause",
                self.table
            )));
        }

        let mut sql = format!("UPDATE {} SET ", quote_table_name(&self.table)?);
        let mut params = Vec::with_capacity(self.assignments.len() + self.filter.params.len());
        let assignments: Vec<String> = self
            .assignments
            .into_iter()
            .map(|(column, value)| {
                params.push(value);
                format!("{} = ?", quote_identifier(&column))
            })
            .collect();
        sql.push_str(&assignments.join(", "));

        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter.render());
            params.extend(self.filter.params);
        }

        Ok(Statement { sql, params })
    }
}

/// `DELETE FROM t WHERE a = ?`
///
/// Refuses to build without a WHERE clause unless [`DeleteStatement::all_rows`]
/// was called.
#[derive(Debug, Clone)]
pub struct DeleteStatement {
    table: String,
    filter: Filter,
    all_rows: bool,
}

impl DeleteStatement {
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: Filter::default(),
            all_rows: false,
        }
    }

    pub fn where_eq(mut self, column: &str, value: impl Into<Value>) -> Self {
        self.filter.eq(column, value.into());
        self
    }

    pub fn where_raw(mut self, clause: &str, params: Vec<Value>) -> Self {
        self.filter.raw(clause, params);
        self
    }

    pub fn all_rows(mut self) -> Self {
        self.all_rows = true;
        self
    }

    pub fn build(self) -> Result<Statement> {
        if self.filter.is_empty() && !self.all_rows {
            return Err(TetherError::Query(format!(
                "DELETE from {} has no WHERE clause",
                self.table
            )));
        }

        let mut sql = format!("DELETE FROM {}", quote_table_name(&self.table)?);
        if !self.filter.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&self.filter.render());
        }

        Ok(Statement {
            sql,
            params: self.filter.params,
        })
    }
}
