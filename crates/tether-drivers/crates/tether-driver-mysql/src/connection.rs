//! MySQL connection implementation

use async_trait::async_trait;
use chrono::{Datelike, Timelike};
use mysql_async::{
    Conn, Opts, OptsBuilder, Params, Row as MySqlRow, consts::ColumnType, prelude::*,
};
use tether_core::{
    Connection, ConnectionConfig, QueryResult, Result, Row, StatementResult, TetherError, Value,
};
use tokio::sync::Mutex;

use crate::map_mysql_error;

/// A single physical MySQL session.
///
/// Unlike a pool, this owns exactly one `Conn`; when the server drops it the
/// session is dead for good and the owner is expected to open a new one.
/// Dropping the value discards the session.
pub struct MySqlConnection {
    conn: Mutex<Conn>,
}

impl MySqlConnection {
    /// Connect to a MySQL database
    pub async fn connect(config: &ConnectionConfig) -> Result<Self> {
        let port = if config.port > 0 { config.port } else { 3306 };
        tracing::info!(host = %config.host, port = %port, database = ?config.database, "connecting to MySQL database");

        let mut opts_builder = OptsBuilder::from_opts(Opts::default())
            .ip_or_hostname(config.host.clone())
            .tcp_port(port)
            .db_name(config.database.clone())
            .user(config.username.clone())
            .pass(config.password.clone())
            .prefer_socket(false);

        if let Some(size) = config.get_param("stmt_cache_size") {
            let size = size.parse::<usize>().map_err(|e| {
                TetherError::Configuration(format!("Invalid stmt_cache_size '{}': {}", size, e))
            })?;
            opts_builder = opts_builder.stmt_cache_size(size);
        }

        let conn = Conn::new(opts_builder).await.map_err(map_mysql_error)?;

        tracing::info!(
            host = %config.host,
            port = %port,
            connection_id = conn.id(),
            "MySQL connection established"
        );
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }
}

fn to_params(params: &[Value]) -> Params {
    if params.is_empty() {
        Params::Empty
    } else {
        Params::Positional(params.iter().map(value_to_mysql).collect())
    }
}

/// Convert our Value type into a bindable mysql_async value
fn value_to_mysql(value: &Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(v) => mysql_async::Value::Int(*v as i64),
        Value::Int64(v) => mysql_async::Value::Int(*v),
        Value::UInt64(v) => mysql_async::Value::UInt(*v),
        Value::Float64(v) => mysql_async::Value::Double(*v),
        Value::Decimal(v) | Value::String(v) => mysql_async::Value::Bytes(v.as_bytes().to_vec()),
        Value::Bytes(v) => mysql_async::Value::Bytes(v.clone()),
        Value::Date(d) => {
            mysql_async::Value::Date(d.year() as u16, d.month() as u8, d.day() as u8, 0, 0, 0, 0)
        }
        Value::Time(t) => mysql_async::Value::Time(
            false,
            0,
            t.hour() as u8,
            t.minute() as u8,
            t.second() as u8,
            t.nanosecond() / 1_000,
        ),
        Value::DateTime(dt) => mysql_async::Value::Date(
            dt.year() as u16,
            dt.month() as u8,
            dt.day() as u8,
            dt.hour() as u8,
            dt.minute() as u8,
            dt.second() as u8,
            dt.nanosecond() / 1_000,
        ),
    }
}

/// Convert mysql_async Value to our Value type, using column type metadata
/// to correctly interpret byte strings from the text protocol.
fn mysql_value_to_value(val: mysql_async::Value, col_type: ColumnType) -> Value {
    match val {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => match String::from_utf8(bytes) {
            Ok(s) => match col_type {
                ColumnType::MYSQL_TYPE_TINY
                | ColumnType::MYSQL_TYPE_SHORT
                | ColumnType::MYSQL_TYPE_LONG
                | ColumnType::MYSQL_TYPE_LONGLONG
                | ColumnType::MYSQL_TYPE_INT24
                | ColumnType::MYSQL_TYPE_YEAR => s
                    .parse::<i64>()
                    .map(Value::Int64)
                    .or_else(|_| s.parse::<u64>().map(Value::UInt64))
                    .unwrap_or(Value::String(s)),
                ColumnType::MYSQL_TYPE_FLOAT | ColumnType::MYSQL_TYPE_DOUBLE => {
                    s.parse::<f64>().map(Value::Float64).unwrap_or(Value::String(s))
                }
                ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
                    Value::Decimal(s)
                }
                _ => Value::String(s),
            },
            Err(e) => Value::Bytes(e.into_bytes()),
        },
        mysql_async::Value::Int(i) => Value::Int64(i),
        mysql_async::Value::UInt(u) => Value::UInt64(u),
        mysql_async::Value::Float(f) => Value::Float64(f as f64),
        mysql_async::Value::Double(d) => Value::Float64(d),
        mysql_async::Value::Date(year, month, day, hour, min, sec, micro) => {
            let date = chrono::NaiveDate::from_ymd_opt(year as i32, month as u32, day as u32);
            if hour == 0 && min == 0 && sec == 0 && micro == 0 {
                date.map(Value::Date).unwrap_or_else(|| {
                    Value::String(format!("{:04}-{:02}-{:02}", year, month, day))
                })
            } else {
                date.and_then(|d| d.and_hms_micro_opt(hour as u32, min as u32, sec as u32, micro))
                    .map(Value::DateTime)
                    .unwrap_or_else(|| {
                        Value::String(format!(
                            "{:04}-{:02}-{:02} {:02}:{:02}:{:02}",
                            year, month, day, hour, min, sec
                        ))
                    })
            }
        }
        mysql_async::Value::Time(negative, days, hours, mins, secs, micros) => {
            let total_hours = days * 24 + hours as u32;
            let sign = if negative { "-" } else { "" };
            Value::String(format!(
                "{}{:02}:{:02}:{:02}.{:06}",
                sign, total_hours, mins, secs, micros
            ))
        }
    }
}

fn rows_to_result(mysql_rows: Vec<MySqlRow>, started: std::time::Instant) -> QueryResult {
    let (column_names, column_types): (Vec<String>, Vec<ColumnType>) = mysql_rows
        .first()
        .map(|row| {
            row.columns_ref()
                .iter()
                .map(|col| (col.name_str().to_string(), col.column_type()))
                .unzip::<_, _, Vec<String>, Vec<ColumnType>>()
        })
        .unwrap_or_default();

    let rows = mysql_rows
        .into_iter()
        .map(|mysql_row| {
            let values = column_types
                .iter()
                .enumerate()
                .map(|(idx, col_type)| {
                    let raw: mysql_async::Value =
                        mysql_row.get(idx).unwrap_or(mysql_async::Value::NULL);
                    mysql_value_to_value(raw, *col_type)
                })
                .collect();
            Row::new(column_names.clone(), values)
        })
        .collect();

    QueryResult {
        columns: column_names,
        rows,
        execution_time_ms: started.elapsed().as_millis() as u64,
    }
}

#[async_trait]
impl Connection for MySqlConnection {
    fn driver_name(&self) -> &str {
        "mysql"
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn execute(&self, sql: &str, params: &[Value]) -> Result<StatementResult> {
        let mut conn = self.conn.lock().await;

        if params.is_empty() {
            conn.query_drop(sql).await.map_err(map_mysql_error)?;
        } else {
            conn.exec_drop(sql, to_params(params))
                .await
                .map_err(map_mysql_error)?;
        }

        let result = StatementResult::new(conn.affected_rows(), conn.last_insert_id());
        tracing::debug!(affected_rows = result.affected_rows, "statement executed");
        Ok(result)
    }

    #[tracing::instrument(skip(self, sql, params), fields(sql_preview = %sql.chars().take(100).collect::<String>()))]
    async fn query(&self, sql: &str, params: &[Value]) -> Result<QueryResult> {
        let started = std::time::Instant::now();
        let mut conn = self.conn.lock().await;

        let mysql_rows: Vec<MySqlRow> = if params.is_empty() {
            conn.query(sql).await.map_err(map_mysql_error)?
        } else {
            conn.exec(sql, to_params(params))
                .await
                .map_err(map_mysql_error)?
        };

        let result = rows_to_result(mysql_rows, started);
        tracing::debug!(
            row_count = result.row_count(),
            execution_time_ms = result.execution_time_ms,
            "query executed successfully"
        );
        Ok(result)
    }

    async fn last_insert_id(&self) -> Result<Option<u64>> {
        Ok(self.conn.lock().await.last_insert_id())
    }
}
