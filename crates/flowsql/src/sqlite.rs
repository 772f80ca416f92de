//! [`Connection`] over an embedded SQLite database (`rusqlite`).
//!
//! One `rusqlite::Connection` is shared behind a mutex. Every call locks, prepares, binds,
//! steps and finalises inside one synchronous section, so no lock or prepared statement is
//! held across an `.await`.

use crate::config::ConnectionConfig;
use crate::connection::Connection;
use crate::error::{FlowError, FlowResult};
use crate::log::SqlLogConfig;
use crate::notify::ChangeSink;
use crate::row::Row;
use crate::value::SqlValue;
use rusqlite::params_from_iter;
use std::future::Future;
use std::sync::{Arc, Mutex};

/// A SQLite database connection.
pub struct SqliteConnection {
    conn: Mutex<rusqlite::Connection>,
    config: ConnectionConfig,
    sink: Option<Arc<dyn ChangeSink>>,
}

impl std::fmt::Debug for SqliteConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteConnection")
            .field("config", &self.config)
            .field("change_sink", &self.sink.is_some())
            .finish()
    }
}

impl SqliteConnection {
    /// Open a database as described by `config`.
    pub fn open(config: ConnectionConfig) -> FlowResult<Self> {
        let conn = match &config.path {
            Some(path) => rusqlite::Connection::open(path),
            None => rusqlite::Connection::open_in_memory(),
        }
        .map_err(FlowError::from_sqlite_error)?;

        if let Some(timeout) = config.busy_timeout {
            conn.busy_timeout(timeout)
                .map_err(FlowError::from_sqlite_error)?;
        }
        if config.foreign_keys {
            conn.execute_batch("PRAGMA foreign_keys = ON;")
                .map_err(FlowError::from_sqlite_error)?;
        }

        tracing::debug!(
            target: "flowsql.sqlite",
            path = ?config.path,
            foreign_keys = config.foreign_keys,
            "opened sqlite connection"
        );

        Ok(Self {
            conn: Mutex::new(conn),
            config,
            sink: None,
        })
    }

    /// Open a private in-memory database with default settings.
    pub fn open_in_memory() -> FlowResult<Self> {
        Self::open(ConnectionConfig::in_memory())
    }

    /// Report successful mutations to `sink`.
    pub fn with_change_sink(mut self, sink: Arc<dyn ChangeSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    fn run<T>(
        &self,
        f: impl FnOnce(&rusqlite::Connection) -> rusqlite::Result<T>,
    ) -> FlowResult<T> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| FlowError::Connection("sqlite connection mutex poisoned".to_string()))?;
        f(&conn).map_err(FlowError::from_sqlite_error)
    }
}

fn bind(args: &[SqlValue]) -> impl Iterator<Item = rusqlite::types::Value> + '_ {
    args.iter().cloned().map(rusqlite::types::Value::from)
}

impl Connection for SqliteConnection {
    fn exec_sql(&self, sql: &str) -> impl Future<Output = FlowResult<()>> + Send {
        async move { self.run(|conn| conn.execute_batch(sql)) }
    }

    fn execute_insert(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            self.run(|conn| {
                let mut stmt = conn.prepare(sql)?;
                let inserted = stmt.execute(params_from_iter(bind(args)))?;
                Ok(if inserted > 0 {
                    conn.last_insert_rowid()
                } else {
                    -1
                })
            })
        }
    }

    fn execute_update_delete(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            self.run(|conn| {
                let mut stmt = conn.prepare(sql)?;
                let changed = stmt.execute(params_from_iter(bind(args)))?;
                Ok(i64::try_from(changed).unwrap_or(i64::MAX))
            })
        }
    }

    fn raw_query(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<Vec<Row>>> + Send {
        async move {
            self.run(|conn| {
                let mut stmt = conn.prepare(sql)?;
                let columns: Arc<[String]> =
                    stmt.column_names().into_iter().map(String::from).collect();
                let width = columns.len();
                let mut rows = stmt.query(params_from_iter(bind(args)))?;
                let mut out = Vec::new();
                while let Some(row) = rows.next()? {
                    let values = (0..width)
                        .map(|idx| row.get_ref(idx).map(SqlValue::from))
                        .collect::<rusqlite::Result<Vec<_>>>()?;
                    out.push(Row::new(columns.clone(), values));
                }
                Ok(out)
            })
        }
    }

    fn change_sink(&self) -> Option<&dyn ChangeSink> {
        self.sink.as_deref()
    }

    fn log_config(&self) -> &SqlLogConfig {
        &self.config.log
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn insert_returns_row_id_or_minus_one() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.exec_sql("CREATE TABLE t (id INTEGER PRIMARY KEY, name TEXT UNIQUE)")
            .await
            .unwrap();
        let id = conn
            .execute_insert("INSERT INTO t(name) VALUES(?)", &["a".into()])
            .await
            .unwrap();
        assert_eq!(id, 1);
        let ignored = conn
            .execute_insert("INSERT OR IGNORE INTO t(name) VALUES('a')", &[])
            .await
            .unwrap();
        assert_eq!(ignored, -1);
    }

    #[tokio::test]
    async fn constraint_errors_are_classified() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        conn.exec_sql("CREATE TABLE t (name TEXT UNIQUE NOT NULL)")
            .await
            .unwrap();
        conn.execute_insert("INSERT INTO t VALUES('a')", &[])
            .await
            .unwrap();
        let err = conn
            .execute_insert("INSERT INTO t VALUES('a')", &[])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation());
        let err = conn
            .execute_insert("INSERT INTO t VALUES(NULL)", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, FlowError::NotNullViolation(_)));
    }

    #[tokio::test]
    async fn raw_query_reads_columns_and_values() {
        let conn = SqliteConnection::open_in_memory().unwrap();
        let rows = conn
            .raw_query("SELECT 1 AS one, 'x' AS two, NULL AS three", &[])
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].columns(), ["one", "two", "three"]);
        assert_eq!(rows[0].value(2), Some(&SqlValue::Null));
        assert_eq!(conn.query_long("SELECT 42", &[]).await.unwrap(), 42);
        assert_eq!(
            conn.query_string("SELECT 'hi'", &[]).await.unwrap().as_deref(),
            Some("hi")
        );
        assert_eq!(conn.query_long("SELECT 1 WHERE 0", &[]).await.unwrap(), 0);
    }
}
