//! The database connection contract.

use crate::error::FlowResult;
use crate::log::SqlLogConfig;
use crate::notify::ChangeSink;
use crate::row::Row;
use crate::value::SqlValue;
use std::future::Future;

/// An open database connection.
///
/// Implementations own the compiled-statement lifecycle: a statement prepared for one call is
/// finalised before the call returns, on success and on error.
pub trait Connection: Send + Sync {
    /// Execute one or more statements that return no rows.
    fn exec_sql(&self, sql: &str) -> impl Future<Output = FlowResult<()>> + Send;

    /// Execute an INSERT and return the new row id, or `-1` when no row was inserted.
    fn execute_insert(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<i64>> + Send;

    /// Execute an UPDATE or DELETE and return the number of affected rows.
    fn execute_update_delete(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<i64>> + Send;

    /// Run a query and return every row.
    fn raw_query(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<Vec<Row>>> + Send;

    /// First column of the first row as an integer; `0` when there is no row or it is NULL.
    fn query_long(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            let rows = self.raw_query(sql, args).await?;
            match rows.first().and_then(|row| row.value(0)) {
                None | Some(SqlValue::Null) => Ok(0),
                Some(_) => rows[0].get::<i64>(0),
            }
        }
    }

    /// First column of the first row as text; `None` when there is no row or it is NULL.
    fn query_string(
        &self,
        sql: &str,
        args: &[SqlValue],
    ) -> impl Future<Output = FlowResult<Option<String>>> + Send {
        async move {
            let rows = self.raw_query(sql, args).await?;
            match rows.first() {
                Some(row) if !row.is_empty() => row.get::<Option<String>>(0),
                _ => Ok(None),
            }
        }
    }

    /// Where successful mutations are reported. `None` disables notifications.
    fn change_sink(&self) -> Option<&dyn ChangeSink> {
        None
    }

    /// How statements run on this connection are logged.
    fn log_config(&self) -> &SqlLogConfig {
        &SqlLogConfig::DEFAULT
    }
}
