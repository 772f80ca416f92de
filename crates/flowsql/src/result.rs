//! Result factories: what a statement produces, independent of how it is built.
//!
//! A [`ResultFactory`] turns an open connection and rendered SQL text into a typed output. The
//! mutating factories ([`UpdateDeleteResult`], [`InsertResult`]) also report the change to the
//! connection's [`ChangeSink`](crate::notify::ChangeSink), and only when something changed.

use crate::connection::Connection;
use crate::error::FlowResult;
use crate::log::{QueryKind, log_query};
use crate::notify::{ChangeAction, TableChange};
use crate::row::{FromRow, Row};
use crate::table::Table;
use std::future::Future;
use std::marker::PhantomData;

/// Maps (connection, SQL) to a typed result.
pub trait ResultFactory: Send + Sync {
    type Output: Send;

    /// Log `query`, run it on `conn` and build the output.
    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<Self::Output>> + Send;
}

fn log(conn: &impl Connection, query: &str) {
    log_query(conn.log_config(), QueryKind::from_sql(query), query);
}

/// Runs the statement and discards any rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnitResult;

impl ResultFactory for UnitResult {
    type Output = ();

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<()>> + Send {
        async move {
            log(conn, query);
            conn.exec_sql(query).await
        }
    }
}

/// Runs an UPDATE or DELETE and returns the affected row count.
#[derive(Debug, Clone)]
pub struct UpdateDeleteResult {
    pub table: Table,
    pub action: ChangeAction,
}

impl UpdateDeleteResult {
    pub fn new(table: Table, action: ChangeAction) -> Self {
        Self { table, action }
    }
}

impl ResultFactory for UpdateDeleteResult {
    type Output = i64;

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            log(conn, query);
            let count = conn.execute_update_delete(query, &[]).await?;
            if count > 0 {
                if let Some(sink) = conn.change_sink() {
                    sink.enqueue_change(TableChange::new(self.table.clone(), self.action));
                }
            }
            Ok(count)
        }
    }
}

/// Runs an INSERT and returns the new row id (`-1` when nothing was inserted).
#[derive(Debug, Clone)]
pub struct InsertResult {
    pub table: Table,
}

impl InsertResult {
    pub fn new(table: Table) -> Self {
        Self { table }
    }
}

impl ResultFactory for InsertResult {
    type Output = i64;

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            log(conn, query);
            let id = conn.execute_insert(query, &[]).await?;
            if id > 0 {
                if let Some(sink) = conn.change_sink() {
                    sink.enqueue_change(TableChange::new(self.table.clone(), ChangeAction::Insert));
                }
            }
            Ok(id)
        }
    }
}

/// First column of the first row as an integer, `0` without a row.
#[derive(Debug, Clone, Copy, Default)]
pub struct CountResult;

impl ResultFactory for CountResult {
    type Output = i64;

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            log(conn, query);
            conn.query_long(query, &[]).await
        }
    }
}

/// First column of the first row as text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringResult;

impl ResultFactory for StringResult {
    type Output = Option<String>;

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<Option<String>>> + Send {
        async move {
            log(conn, query);
            conn.query_string(query, &[]).await
        }
    }
}

/// Every row, unmapped.
#[derive(Debug, Clone, Copy, Default)]
pub struct RowsResult;

impl ResultFactory for RowsResult {
    type Output = Vec<Row>;

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<Vec<Row>>> + Send {
        async move {
            log(conn, query);
            conn.raw_query(query, &[]).await
        }
    }
}

/// Every row mapped to `T`.
pub struct ListResult<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> ListResult<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for ListResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromRow + Send> ResultFactory for ListResult<T> {
    type Output = Vec<T>;

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<Vec<T>>> + Send {
        async move {
            log(conn, query);
            let rows = conn.raw_query(query, &[]).await?;
            rows.iter().map(T::from_row).collect()
        }
    }
}

/// The first row mapped to `T`, if any.
pub struct SingleResult<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> SingleResult<T> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<T> Default for SingleResult<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: FromRow + Send> ResultFactory for SingleResult<T> {
    type Output = Option<T>;

    fn create_result(
        &self,
        conn: &impl Connection,
        query: &str,
    ) -> impl Future<Output = FlowResult<Option<T>>> + Send {
        async move {
            log(conn, query);
            let rows = conn.raw_query(query, &[]).await?;
            rows.first().map(T::from_row).transpose()
        }
    }
}
