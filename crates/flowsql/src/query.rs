//! Execution traits joining statements, result factories and connections.

use crate::connection::Connection;
use crate::error::{FlowError, FlowResult};
use crate::log::QueryKind;
use crate::notify::ChangeAction;
use crate::result::{
    CountResult, ListResult, ResultFactory, RowsResult, SingleResult, StringResult, UnitResult,
    UpdateDeleteResult,
};
use crate::row::{FromRow, Row};
use crate::table::Table;
use std::future::Future;

/// A renderable statement.
pub trait Query: Send + Sync {
    /// Render the statement as SQL text.
    fn query(&self) -> String;

    /// The statement kind, used for logging.
    fn kind(&self) -> QueryKind;

    /// Report construction errors. Called before any connection access.
    fn validate(&self) -> FlowResult<()> {
        Ok(())
    }

    /// The table this statement reads from or writes to.
    fn primary_table(&self) -> Option<Table> {
        None
    }

    /// Every table this statement touches: the primary table plus tables read by sub-statements.
    fn associated_tables(&self) -> Vec<Table> {
        self.primary_table().into_iter().collect()
    }

    /// Validate and render.
    fn build(&self) -> FlowResult<String> {
        self.validate()?;
        Ok(self.query())
    }

    /// Validate, render and run through `factory`.
    fn execute_with<F: ResultFactory>(
        &self,
        conn: &impl Connection,
        factory: &F,
    ) -> impl Future<Output = FlowResult<F::Output>> + Send {
        async move {
            let sql = self.build()?;
            factory.create_result(conn, &sql).await
        }
    }

    /// Run the statement, discarding any rows.
    fn execute(&self, conn: &impl Connection) -> impl Future<Output = FlowResult<()>> + Send {
        self.execute_with(conn, &UnitResult)
    }
}

/// A sub-statement embedded in another statement: rendered when it is attached, with the
/// construction error it reported kept for the outer [`Query::validate`].
#[derive(Debug)]
pub(crate) struct SubQuery {
    sql: String,
    tables: Vec<Table>,
    error: Option<FlowError>,
}

impl SubQuery {
    pub(crate) fn capture(query: &impl Query) -> Self {
        Self {
            sql: query.query(),
            tables: query.associated_tables(),
            error: query.validate().err(),
        }
    }

    pub(crate) fn sql(&self) -> &str {
        &self.sql
    }

    pub(crate) fn tables(&self) -> &[Table] {
        &self.tables
    }

    pub(crate) fn validate(&self) -> FlowResult<()> {
        match &self.error {
            Some(err) => Err(err.detached()),
            None => Ok(()),
        }
    }
}

impl Clone for SubQuery {
    fn clone(&self) -> Self {
        Self {
            sql: self.sql.clone(),
            tables: self.tables.clone(),
            error: self.error.as_ref().map(FlowError::detached),
        }
    }
}

impl PartialEq for SubQuery {
    fn eq(&self, other: &Self) -> bool {
        self.sql == other.sql
            && self.tables == other.tables
            && self.error.as_ref().map(ToString::to_string)
                == other.error.as_ref().map(ToString::to_string)
    }
}

/// Statements that produce rows.
pub trait Queriable: Query {
    /// Every row mapped to `T`.
    fn query_list<T: FromRow + Send>(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = FlowResult<Vec<T>>> + Send {
        async move { self.execute_with(conn, &ListResult::<T>::new()).await }
    }

    /// The first row mapped to `T`, if any.
    fn query_single<T: FromRow + Send>(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = FlowResult<Option<T>>> + Send {
        async move { self.execute_with(conn, &SingleResult::<T>::new()).await }
    }

    /// Every row, unmapped.
    fn query_rows(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = FlowResult<Vec<Row>>> + Send {
        async move { self.execute_with(conn, &RowsResult).await }
    }

    /// Number of rows the statement yields: `SELECT COUNT(*) FROM (<statement>)`.
    fn count(&self, conn: &impl Connection) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            let sql = format!("SELECT COUNT(*) FROM ({})", self.build()?);
            CountResult.create_result(conn, &sql).await
        }
    }

    /// Whether the statement yields any row.
    ///
    /// Construction errors are returned. An error from the database is logged and read as
    /// `false`.
    fn has_data(&self, conn: &impl Connection) -> impl Future<Output = FlowResult<bool>> + Send {
        async move {
            let sql = format!("SELECT COUNT(*) FROM ({})", self.build()?);
            match CountResult.create_result(conn, &sql).await {
                Ok(count) => Ok(count > 0),
                Err(err) => {
                    tracing::warn!(target: "flowsql.sql", error = %err, "has_data query failed");
                    Ok(false)
                }
            }
        }
    }

    /// First column of the first row as text.
    fn string_value(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = FlowResult<Option<String>>> + Send {
        async move { self.execute_with(conn, &StringResult).await }
    }

    /// First column of the first row as an integer, `0` without a row.
    fn long_value(&self, conn: &impl Connection) -> impl Future<Output = FlowResult<i64>> + Send {
        async move { self.execute_with(conn, &CountResult).await }
    }
}

/// UPDATE and DELETE statements.
pub trait Mutation: Query {
    /// The table being changed.
    fn target_table(&self) -> Table;

    /// The change reported after a successful run.
    fn change_action(&self) -> ChangeAction;

    /// Run and return the affected row count; reports one change when it is non-zero.
    fn execute_update_delete(
        &self,
        conn: &impl Connection,
    ) -> impl Future<Output = FlowResult<i64>> + Send {
        async move {
            let factory = UpdateDeleteResult::new(self.target_table(), self.change_action());
            self.execute_with(conn, &factory).await
        }
    }
}
