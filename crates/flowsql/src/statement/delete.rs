//! `DELETE FROM <table>`

use crate::connection::Connection;
use crate::error::FlowResult;
use crate::log::QueryKind;
use crate::notify::ChangeAction;
use crate::query::{Mutation, Query};
use crate::table::{Adapter, Table};

/// Entry points for DELETE statements.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delete;

impl Delete {
    /// `DELETE FROM <table>`, ready for a WHERE clause.
    pub fn from(adapter: &impl Adapter) -> DeleteFrom {
        DeleteFrom {
            table: adapter.table(),
        }
    }

    /// Delete every row of `adapter`'s table. Returns the number of rows removed.
    pub async fn table(conn: &impl Connection, adapter: &impl Adapter) -> FlowResult<i64> {
        let from = Delete::from(adapter);
        from.execute_update_delete(conn).await
    }

    /// Delete every row of each table, in order. Returns the total number of rows removed.
    pub async fn tables(conn: &impl Connection, tables: &[Table]) -> FlowResult<i64> {
        let mut total = 0;
        for table in tables {
            total += Delete::table(conn, table).await?;
        }
        Ok(total)
    }
}

/// A DELETE bound to its table.
#[derive(Debug, Clone, PartialEq)]
pub struct DeleteFrom {
    table: Table,
}

impl DeleteFrom {
    pub fn table(&self) -> &Table {
        &self.table
    }
}

impl Query for DeleteFrom {
    fn query(&self) -> String {
        format!("DELETE FROM {}", self.table.quoted_name())
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Delete
    }

    fn primary_table(&self) -> Option<Table> {
        Some(self.table.clone())
    }
}

impl Mutation for DeleteFrom {
    fn target_table(&self) -> Table {
        self.table.clone()
    }

    fn change_action(&self) -> ChangeAction {
        ChangeAction::Delete
    }
}
