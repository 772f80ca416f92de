//! `CREATE [UNIQUE] INDEX IF NOT EXISTS …` and its DROP counterpart.

use crate::connection::Connection;
use crate::error::{FlowError, FlowResult};
use crate::log::QueryKind;
use crate::name_alias::{NameAlias, quote_if_needed};
use crate::property::AsColumn;
use crate::query::Query;
use crate::table::{Adapter, Table};

/// An index definition that can be created and dropped at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Index {
    name: String,
    table: Option<Table>,
    columns: Vec<NameAlias>,
    unique: bool,
}

impl Index {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            table: None,
            columns: Vec::new(),
            unique: false,
        }
    }

    /// Make the index UNIQUE. There is no way back.
    pub fn unique(&self) -> Self {
        Self {
            unique: true,
            ..self.clone()
        }
    }

    /// Index `columns` of `adapter`'s table, replacing any previous target.
    pub fn on(&self, adapter: &impl Adapter, columns: &[&dyn AsColumn]) -> Self {
        Self {
            table: Some(adapter.table()),
            columns: columns.iter().map(|c| c.column_name()).collect(),
            ..self.clone()
        }
    }

    /// Append one more column.
    pub fn and(&self, column: &dyn AsColumn) -> Self {
        let mut next = self.clone();
        next.columns.push(column.column_name());
        next
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Create the index if it does not exist.
    pub async fn enable(&self, conn: &impl Connection) -> FlowResult<()> {
        self.execute(conn).await
    }

    /// Drop the index if it exists.
    pub async fn disable(&self, conn: &impl Connection) -> FlowResult<()> {
        let statement = DropIndex {
            name: self.name.clone(),
        };
        statement.execute(conn).await
    }
}

impl Query for Index {
    fn query(&self) -> String {
        let unique = if self.unique { "UNIQUE " } else { "" };
        let table = self
            .table
            .as_ref()
            .map(Table::quoted_name)
            .unwrap_or_default();
        let columns: Vec<String> = self.columns.iter().map(NameAlias::query).collect();
        format!(
            "CREATE {unique}INDEX IF NOT EXISTS {} ON {table}({})",
            quote_if_needed(&self.name),
            columns.join(", ")
        )
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Schema
    }

    fn validate(&self) -> FlowResult<()> {
        if self.table.is_none() || self.columns.is_empty() {
            return Err(FlowError::validation(format!(
                "index `{}` needs a table and at least one column",
                self.name
            )));
        }
        Ok(())
    }

    fn primary_table(&self) -> Option<Table> {
        self.table.clone()
    }
}

/// `DROP INDEX IF EXISTS <name>`
#[derive(Debug, Clone)]
struct DropIndex {
    name: String,
}

impl Query for DropIndex {
    fn query(&self) -> String {
        format!("DROP INDEX IF EXISTS {}", quote_if_needed(&self.name))
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Schema
    }
}
