//! Table metadata handed to statement entry points.
//!
//! Every builder entry point takes an explicit [`Adapter`]; there is no process-wide registry.
//! Generated per-table adapters implement [`Adapter`], and hand-written code can use [`Table`]
//! directly since it implements the trait as well.

use crate::name_alias::{NameAlias, quote_if_needed};
use crate::property::Property;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// SQLite `ON CONFLICT` resolution used by `INSERT OR …` and `UPDATE OR …`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ConflictAction {
    /// No conflict clause.
    #[default]
    None,
    Rollback,
    Abort,
    Fail,
    Ignore,
    Replace,
}

impl ConflictAction {
    /// The SQL keyword, or `None` for [`ConflictAction::None`].
    pub fn keyword(self) -> Option<&'static str> {
        match self {
            ConflictAction::None => None,
            ConflictAction::Rollback => Some("ROLLBACK"),
            ConflictAction::Abort => Some("ABORT"),
            ConflictAction::Fail => Some("FAIL"),
            ConflictAction::Ignore => Some("IGNORE"),
            ConflictAction::Replace => Some("REPLACE"),
        }
    }

    /// `OR <KEYWORD> ` prefix, empty for [`ConflictAction::None`].
    pub(crate) fn or_clause(self) -> String {
        match self.keyword() {
            Some(keyword) => format!("OR {keyword} "),
            None => String::new(),
        }
    }
}

#[derive(Debug)]
struct TableInner {
    name: String,
    columns: Vec<String>,
    insert_conflict: ConflictAction,
    update_conflict: ConflictAction,
}

/// Handle describing one table: name, declared columns and conflict defaults.
///
/// Cloning is cheap. Two handles are equal when they name the same table.
#[derive(Clone)]
pub struct Table {
    inner: Arc<TableInner>,
}

impl Table {
    /// Describe a table by name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(TableInner {
                name: name.into(),
                columns: Vec::new(),
                insert_conflict: ConflictAction::None,
                update_conflict: ConflictAction::None,
            }),
        }
    }

    fn map(self, f: impl FnOnce(&mut TableInner)) -> Self {
        let mut inner = TableInner {
            name: self.inner.name.clone(),
            columns: self.inner.columns.clone(),
            insert_conflict: self.inner.insert_conflict,
            update_conflict: self.inner.update_conflict,
        };
        f(&mut inner);
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Declare the table's columns, in table order.
    pub fn with_columns(self, columns: &[&str]) -> Self {
        self.map(|t| t.columns = columns.iter().map(|c| c.to_string()).collect())
    }

    /// Default conflict action for INSERT statements on this table.
    pub fn with_insert_conflict(self, action: ConflictAction) -> Self {
        self.map(|t| t.insert_conflict = action)
    }

    /// Default conflict action for UPDATE statements on this table.
    pub fn with_update_conflict(self, action: ConflictAction) -> Self {
        self.map(|t| t.update_conflict = action)
    }

    /// The unquoted table name.
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// The table name as rendered in SQL.
    pub fn quoted_name(&self) -> String {
        quote_if_needed(&self.inner.name)
    }

    /// Declared column names.
    pub fn columns(&self) -> &[String] {
        &self.inner.columns
    }

    /// Declared columns as names, for `INSERT … (cols)`.
    pub fn column_names(&self) -> Vec<NameAlias> {
        self.inner.columns.iter().map(NameAlias::of).collect()
    }

    /// Whether `column` is declared on this table.
    pub fn has_column(&self, column: &str) -> bool {
        self.inner.columns.iter().any(|c| c == column)
    }

    /// Look up a declared column as a typed property. Returns `None` for unknown columns
    /// when columns were declared.
    pub fn property<T>(&self, column: &str) -> Option<Property<T>> {
        if !self.inner.columns.is_empty() && !self.has_column(column) {
            return None;
        }
        Some(Property::new(self, column))
    }

    pub fn insert_conflict_action(&self) -> ConflictAction {
        self.inner.insert_conflict
    }

    pub fn update_conflict_action(&self) -> ConflictAction {
        self.inner.update_conflict
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Table").field(&self.inner.name).finish()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.inner.name == other.inner.name
    }
}

impl Eq for Table {}

impl std::hash::Hash for Table {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.inner.name.hash(state);
    }
}

/// The metadata provider for one table.
///
/// Implemented by generated per-table adapters; statement entry points accept any adapter.
pub trait Adapter {
    /// The table this adapter is bound to.
    fn table(&self) -> Table;
}

impl Adapter for Table {
    fn table(&self) -> Table {
        self.clone()
    }
}

impl<A: Adapter + ?Sized> Adapter for &A {
    fn table(&self) -> Table {
        (**self).table()
    }
}

impl<A: Adapter + ?Sized> Adapter for Arc<A> {
    fn table(&self) -> Table {
        (**self).table()
    }
}
