//! `INSERT [OR <conflict>] INTO <table>[(cols)] VALUES(…)[,(…)]` or `… <select>`.

use crate::connection::Connection;
use crate::error::{FlowError, FlowResult};
use crate::log::QueryKind;
use crate::name_alias::NameAlias;
use crate::operator::Operator;
use crate::property::AsColumn;
use crate::query::{Query, SubQuery};
use crate::result::InsertResult;
use crate::table::{Adapter, ConflictAction, Table};
use crate::value::SqlValue;

/// INSERT statement builder.
///
/// Arity and shape problems are recorded while building and reported by
/// [`Query::validate`], which every execution path calls before touching the connection.
#[derive(Debug, Clone, PartialEq)]
pub struct Insert {
    table: Table,
    conflict: ConflictAction,
    columns: Option<Vec<NameAlias>>,
    rows: Vec<Vec<SqlValue>>,
    select: Option<SubQuery>,
    build_error: Option<String>,
}

impl Insert {
    /// Insert into `adapter`'s table with its default insert conflict action.
    pub fn new(adapter: &impl Adapter) -> Self {
        let table = adapter.table();
        Self {
            conflict: table.insert_conflict_action(),
            table,
            columns: None,
            rows: Vec::new(),
            select: None,
            build_error: None,
        }
    }

    /// Set the conflict resolution.
    pub fn or(&self, conflict: ConflictAction) -> Self {
        Self {
            conflict,
            ..self.clone()
        }
    }

    pub fn or_replace(&self) -> Self {
        self.or(ConflictAction::Replace)
    }

    pub fn or_rollback(&self) -> Self {
        self.or(ConflictAction::Rollback)
    }

    pub fn or_abort(&self) -> Self {
        self.or(ConflictAction::Abort)
    }

    pub fn or_fail(&self) -> Self {
        self.or(ConflictAction::Fail)
    }

    pub fn or_ignore(&self) -> Self {
        self.or(ConflictAction::Ignore)
    }

    /// Explicit column list.
    pub fn columns(&self, columns: &[&dyn AsColumn]) -> Self {
        Self {
            columns: Some(columns.iter().map(|c| c.column_name()).collect()),
            ..self.clone()
        }
    }

    /// Use every column the table declares, in table order.
    pub fn as_columns(&self) -> Self {
        Self {
            columns: Some(self.table.column_names()),
            ..self.clone()
        }
    }

    /// Append one VALUES row.
    pub fn values<V: Into<SqlValue>>(&self, row: impl IntoIterator<Item = V>) -> Self {
        let mut next = self.clone();
        next.rows.push(row.into_iter().map(Into::into).collect());
        next
    }

    /// Append several VALUES rows.
    pub fn values_rows<V, R>(&self, rows: impl IntoIterator<Item = R>) -> Self
    where
        V: Into<SqlValue>,
        R: IntoIterator<Item = V>,
    {
        rows.into_iter().fold(self.clone(), |insert, row| insert.values(row))
    }

    /// Set the column list and a single row from `column=value` operators.
    pub fn column_values(&self, operators: impl IntoIterator<Item = Operator>) -> Self {
        let mut next = self.clone();
        let mut columns = Vec::new();
        let mut row = Vec::new();
        for op in operators {
            match op.value() {
                Some(value) => {
                    columns.push(op.column().clone());
                    row.push(value.clone());
                }
                None => {
                    next.build_error = Some(format!(
                        "column_values expects literal values, got `{}`",
                        op.query()
                    ));
                }
            }
        }
        next.columns = Some(columns);
        next.rows = vec![row];
        next
    }

    /// Insert the rows produced by `query` instead of VALUES.
    pub fn select(&self, query: &impl Query) -> Self {
        Self {
            select: Some(SubQuery::capture(query)),
            ..self.clone()
        }
    }

    pub fn conflict_action(&self) -> ConflictAction {
        self.conflict
    }

    /// Run the insert and return the new row id, `-1` when nothing was inserted.
    pub async fn execute_insert(&self, conn: &impl Connection) -> FlowResult<i64> {
        self.execute_with(conn, &InsertResult::new(self.table.clone()))
            .await
    }

    fn render_row(row: &[SqlValue]) -> String {
        let values: Vec<String> = row.iter().map(SqlValue::to_literal).collect();
        format!("({})", values.join(","))
    }
}

impl Query for Insert {
    fn query(&self) -> String {
        let mut sql = format!(
            "INSERT {}INTO {}",
            self.conflict.or_clause(),
            self.table.quoted_name()
        );
        if let Some(columns) = &self.columns {
            let names: Vec<String> = columns.iter().map(NameAlias::query).collect();
            sql.push('(');
            sql.push_str(&names.join(","));
            sql.push(')');
        }
        match &self.select {
            Some(select) => {
                sql.push(' ');
                sql.push_str(select.sql());
            }
            None => {
                let rows: Vec<String> = self.rows.iter().map(|r| Self::render_row(r)).collect();
                sql.push_str(" VALUES");
                sql.push_str(&rows.join(","));
            }
        }
        sql
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Insert
    }

    fn validate(&self) -> FlowResult<()> {
        if let Some(err) = &self.build_error {
            return Err(FlowError::validation(err.clone()));
        }
        match (self.rows.is_empty(), self.select.is_some()) {
            (true, false) => return Err(FlowError::EmptyValues),
            (false, true) => return Err(FlowError::ValuesWithSelect),
            _ => {}
        }
        // `INSERT INTO t() VALUES()` is not SQL.
        let empty_columns = self.columns.as_ref().is_some_and(Vec::is_empty);
        if empty_columns || self.rows.iter().any(Vec::is_empty) {
            return Err(FlowError::EmptyValues);
        }
        if let Some(select) = &self.select {
            select.validate()?;
        }
        if let Some(columns) = &self.columns {
            for (row, values) in self.rows.iter().enumerate() {
                if values.len() != columns.len() {
                    return Err(FlowError::Arity {
                        row,
                        expected: columns.len(),
                        actual: values.len(),
                    });
                }
            }
        }
        Ok(())
    }

    fn primary_table(&self) -> Option<Table> {
        Some(self.table.clone())
    }

    fn associated_tables(&self) -> Vec<Table> {
        let mut tables = vec![self.table.clone()];
        let select_tables = self.select.as_ref().map(SubQuery::tables).unwrap_or_default();
        for table in select_tables {
            if !tables.contains(table) {
                tables.push(table.clone());
            }
        }
        tables
    }
}
