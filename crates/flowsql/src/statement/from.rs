//! `SELECT … FROM <table>` with optional alias and joins.

use crate::error::FlowResult;
use crate::log::QueryKind;
use crate::name_alias::{NameAlias, quote_if_needed};
use crate::operator::{Condition, OperatorGroup};
use crate::property::AsColumn;
use crate::query::{Queriable, Query};
use crate::statement::select::Select;
use crate::table::{Adapter, Table};

/// Join operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    LeftOuter,
    Cross,
    Natural,
}

impl JoinKind {
    fn as_sql(self) -> &'static str {
        match self {
            JoinKind::Inner => "INNER JOIN",
            JoinKind::LeftOuter => "LEFT OUTER JOIN",
            JoinKind::Cross => "CROSS JOIN",
            JoinKind::Natural => "NATURAL JOIN",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum JoinConstraint {
    None,
    On(OperatorGroup),
    Using(Vec<NameAlias>),
}

/// One join in a FROM clause.
#[derive(Debug, Clone, PartialEq)]
pub struct Join {
    kind: JoinKind,
    table: Table,
    alias: Option<String>,
    constraint: JoinConstraint,
}

impl Join {
    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn query(&self) -> String {
        let mut sql = format!("{} {}", self.kind.as_sql(), self.table.quoted_name());
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(&quote_if_needed(alias));
        }
        match &self.constraint {
            JoinConstraint::None => {}
            JoinConstraint::On(group) => {
                sql.push_str(" ON ");
                sql.push_str(&group.query());
            }
            JoinConstraint::Using(columns) => {
                let columns: Vec<String> = columns.iter().map(NameAlias::query).collect();
                sql.push_str(" USING (");
                sql.push_str(&columns.join(", "));
                sql.push(')');
            }
        }
        sql
    }

    /// Construction errors inside the ON constraint.
    pub fn validate(&self) -> FlowResult<()> {
        match &self.constraint {
            JoinConstraint::On(group) => group.validate(),
            JoinConstraint::None | JoinConstraint::Using(_) => Ok(()),
        }
    }
}

/// A select bound to its source table.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectFrom {
    select: Select,
    table: Table,
    alias: Option<String>,
    joins: Vec<Join>,
}

impl SelectFrom {
    pub(crate) fn new(select: Select, table: Table) -> Self {
        Self {
            select,
            table,
            alias: None,
            joins: Vec::new(),
        }
    }

    /// `FROM <table> AS <alias>`
    pub fn as_alias(&self, alias: impl Into<String>) -> Self {
        Self {
            alias: Some(alias.into()),
            ..self.clone()
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    pub fn joins(&self) -> &[Join] {
        &self.joins
    }

    /// Start a join against `adapter`'s table.
    pub fn join(&self, kind: JoinKind, adapter: &impl Adapter) -> JoinBuilder {
        JoinBuilder {
            from: self.clone(),
            join: Join {
                kind,
                table: adapter.table(),
                alias: None,
                constraint: JoinConstraint::None,
            },
        }
    }

    pub fn inner_join(&self, adapter: &impl Adapter) -> JoinBuilder {
        self.join(JoinKind::Inner, adapter)
    }

    pub fn left_outer_join(&self, adapter: &impl Adapter) -> JoinBuilder {
        self.join(JoinKind::LeftOuter, adapter)
    }

    /// `CROSS JOIN <table>`; takes no constraint.
    pub fn cross_join(&self, adapter: &impl Adapter) -> Self {
        self.join(JoinKind::Cross, adapter).end()
    }

    /// `NATURAL JOIN <table>`; takes no constraint.
    pub fn natural_join(&self, adapter: &impl Adapter) -> Self {
        self.join(JoinKind::Natural, adapter).end()
    }
}

impl Query for SelectFrom {
    fn query(&self) -> String {
        let mut sql = format!("{} FROM {}", self.select.query(), self.table.quoted_name());
        if let Some(alias) = &self.alias {
            sql.push_str(" AS ");
            sql.push_str(&quote_if_needed(alias));
        }
        for join in &self.joins {
            sql.push(' ');
            sql.push_str(&join.query());
        }
        sql
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Select
    }

    fn validate(&self) -> FlowResult<()> {
        self.joins.iter().try_for_each(Join::validate)
    }

    fn primary_table(&self) -> Option<Table> {
        Some(self.table.clone())
    }

    fn associated_tables(&self) -> Vec<Table> {
        std::iter::once(self.table.clone())
            .chain(self.joins.iter().map(|join| join.table.clone()))
            .collect()
    }
}

impl Queriable for SelectFrom {}

/// A pending join waiting for its constraint.
#[derive(Debug, Clone)]
pub struct JoinBuilder {
    from: SelectFrom,
    join: Join,
}

impl JoinBuilder {
    /// `<kind> JOIN <table> AS <alias>`
    pub fn as_alias(mut self, alias: impl Into<String>) -> Self {
        self.join.alias = Some(alias.into());
        self
    }

    /// `ON <conditions>` joined with AND.
    pub fn on<C: Into<Condition>>(mut self, conditions: impl IntoIterator<Item = C>) -> SelectFrom {
        let group = OperatorGroup::non_grouping_clause().and_all(conditions);
        self.join.constraint = JoinConstraint::On(group);
        self.end()
    }

    /// `USING (<columns>)`
    pub fn using(mut self, columns: &[&dyn AsColumn]) -> SelectFrom {
        let columns = columns.iter().map(|c| c.column_name()).collect();
        self.join.constraint = JoinConstraint::Using(columns);
        self.end()
    }

    /// Finish without a constraint.
    pub fn end(self) -> SelectFrom {
        let mut from = self.from;
        from.joins.push(self.join);
        from
    }
}
