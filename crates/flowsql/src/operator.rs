//! Predicate AST: single operators, groups, EXISTS and raw predicates.
//!
//! Operators render as `<column><op><value>` with values embedded as literals. Groups join their
//! members with exactly one connective; mixing AND and OR in one flat group is a construction
//! error, so precedence is always spelled out by nesting a [`OperatorGroup::clause`].
//!
//! ```
//! use flowsql::{OperatorGroup, Table};
//!
//! let users = Table::new("users");
//! let name = users.property::<String>("name").unwrap();
//! let id = users.property::<i64>("id").unwrap();
//!
//! let group = OperatorGroup::clause()
//!     .set_all_comma_separated(true)
//!     .and_all([name.eq("n"), id.eq(0)]);
//! assert_eq!(group.query(), "(`name`='n', `id`=0)");
//! ```

use crate::error::{FlowError, FlowResult};
use crate::name_alias::NameAlias;
use crate::query::SubQuery;
use crate::table::Table;
use crate::value::SqlValue;

/// Comparison operation between a column and a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Equals,
    NotEquals,
    GreaterThan,
    GreaterThanOrEquals,
    LessThan,
    LessThanOrEquals,
    Like,
    NotLike,
    Glob,
    NotGlob,
    Is,
    IsNot,
    In,
    NotIn,
    Between,
}

impl Operation {
    /// SQL spelling, including surrounding spaces for keyword operators.
    pub fn as_sql(self) -> &'static str {
        match self {
            Operation::Equals => "=",
            Operation::NotEquals => "!=",
            Operation::GreaterThan => ">",
            Operation::GreaterThanOrEquals => ">=",
            Operation::LessThan => "<",
            Operation::LessThanOrEquals => "<=",
            Operation::Like => " LIKE ",
            Operation::NotLike => " NOT LIKE ",
            Operation::Glob => " GLOB ",
            Operation::NotGlob => " NOT GLOB ",
            Operation::Is => " IS ",
            Operation::IsNot => " IS NOT ",
            Operation::In => " IN ",
            Operation::NotIn => " NOT IN ",
            Operation::Between => " BETWEEN ",
        }
    }

    // NULL never compares equal, so `=`/`!=` against NULL become `IS`/`IS NOT`.
    fn for_null(self) -> Self {
        match self {
            Operation::Equals => Operation::Is,
            Operation::NotEquals => Operation::IsNot,
            other => other,
        }
    }
}

/// Collating sequence appended as `COLLATE <name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collate {
    Binary,
    NoCase,
    RTrim,
}

impl Collate {
    pub fn as_sql(self) -> &'static str {
        match self {
            Collate::Binary => "BINARY",
            Collate::NoCase => "NOCASE",
            Collate::RTrim => "RTRIM",
        }
    }
}

/// Right-hand side of an operator.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operand {
    Value(SqlValue),
    Column(NameAlias),
    Query(SubQuery),
    List(Vec<SqlValue>),
    Range(SqlValue, SqlValue),
}

impl Operand {
    fn render(&self) -> String {
        match self {
            Operand::Value(v) => v.to_literal(),
            Operand::Column(name) => name.query(),
            Operand::Query(sub) => format!("({})", sub.sql()),
            Operand::List(values) => {
                let items: Vec<String> = values.iter().map(SqlValue::to_literal).collect();
                format!("({})", items.join(","))
            }
            Operand::Range(from, to) => format!("{} AND {}", from.to_literal(), to.to_literal()),
        }
    }
}

/// A single `column OP value` predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    column: NameAlias,
    operation: Operation,
    operand: Operand,
    collation: Option<Collate>,
}

impl Operator {
    pub(crate) fn with_operand(column: NameAlias, operation: Operation, operand: Operand) -> Self {
        Self {
            column,
            operation,
            operand,
            collation: None,
        }
    }

    /// Untyped operator against a literal value.
    pub fn new(column: NameAlias, operation: Operation, value: impl Into<SqlValue>) -> Self {
        Self::with_operand(column, operation, Operand::Value(value.into()))
    }

    /// Untyped operator comparing two columns.
    pub fn columns(column: NameAlias, operation: Operation, other: NameAlias) -> Self {
        Self::with_operand(column, operation, Operand::Column(other))
    }

    /// Append `COLLATE <collation>`.
    pub fn collate(&self, collation: Collate) -> Self {
        Self {
            collation: Some(collation),
            ..self.clone()
        }
    }

    pub fn column(&self) -> &NameAlias {
        &self.column
    }

    /// The operation as rendered; `=`/`!=` against NULL report `IS`/`IS NOT`.
    pub fn operation(&self) -> Operation {
        match &self.operand {
            Operand::Value(SqlValue::Null) => self.operation.for_null(),
            _ => self.operation,
        }
    }

    /// The literal value, when the right-hand side is a single value.
    pub fn value(&self) -> Option<&SqlValue> {
        match &self.operand {
            Operand::Value(v) => Some(v),
            _ => None,
        }
    }

    /// Construction errors from a sub-select operand.
    pub fn validate(&self) -> FlowResult<()> {
        match &self.operand {
            Operand::Query(sub) => sub.validate(),
            _ => Ok(()),
        }
    }

    pub(crate) fn sub_tables(&self) -> &[Table] {
        match &self.operand {
            Operand::Query(sub) => sub.tables(),
            _ => &[],
        }
    }

    pub fn query(&self) -> String {
        let mut sql = format!(
            "{}{}{}",
            self.column.query(),
            self.operation().as_sql(),
            self.operand.render()
        );
        if let Some(collation) = self.collation {
            sql.push_str(" COLLATE ");
            sql.push_str(collation.as_sql());
        }
        sql
    }
}

/// Connective joining the members of an [`OperatorGroup`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connective {
    And,
    Or,
}

impl Connective {
    fn separator(self) -> &'static str {
        match self {
            Connective::And => " AND ",
            Connective::Or => " OR ",
        }
    }
}

/// A group of conditions joined by one connective.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorGroup {
    conditions: Vec<Condition>,
    connective: Option<Connective>,
    comma_separated: bool,
    grouping: bool,
    use_parenthesis: bool,
    mixed: bool,
}

impl Default for OperatorGroup {
    fn default() -> Self {
        Self::clause()
    }
}

impl OperatorGroup {
    /// A parenthesised group.
    pub fn clause() -> Self {
        Self {
            conditions: Vec::new(),
            connective: None,
            comma_separated: false,
            grouping: true,
            use_parenthesis: true,
            mixed: false,
        }
    }

    /// A parenthesised group seeded with one condition.
    pub fn clause_with(condition: impl Into<Condition>) -> Self {
        Self::clause().and(condition)
    }

    /// A group rendered without wrapping parentheses.
    pub fn non_grouping_clause() -> Self {
        Self {
            grouping: false,
            ..Self::clause()
        }
    }

    /// Join members with `, ` instead of AND/OR.
    pub fn set_all_comma_separated(mut self, comma_separated: bool) -> Self {
        self.comma_separated = comma_separated;
        self
    }

    /// Toggle parentheses for call sites that add their own.
    pub fn set_use_parenthesis(mut self, use_parenthesis: bool) -> Self {
        self.use_parenthesis = use_parenthesis;
        self
    }

    fn push(mut self, connective: Connective, condition: Condition) -> Self {
        if !self.conditions.is_empty() && !self.comma_separated {
            match self.connective {
                None => self.connective = Some(connective),
                Some(existing) if existing != connective => self.mixed = true,
                Some(_) => {}
            }
        }
        self.conditions.push(condition);
        self
    }

    pub fn and(self, condition: impl Into<Condition>) -> Self {
        self.push(Connective::And, condition.into())
    }

    pub fn or(self, condition: impl Into<Condition>) -> Self {
        self.push(Connective::Or, condition.into())
    }

    pub fn and_all<C: Into<Condition>>(self, conditions: impl IntoIterator<Item = C>) -> Self {
        conditions.into_iter().fold(self, |group, c| group.and(c))
    }

    pub fn or_all<C: Into<Condition>>(self, conditions: impl IntoIterator<Item = C>) -> Self {
        conditions.into_iter().fold(self, |group, c| group.or(c))
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// The connective in effect; AND until an OR fixed it.
    pub fn connective(&self) -> Connective {
        self.connective.unwrap_or(Connective::And)
    }

    pub fn query(&self) -> String {
        let separator = if self.comma_separated {
            ", "
        } else {
            self.connective().separator()
        };
        let body = self
            .conditions
            .iter()
            .map(Condition::query)
            .filter(|part| !part.is_empty())
            .collect::<Vec<_>>()
            .join(separator);
        if self.grouping && self.use_parenthesis && !body.is_empty() {
            format!("({body})")
        } else {
            body
        }
    }

    /// Report builder misuse anywhere in this group.
    pub fn validate(&self) -> FlowResult<()> {
        if self.mixed {
            return Err(FlowError::MixedConnectives);
        }
        self.conditions.iter().try_for_each(Condition::validate)
    }

    /// Tables read by sub-statements in this group.
    pub(crate) fn sub_tables(&self) -> Vec<Table> {
        let mut tables = Vec::new();
        for condition in &self.conditions {
            match condition {
                Condition::Operator(op) => tables.extend(op.sub_tables().iter().cloned()),
                Condition::Group(group) => tables.extend(group.sub_tables()),
                Condition::Exists(exists) => tables.extend(exists.tables().iter().cloned()),
                Condition::Raw(_) => {}
            }
        }
        tables
    }
}

/// `[NOT ]EXISTS (<sub-select>)`
#[derive(Debug, Clone, PartialEq)]
pub struct ExistenceOperator {
    sub_query: SubQuery,
    negated: bool,
}

impl ExistenceOperator {
    pub(crate) fn new(sub_query: SubQuery, negated: bool) -> Self {
        Self { sub_query, negated }
    }

    /// Tables the sub-select reads.
    pub fn tables(&self) -> &[Table] {
        self.sub_query.tables()
    }

    pub fn query(&self) -> String {
        let not = if self.negated { "NOT " } else { "" };
        format!("{not}EXISTS ({})", self.sub_query.sql().trim())
    }

    /// Construction errors from the sub-select.
    pub fn validate(&self) -> FlowResult<()> {
        self.sub_query.validate()
    }
}

/// Any predicate accepted by WHERE, HAVING, SET, ON and WHEN clauses.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    Operator(Operator),
    Group(OperatorGroup),
    Exists(ExistenceOperator),
    /// Trusted SQL text, rendered verbatim.
    Raw(String),
}

impl Condition {
    /// A trusted predicate rendered verbatim.
    pub fn raw(sql: impl Into<String>) -> Self {
        Condition::Raw(sql.into())
    }

    /// A trusted predicate with `?` placeholders replaced, in order, by literal arguments.
    /// Placeholders without a matching argument are kept.
    pub fn raw_with_args<V: Into<SqlValue>>(
        sql: &str,
        args: impl IntoIterator<Item = V>,
    ) -> Self {
        let mut args = args.into_iter().map(Into::into);
        let mut out = String::with_capacity(sql.len());
        for ch in sql.chars() {
            match ch {
                '?' => match args.next() {
                    Some(arg) => out.push_str(&arg.to_literal()),
                    None => out.push('?'),
                },
                other => out.push(other),
            }
        }
        Condition::Raw(out)
    }

    pub fn query(&self) -> String {
        match self {
            Condition::Operator(op) => op.query(),
            Condition::Group(group) => group.query(),
            Condition::Exists(exists) => exists.query(),
            Condition::Raw(sql) => sql.clone(),
        }
    }

    pub fn validate(&self) -> FlowResult<()> {
        match self {
            Condition::Operator(op) => op.validate(),
            Condition::Group(group) => group.validate(),
            Condition::Exists(exists) => exists.validate(),
            Condition::Raw(_) => Ok(()),
        }
    }
}

impl From<Operator> for Condition {
    fn from(op: Operator) -> Self {
        Condition::Operator(op)
    }
}

impl From<OperatorGroup> for Condition {
    fn from(group: OperatorGroup) -> Self {
        Condition::Group(group)
    }
}

impl From<ExistenceOperator> for Condition {
    fn from(exists: ExistenceOperator) -> Self {
        Condition::Exists(exists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(name: &str) -> NameAlias {
        NameAlias::raw(name)
    }

    #[test]
    fn renders_without_spaces_for_symbols() {
        let op = Operator::new(raw("name"), Operation::Equals, "n");
        assert_eq!(op.query(), "name='n'");
    }

    #[test]
    fn null_switches_to_is() {
        let op = Operator::new(raw("name"), Operation::Equals, SqlValue::Null);
        assert_eq!(op.query(), "name IS NULL");
        let op = Operator::new(raw("name"), Operation::NotEquals, SqlValue::Null);
        assert_eq!(op.query(), "name IS NOT NULL");
        assert_eq!(op.operation(), Operation::IsNot);
    }

    #[test]
    fn list_and_range_operands() {
        let op = Operator::with_operand(
            raw("id"),
            Operation::In,
            Operand::List(vec![1.into(), 2.into(), 3.into()]),
        );
        assert_eq!(op.query(), "id IN (1,2,3)");
        let op = Operator::with_operand(
            raw("id"),
            Operation::Between,
            Operand::Range(1.into(), 5.into()),
        );
        assert_eq!(op.query(), "id BETWEEN 1 AND 5");
    }

    #[test]
    fn collate_suffix() {
        let op = Operator::new(raw("name"), Operation::Equals, "A").collate(Collate::NoCase);
        assert_eq!(op.query(), "name='A' COLLATE NOCASE");
    }

    #[test]
    fn comma_separated_clause() {
        let group = OperatorGroup::clause().set_all_comma_separated(true).and_all([
            Operator::new(raw("name"), Operation::Equals, "n"),
            Operator::new(raw("id"), Operation::Equals, 0),
        ]);
        assert_eq!(group.query(), "(name='n', id=0)");
    }

    #[test]
    fn non_grouping_single_predicate() {
        let group = OperatorGroup::non_grouping_clause()
            .set_use_parenthesis(false)
            .and(Operator::new(raw("name"), Operation::Equals, "n"));
        assert_eq!(group.query(), "name='n'");
    }

    #[test]
    fn or_group_and_nesting() {
        let inner = OperatorGroup::clause()
            .or(Operator::new(raw("a"), Operation::Equals, 1))
            .or(Operator::new(raw("b"), Operation::Equals, 2));
        let outer = OperatorGroup::non_grouping_clause()
            .and(Operator::new(raw("c"), Operation::Equals, 3))
            .and(inner);
        assert_eq!(outer.query(), "c=3 AND (a=1 OR b=2)");
        assert!(outer.validate().is_ok());
    }

    #[test]
    fn mixed_connectives_are_rejected() {
        let group = OperatorGroup::clause()
            .and(Operator::new(raw("a"), Operation::Equals, 1))
            .and(Operator::new(raw("b"), Operation::Equals, 2))
            .or(Operator::new(raw("c"), Operation::Equals, 3));
        assert!(matches!(group.validate(), Err(FlowError::MixedConnectives)));

        let nested = OperatorGroup::clause().and(group);
        assert!(nested.validate().is_err());
    }

    #[test]
    fn empty_group_renders_nothing() {
        assert_eq!(OperatorGroup::clause().query(), "");
    }

    #[test]
    fn raw_with_args_substitutes_literals() {
        let cond = Condition::raw_with_args("a = ? AND b = ? AND c = ?", ["x", "it's"]);
        assert_eq!(cond.query(), "a = 'x' AND b = 'it''s' AND c = ?");
    }

    #[test]
    fn exists_operator() {
        let t = Table::new("t");
        let exists = ExistenceOperator::new(SubQuery::capture(&crate::select().from(&t)), true);
        assert_eq!(exists.query(), "NOT EXISTS (SELECT * FROM `t`)");
        assert_eq!(exists.tables(), &[t]);
        assert!(exists.validate().is_ok());
    }

    #[test]
    fn sub_select_errors_surface_through_the_group() {
        let t = Table::new("t");
        let eq = |column: &str, value: i64| Operator::new(raw(column), Operation::Equals, value);
        let broken = crate::select()
            .from(&t)
            .where_(eq("a", 1))
            .and(eq("b", 2))
            .or(eq("c", 3));
        let op = Operator::with_operand(
            raw("id"),
            Operation::In,
            Operand::Query(SubQuery::capture(&broken)),
        );
        assert!(matches!(op.validate(), Err(FlowError::MixedConnectives)));

        let exists = ExistenceOperator::new(SubQuery::capture(&broken), false);
        let group = OperatorGroup::clause().and(exists);
        assert!(matches!(group.validate(), Err(FlowError::MixedConnectives)));
        assert!(matches!(group.clone().validate(), Err(FlowError::MixedConnectives)));
    }
}
