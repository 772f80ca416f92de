//! Typed column handles.
//!
//! A [`Property<T>`] names one column (or expression) and knows the Rust type of the values it
//! compares against, so `age.eq("x")` on a `Property<i64>` does not compile. Every method returns
//! a new value; properties are never mutated after construction.

use crate::name_alias::NameAlias;
use crate::operator::{Collate, Operand, Operation, Operator};
use crate::order_by::OrderBy;
use crate::query::{Query, SubQuery};
use crate::table::Table;
use crate::value::SqlValue;
use std::fmt;
use std::marker::PhantomData;

/// A typed column reference.
pub struct Property<T> {
    name: NameAlias,
    table: Option<String>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Property<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            table: self.table.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Property")
            .field("name", &self.name)
            .field("table", &self.table)
            .finish()
    }
}

impl<T> PartialEq for Property<T> {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.table == other.table
    }
}

impl<T> Property<T> {
    /// A column owned by `table`. The rendered name is unqualified until [`Property::with_table`].
    pub fn new(table: &Table, column: &str) -> Self {
        Self {
            name: NameAlias::of(column),
            table: Some(table.name().to_string()),
            _marker: PhantomData,
        }
    }

    /// Wrap an existing name.
    pub fn from_name_alias(name: NameAlias) -> Self {
        Self {
            name,
            table: None,
            _marker: PhantomData,
        }
    }

    /// An expression rendered verbatim.
    pub fn raw(expression: impl Into<String>) -> Self {
        Self::from_name_alias(NameAlias::raw(expression))
    }

    fn derive(&self, name: NameAlias) -> Self {
        Self {
            name,
            table: self.table.clone(),
            _marker: PhantomData,
        }
    }

    pub fn name_alias(&self) -> &NameAlias {
        &self.name
    }

    /// Name of the owning table, if known.
    pub fn owner_table(&self) -> Option<&str> {
        self.table.as_deref()
    }

    /// The column as rendered inside predicates.
    pub fn query(&self) -> String {
        self.name.query()
    }

    /// The column as rendered in a select list, with its alias.
    pub fn full_query(&self) -> String {
        self.name.full_query()
    }

    pub fn alias(&self, alias: impl Into<String>) -> Self {
        self.derive(self.name.with_alias(alias))
    }

    /// Qualify with the owning table. Unchanged when the owner is unknown.
    pub fn with_table(&self) -> Self {
        match &self.table {
            Some(table) => self.derive(self.name.with_table(table.clone())),
            None => self.clone(),
        }
    }

    /// Qualify with an explicit table name or alias.
    pub fn with_table_named(&self, table: impl Into<String>) -> Self {
        self.derive(self.name.with_table(table))
    }

    pub fn distinct(&self) -> Self {
        self.derive(self.name.distinct())
    }

    /// Reinterpret the value type, e.g. after a CAST.
    pub fn cast_type<U>(&self) -> Property<U> {
        Property {
            name: self.name.clone(),
            table: self.table.clone(),
            _marker: PhantomData,
        }
    }

    fn operator(&self, operation: Operation, operand: Operand) -> Operator {
        Operator::with_operand(self.name.clone(), operation, operand)
    }

    pub fn is_null(&self) -> Operator {
        self.operator(Operation::Is, Operand::Value(SqlValue::Null))
    }

    pub fn is_not_null(&self) -> Operator {
        self.operator(Operation::IsNot, Operand::Value(SqlValue::Null))
    }

    pub fn like(&self, pattern: impl Into<String>) -> Operator {
        self.operator(Operation::Like, Operand::Value(SqlValue::Text(pattern.into())))
    }

    pub fn not_like(&self, pattern: impl Into<String>) -> Operator {
        self.operator(
            Operation::NotLike,
            Operand::Value(SqlValue::Text(pattern.into())),
        )
    }

    pub fn glob(&self, pattern: impl Into<String>) -> Operator {
        self.operator(Operation::Glob, Operand::Value(SqlValue::Text(pattern.into())))
    }

    pub fn not_glob(&self, pattern: impl Into<String>) -> Operator {
        self.operator(
            Operation::NotGlob,
            Operand::Value(SqlValue::Text(pattern.into())),
        )
    }

    pub fn eq_property(&self, other: &Property<T>) -> Operator {
        self.operator(Operation::Equals, Operand::Column(other.name.clone()))
    }

    pub fn not_eq_property(&self, other: &Property<T>) -> Operator {
        self.operator(Operation::NotEquals, Operand::Column(other.name.clone()))
    }

    pub fn gt_property(&self, other: &Property<T>) -> Operator {
        self.operator(Operation::GreaterThan, Operand::Column(other.name.clone()))
    }

    pub fn gte_property(&self, other: &Property<T>) -> Operator {
        self.operator(
            Operation::GreaterThanOrEquals,
            Operand::Column(other.name.clone()),
        )
    }

    pub fn lt_property(&self, other: &Property<T>) -> Operator {
        self.operator(Operation::LessThan, Operand::Column(other.name.clone()))
    }

    pub fn lte_property(&self, other: &Property<T>) -> Operator {
        self.operator(
            Operation::LessThanOrEquals,
            Operand::Column(other.name.clone()),
        )
    }

    /// `column IN (<sub-select>)`
    pub fn in_query(&self, query: &impl Query) -> Operator {
        self.operator(Operation::In, Operand::Query(SubQuery::capture(query)))
    }

    /// `column NOT IN (<sub-select>)`
    pub fn not_in_query(&self, query: &impl Query) -> Operator {
        self.operator(Operation::NotIn, Operand::Query(SubQuery::capture(query)))
    }

    /// `column=(<sub-select>)`
    pub fn eq_query(&self, query: &impl Query) -> Operator {
        self.operator(Operation::Equals, Operand::Query(SubQuery::capture(query)))
    }

    fn arithmetic<U>(&self, operation: &str, other: &Property<U>) -> Self {
        self.derive(NameAlias::join_names(
            operation,
            &self.name.full_name(),
            &other.name.full_name(),
        ))
    }

    pub fn plus<U>(&self, other: &Property<U>) -> Self {
        self.arithmetic("+", other)
    }

    pub fn minus<U>(&self, other: &Property<U>) -> Self {
        self.arithmetic("-", other)
    }

    pub fn times<U>(&self, other: &Property<U>) -> Self {
        self.arithmetic("*", other)
    }

    pub fn div<U>(&self, other: &Property<U>) -> Self {
        self.arithmetic("/", other)
    }

    pub fn rem<U>(&self, other: &Property<U>) -> Self {
        self.arithmetic("%", other)
    }

    /// `<left> || <right>`
    pub fn concat<U>(&self, other: &Property<U>) -> Property<String> {
        self.arithmetic("||", other).cast_type()
    }

    pub fn asc(&self) -> OrderBy {
        OrderBy::from_name_alias(self.name.clone()).ascending()
    }

    pub fn desc(&self) -> OrderBy {
        OrderBy::from_name_alias(self.name.clone()).descending()
    }

    /// ORDER BY term with a collation; direction defaults to ascending.
    pub fn collate(&self, collation: Collate) -> OrderBy {
        self.asc().collate(collation)
    }
}

impl<T: Into<SqlValue>> Property<T> {
    fn value_operator(&self, operation: Operation, value: impl Into<T>) -> Operator {
        let value: T = value.into();
        self.operator(operation, Operand::Value(value.into()))
    }

    pub fn eq(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::Equals, value)
    }

    pub fn not_eq(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::NotEquals, value)
    }

    pub fn is(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::Is, value)
    }

    pub fn is_not(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::IsNot, value)
    }

    /// `=` for a present value, `IS NULL` for `None`.
    pub fn eq_nullable(&self, value: Option<T>) -> Operator {
        match value {
            Some(v) => self.eq(v),
            None => self.is_null(),
        }
    }

    /// `!=` for a present value, `IS NOT NULL` for `None`.
    pub fn not_eq_nullable(&self, value: Option<T>) -> Operator {
        match value {
            Some(v) => self.not_eq(v),
            None => self.is_not_null(),
        }
    }

    pub fn gt(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::GreaterThan, value)
    }

    pub fn gte(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::GreaterThanOrEquals, value)
    }

    pub fn lt(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::LessThan, value)
    }

    pub fn lte(&self, value: impl Into<T>) -> Operator {
        self.value_operator(Operation::LessThanOrEquals, value)
    }

    /// `column BETWEEN from AND to`
    pub fn between(&self, from: impl Into<T>, to: impl Into<T>) -> Operator {
        let (from, to): (T, T) = (from.into(), to.into());
        self.operator(Operation::Between, Operand::Range(from.into(), to.into()))
    }

    pub fn in_list<V: Into<T>>(&self, values: impl IntoIterator<Item = V>) -> Operator {
        self.operator(Operation::In, Operand::List(Self::literals(values)))
    }

    pub fn not_in<V: Into<T>>(&self, values: impl IntoIterator<Item = V>) -> Operator {
        self.operator(Operation::NotIn, Operand::List(Self::literals(values)))
    }

    fn literals<V: Into<T>>(values: impl IntoIterator<Item = V>) -> Vec<SqlValue> {
        values
            .into_iter()
            .map(|v| {
                let v: T = v.into();
                Into::<SqlValue>::into(v)
            })
            .collect()
    }

    /// `column=column || <value>`, for SET clauses appending to text.
    pub fn concatenate(&self, value: impl Into<T>) -> Operator {
        let value: T = value.into();
        let rhs = NameAlias::join_names(
            "||",
            &self.name.full_name(),
            &Into::<SqlValue>::into(value).to_literal(),
        );
        self.operator(Operation::Equals, Operand::Column(rhs))
    }

    /// `<column> + <value>` as a new expression.
    pub fn plus_value(&self, value: impl Into<T>) -> Self {
        self.value_arithmetic("+", value)
    }

    /// `<column> - <value>` as a new expression.
    pub fn minus_value(&self, value: impl Into<T>) -> Self {
        self.value_arithmetic("-", value)
    }

    fn value_arithmetic(&self, operation: &str, value: impl Into<T>) -> Self {
        let value: T = value.into();
        self.derive(NameAlias::join_names(
            operation,
            &self.name.full_name(),
            &Into::<SqlValue>::into(value).to_literal(),
        ))
    }
}

/// Anything usable as a select-list column or GROUP BY term.
pub trait AsColumn {
    fn column_name(&self) -> NameAlias;
}

impl<T> AsColumn for Property<T> {
    fn column_name(&self) -> NameAlias {
        self.name.clone()
    }
}

impl AsColumn for NameAlias {
    fn column_name(&self) -> NameAlias {
        self.clone()
    }
}

impl AsColumn for str {
    fn column_name(&self) -> NameAlias {
        NameAlias::of(self)
    }
}

impl<C: AsColumn + ?Sized> AsColumn for &C {
    fn column_name(&self) -> NameAlias {
        (**self).column_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Table {
        Table::new("users").with_columns(&["id", "name", "age", "nickname"])
    }

    fn id() -> Property<i64> {
        Property::new(&users(), "id")
    }

    fn name() -> Property<String> {
        Property::new(&users(), "name")
    }

    #[test]
    fn comparisons() {
        assert_eq!(id().eq(5).query(), "`id`=5");
        assert_eq!(id().not_eq(5).query(), "`id`!=5");
        assert_eq!(id().gte(1).query(), "`id`>=1");
        assert_eq!(name().like("a%").query(), "`name` LIKE 'a%'");
        assert_eq!(name().not_glob("a*").query(), "`name` NOT GLOB 'a*'");
    }

    #[test]
    fn nullable_comparisons() {
        let nick: Property<Option<String>> = Property::new(&users(), "nickname");
        assert_eq!(nick.eq(None::<String>).query(), "`nickname` IS NULL");
        assert_eq!(nick.not_eq(None::<String>).query(), "`nickname` IS NOT NULL");
        assert_eq!(name().eq_nullable(None).query(), "`name` IS NULL");
        assert_eq!(
            name().not_eq_nullable(Some("x".into())).query(),
            "`name`!='x'"
        );
    }

    #[test]
    fn lists_and_ranges() {
        assert_eq!(id().in_list([1, 2, 3]).query(), "`id` IN (1,2,3)");
        assert_eq!(id().not_in(vec![4]).query(), "`id` NOT IN (4)");
        assert_eq!(id().between(1, 9).query(), "`id` BETWEEN 1 AND 9");
    }

    #[test]
    fn qualification_returns_new_property() {
        let qualified = id().with_table();
        assert_eq!(qualified.query(), "`users`.`id`");
        assert_eq!(id().query(), "`id`");
        assert_eq!(id().with_table_named("u").query(), "`u`.`id`");
        assert_eq!(id().alias("uid").full_query(), "`id` AS `uid`");
        assert_eq!(name().distinct().query(), "DISTINCT `name`");
    }

    #[test]
    fn arithmetic_expressions() {
        let age: Property<i64> = Property::new(&users(), "age");
        assert_eq!(age.plus(&id()).query(), "`age` + `id`");
        assert_eq!(age.rem(&id()).query(), "`age` % `id`");
        assert_eq!(name().concat(&age).query(), "`name` || `age`");
        assert_eq!(
            age.eq_property(&age.plus_value(1)).query(),
            "`age`=`age` + 1"
        );
    }

    #[test]
    fn concatenate_for_set_clauses() {
        assert_eq!(name().concatenate("!").query(), "`name`=`name` || '!'");
    }

    #[test]
    fn column_comparisons() {
        let age: Property<i64> = Property::new(&users(), "age");
        assert_eq!(age.gt_property(&id()).query(), "`age`>`id`");
    }

    #[test]
    fn order_terms() {
        assert_eq!(name().asc().query(), "`name` ASC");
        assert_eq!(name().desc().query(), "`name` DESC");
        assert_eq!(
            name().collate(Collate::NoCase).query(),
            "`name` COLLATE NOCASE ASC"
        );
    }
}
