//! The staged WHERE / GROUP BY / HAVING / ORDER BY / LIMIT / OFFSET builder.
//!
//! [`Where<B, S>`] wraps a base statement `B` ([`SelectFrom`], [`UpdateSet`] or [`DeleteFrom`])
//! and tracks the clause reached so far in the stage marker `S`. Methods only exist on stages
//! where the clause is still grammatical, so `limit(1).group_by(..)` or `order_by(..).and(..)`
//! do not compile.
//!
//! Every method borrows the builder and returns a new one, so any intermediate value can be
//! reused as the start of several statements.

use crate::error::{FlowError, FlowResult};
use crate::log::QueryKind;
use crate::name_alias::NameAlias;
use crate::notify::ChangeAction;
use crate::operator::{Condition, ExistenceOperator, OperatorGroup};
use crate::order_by::OrderBy;
use crate::property::AsColumn;
use crate::query::{Mutation, Queriable, Query, SubQuery};
use crate::statement::delete::DeleteFrom;
use crate::statement::from::SelectFrom;
use crate::statement::update::UpdateSet;
use crate::table::Table;
use std::fmt;
use std::marker::PhantomData;

/// Stage markers and the transitions between them.
pub mod stage {
    /// Predicates may still be added.
    #[derive(Debug)]
    pub struct Start;
    /// After GROUP BY.
    #[derive(Debug)]
    pub struct Grouped;
    /// After HAVING.
    #[derive(Debug)]
    pub struct Having;
    /// After ORDER BY.
    #[derive(Debug)]
    pub struct Ordered;
    /// After LIMIT.
    #[derive(Debug)]
    pub struct Limited;
    /// After OFFSET.
    #[derive(Debug)]
    pub struct Offset;
    /// After both LIMIT and OFFSET.
    #[derive(Debug)]
    pub struct Constrained;

    /// Stages accepting GROUP BY.
    pub trait GroupByStage {}
    impl GroupByStage for Start {}
    impl GroupByStage for Grouped {}

    /// Stages accepting HAVING.
    pub trait HavingStage {}
    impl HavingStage for Start {}
    impl HavingStage for Grouped {}

    /// Stages accepting ORDER BY.
    pub trait OrderByStage {}
    impl OrderByStage for Start {}
    impl OrderByStage for Grouped {}
    impl OrderByStage for Having {}
    impl OrderByStage for Ordered {}

    /// Stages accepting LIMIT, and the stage reached.
    pub trait LimitStage {
        type Next;
    }
    impl LimitStage for Start {
        type Next = Limited;
    }
    impl LimitStage for Grouped {
        type Next = Limited;
    }
    impl LimitStage for Having {
        type Next = Limited;
    }
    impl LimitStage for Ordered {
        type Next = Limited;
    }
    impl LimitStage for Offset {
        type Next = Constrained;
    }

    /// Stages accepting OFFSET, and the stage reached.
    pub trait OffsetStage {
        type Next;
    }
    impl OffsetStage for Start {
        type Next = Offset;
    }
    impl OffsetStage for Grouped {
        type Next = Offset;
    }
    impl OffsetStage for Having {
        type Next = Offset;
    }
    impl OffsetStage for Ordered {
        type Next = Offset;
    }
    impl OffsetStage for Limited {
        type Next = Constrained;
    }

    /// Stages accepting LIMIT and OFFSET together.
    pub trait ConstrainStage {}
    impl ConstrainStage for Start {}
    impl ConstrainStage for Grouped {}
    impl ConstrainStage for Having {}
    impl ConstrainStage for Ordered {}
}

use stage::{
    ConstrainStage, Constrained, GroupByStage, Grouped, HavingStage, LimitStage, OffsetStage,
    OrderByStage, Ordered, Start,
};

/// A base statement with its trailing clauses.
pub struct Where<B, S = Start> {
    base: B,
    conditions: OperatorGroup,
    group_by: Vec<NameAlias>,
    having: OperatorGroup,
    order_by: Vec<OrderBy>,
    limit: Option<i64>,
    offset: Option<i64>,
    exists: Option<ExistenceOperator>,
    _stage: PhantomData<fn() -> S>,
}

impl<B: Clone, S> Clone for Where<B, S> {
    fn clone(&self) -> Self {
        self.restage()
    }
}

impl<B: fmt::Debug, S> fmt::Debug for Where<B, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Where")
            .field("base", &self.base)
            .field("conditions", &self.conditions)
            .field("group_by", &self.group_by)
            .field("having", &self.having)
            .field("order_by", &self.order_by)
            .field("limit", &self.limit)
            .field("offset", &self.offset)
            .field("exists", &self.exists)
            .finish()
    }
}

impl<B: Clone, S> Where<B, S> {
    fn restage<T>(&self) -> Where<B, T> {
        Where {
            base: self.base.clone(),
            conditions: self.conditions.clone(),
            group_by: self.group_by.clone(),
            having: self.having.clone(),
            order_by: self.order_by.clone(),
            limit: self.limit,
            offset: self.offset,
            exists: self.exists.clone(),
            _stage: PhantomData,
        }
    }

    pub fn base(&self) -> &B {
        &self.base
    }

    pub fn conditions(&self) -> &OperatorGroup {
        &self.conditions
    }

    pub fn limit_value(&self) -> Option<i64> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<i64> {
        self.offset
    }
}

impl<B: Clone> Where<B, Start> {
    pub(crate) fn new(base: B) -> Self {
        Self {
            base,
            conditions: OperatorGroup::non_grouping_clause(),
            group_by: Vec::new(),
            having: OperatorGroup::non_grouping_clause(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
            exists: None,
            _stage: PhantomData,
        }
    }

    fn map_conditions(&self, f: impl FnOnce(OperatorGroup) -> OperatorGroup) -> Self {
        let mut next = self.restage();
        next.conditions = f(next.conditions);
        next
    }

    /// Append a predicate joined with AND.
    pub fn and(&self, condition: impl Into<Condition>) -> Self {
        self.map_conditions(|group| group.and(condition))
    }

    /// Append a predicate joined with OR.
    pub fn or(&self, condition: impl Into<Condition>) -> Self {
        self.map_conditions(|group| group.or(condition))
    }

    pub fn and_all<C: Into<Condition>>(&self, conditions: impl IntoIterator<Item = C>) -> Self {
        self.map_conditions(|group| group.and_all(conditions))
    }

    pub fn or_all<C: Into<Condition>>(&self, conditions: impl IntoIterator<Item = C>) -> Self {
        self.map_conditions(|group| group.or_all(conditions))
    }

    /// `WHERE EXISTS (<query>)`
    pub fn where_exists(&self, query: &impl Query) -> Self {
        self.with_exists(query, false)
    }

    /// `WHERE NOT EXISTS (<query>)`
    pub fn where_not_exists(&self, query: &impl Query) -> Self {
        self.with_exists(query, true)
    }

    fn with_exists(&self, query: &impl Query, negated: bool) -> Self {
        let mut next = self.restage();
        next.exists = Some(ExistenceOperator::new(SubQuery::capture(query), negated));
        next
    }
}

impl<B: Clone, S: GroupByStage> Where<B, S> {
    /// Append GROUP BY terms.
    pub fn group_by(&self, columns: &[&dyn AsColumn]) -> Where<B, Grouped> {
        let mut next = self.restage();
        next.group_by
            .extend(columns.iter().map(|column| column.column_name()));
        next
    }
}

impl<B: Clone, S: HavingStage> Where<B, S> {
    pub fn having(&self, condition: impl Into<Condition>) -> Where<B, stage::Having> {
        let mut next = self.restage();
        next.having = next.having.and(condition);
        next
    }

    /// HAVING with several predicates joined by AND.
    pub fn having_all<C: Into<Condition>>(
        &self,
        conditions: impl IntoIterator<Item = C>,
    ) -> Where<B, stage::Having> {
        let mut next = self.restage();
        next.having = next.having.and_all(conditions);
        next
    }
}

impl<B: Clone, S: OrderByStage> Where<B, S> {
    /// Append an ORDER BY term.
    pub fn order_by(&self, term: impl Into<OrderBy>) -> Where<B, Ordered> {
        let mut next = self.restage();
        next.order_by.push(term.into());
        next
    }

    pub fn order_by_all(&self, terms: impl IntoIterator<Item = OrderBy>) -> Where<B, Ordered> {
        let mut next = self.restage();
        next.order_by.extend(terms);
        next
    }
}

impl<B: Clone, S: LimitStage> Where<B, S> {
    pub fn limit(&self, limit: i64) -> Where<B, S::Next> {
        let mut next = self.restage();
        next.limit = Some(limit);
        next
    }
}

impl<B: Clone, S: OffsetStage> Where<B, S> {
    pub fn offset(&self, offset: i64) -> Where<B, S::Next> {
        let mut next = self.restage();
        next.offset = Some(offset);
        next
    }
}

impl<B: Clone, S: ConstrainStage> Where<B, S> {
    /// `LIMIT <limit> OFFSET <offset>` in one step.
    pub fn constrain(&self, offset: i64, limit: i64) -> Where<B, Constrained> {
        let mut next = self.restage();
        next.offset = Some(offset);
        next.limit = Some(limit);
        next
    }
}

impl<B: Query + Clone, S> Query for Where<B, S> {
    fn query(&self) -> String {
        let mut sql = self.base.query();

        if let Some(exists) = &self.exists {
            sql.push_str(" WHERE ");
            sql.push_str(&exists.query());
        } else {
            let predicates = self.conditions.query();
            if !predicates.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&predicates);
            }
        }

        if !self.group_by.is_empty() {
            let terms: Vec<String> = self.group_by.iter().map(NameAlias::query).collect();
            sql.push_str(" GROUP BY ");
            sql.push_str(&terms.join(", "));
        }

        let having = self.having.query();
        if !having.is_empty() {
            sql.push_str(" HAVING ");
            sql.push_str(&having);
        }

        if !self.order_by.is_empty() {
            let terms: Vec<String> = self.order_by.iter().map(OrderBy::query).collect();
            sql.push_str(" ORDER BY ");
            sql.push_str(&terms.join(", "));
        }

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        match (self.limit, self.offset) {
            (Some(limit), _) => sql.push_str(&format!(" LIMIT {limit}")),
            (None, Some(_)) => sql.push_str(" LIMIT -1"),
            (None, None) => {}
        }
        if let Some(offset) = self.offset {
            sql.push_str(&format!(" OFFSET {offset}"));
        }

        sql
    }

    fn kind(&self) -> QueryKind {
        self.base.kind()
    }

    fn validate(&self) -> FlowResult<()> {
        self.base.validate()?;
        if self.exists.is_some() && !self.conditions.is_empty() {
            return Err(FlowError::ExistsWithPredicates);
        }
        if let Some(exists) = &self.exists {
            exists.validate()?;
        }
        self.conditions.validate()?;
        self.having.validate()
    }

    fn primary_table(&self) -> Option<Table> {
        self.base.primary_table()
    }

    fn associated_tables(&self) -> Vec<Table> {
        let mut tables = self.base.associated_tables();
        if let Some(exists) = &self.exists {
            tables.extend(exists.tables().iter().cloned());
        }
        tables.extend(self.conditions.sub_tables());
        let mut unique: Vec<Table> = Vec::with_capacity(tables.len());
        for table in tables {
            if !unique.contains(&table) {
                unique.push(table);
            }
        }
        unique
    }
}

impl<S> Queriable for Where<SelectFrom, S> {}

impl<B: Mutation + Clone, S> Mutation for Where<B, S> {
    fn target_table(&self) -> Table {
        self.base.target_table()
    }

    fn change_action(&self) -> ChangeAction {
        self.base.change_action()
    }
}

/// Generate the clause starters on a base statement, each returning a [`Where`].
macro_rules! impl_where_starters {
    ($base:ty) => {
        impl $base {
            /// `WHERE <condition>`
            pub fn where_(&self, condition: impl Into<Condition>) -> Where<$base> {
                Where::new(self.clone()).and(condition)
            }

            /// `WHERE <c1> AND <c2> …`
            pub fn where_all<C: Into<Condition>>(
                &self,
                conditions: impl IntoIterator<Item = C>,
            ) -> Where<$base> {
                Where::new(self.clone()).and_all(conditions)
            }

            /// `WHERE EXISTS (<query>)`
            pub fn where_exists(&self, query: &impl Query) -> Where<$base> {
                Where::new(self.clone()).where_exists(query)
            }

            /// `WHERE NOT EXISTS (<query>)`
            pub fn where_not_exists(&self, query: &impl Query) -> Where<$base> {
                Where::new(self.clone()).where_not_exists(query)
            }

            pub fn group_by(&self, columns: &[&dyn AsColumn]) -> Where<$base, Grouped> {
                Where::new(self.clone()).group_by(columns)
            }

            pub fn having(&self, condition: impl Into<Condition>) -> Where<$base, stage::Having> {
                Where::new(self.clone()).having(condition)
            }

            pub fn order_by(&self, term: impl Into<OrderBy>) -> Where<$base, Ordered> {
                Where::new(self.clone()).order_by(term)
            }

            pub fn limit(&self, limit: i64) -> Where<$base, stage::Limited> {
                Where::new(self.clone()).limit(limit)
            }

            pub fn offset(&self, offset: i64) -> Where<$base, stage::Offset> {
                Where::new(self.clone()).offset(offset)
            }

            pub fn constrain(&self, offset: i64, limit: i64) -> Where<$base, Constrained> {
                Where::new(self.clone()).constrain(offset, limit)
            }
        }
    };
}

impl_where_starters!(SelectFrom);
impl_where_starters!(UpdateSet);
impl_where_starters!(DeleteFrom);
