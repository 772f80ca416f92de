//! `UPDATE [OR <conflict>] <table> SET …`

use crate::error::{FlowError, FlowResult};
use crate::log::QueryKind;
use crate::notify::ChangeAction;
use crate::operator::{Condition, OperatorGroup};
use crate::query::{Mutation, Query};
use crate::table::{Adapter, ConflictAction, Table};

/// The `UPDATE <table>` head, before SET.
#[derive(Debug, Clone, PartialEq)]
pub struct Update {
    table: Table,
    conflict: ConflictAction,
}

impl Update {
    /// Update `adapter`'s table with its default update conflict action.
    pub fn new(adapter: &impl Adapter) -> Self {
        let table = adapter.table();
        Self {
            conflict: table.update_conflict_action(),
            table,
        }
    }

    /// Set the conflict resolution.
    pub fn or(&self, conflict: ConflictAction) -> Self {
        Self {
            conflict,
            ..self.clone()
        }
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

    pub fn or_replace(&self) -> Self {
        self.or(ConflictAction::Replace)
    }

    pub fn conflict_action(&self) -> ConflictAction {
        self.conflict
    }

    /// `SET <assignment>`
    pub fn set(&self, assignment: impl Into<Condition>) -> UpdateSet {
        UpdateSet {
            update: self.clone(),
            assignments: assignments().and(assignment),
        }
    }

    /// `SET <a1>, <a2>, …`
    pub fn set_all<C: Into<Condition>>(
        &self,
        assignments_list: impl IntoIterator<Item = C>,
    ) -> UpdateSet {
        UpdateSet {
            update: self.clone(),
            assignments: assignments().and_all(assignments_list),
        }
    }

    fn query(&self) -> String {
        format!(
            "UPDATE {}{}",
            self.conflict.or_clause(),
            self.table.quoted_name()
        )
    }
}

fn assignments() -> OperatorGroup {
    OperatorGroup::non_grouping_clause().set_all_comma_separated(true)
}

/// An UPDATE with its SET assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateSet {
    update: Update,
    assignments: OperatorGroup,
}

impl UpdateSet {
    /// Append an assignment.
    pub fn set(&self, assignment: impl Into<Condition>) -> Self {
        Self {
            update: self.update.clone(),
            assignments: self.assignments.clone().and(assignment),
        }
    }

    pub fn assignments(&self) -> &OperatorGroup {
        &self.assignments
    }
}

impl Query for UpdateSet {
    fn query(&self) -> String {
        format!("{} SET {}", self.update.query(), self.assignments.query())
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Update
    }

    fn validate(&self) -> FlowResult<()> {
        if self.assignments.is_empty() {
            return Err(FlowError::validation(
                "UPDATE requires at least one SET assignment",
            ));
        }
        self.assignments.validate()
    }

    fn primary_table(&self) -> Option<Table> {
        Some(self.update.table.clone())
    }
}

impl Mutation for UpdateSet {
    fn target_table(&self) -> Table {
        self.update.table.clone()
    }

    fn change_action(&self) -> ChangeAction {
        ChangeAction::Update
    }
}
