//! `CREATE [TEMP] TRIGGER IF NOT EXISTS …` built in three steps:
//! [`Trigger`] (name and timing), [`TriggerMethod`] (event, table, row scope, WHEN) and
//! [`CompletedTrigger`] (body statements).
//!
//! ```
//! use flowsql::{Query, Table, Trigger, delete, insert};
//!
//! let users = Table::new("users");
//! let audit = Table::new("audit");
//! let trigger = Trigger::create("log_users")
//!     .after()
//!     .insert_on(&users)
//!     .begin(&insert(&audit).values(["insert"]))
//!     .and(&delete(&audit).where_(audit.property::<i64>("id").unwrap().lt(0)));
//! assert_eq!(
//!     trigger.query(),
//!     "CREATE TRIGGER IF NOT EXISTS `log_users` AFTER INSERT ON `users` \nBEGIN\n\
//!      INSERT INTO `audit` VALUES('insert');\nDELETE FROM `audit` WHERE `id`<0;\nEND"
//! );
//! ```

use crate::connection::Connection;
use crate::error::{FlowError, FlowResult};
use crate::log::QueryKind;
use crate::name_alias::{NameAlias, quote_if_needed};
use crate::operator::Condition;
use crate::property::AsColumn;
use crate::query::{Query, SubQuery};
use crate::table::{Adapter, Table};

/// When the trigger fires relative to the event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerTiming {
    Before,
    After,
    InsteadOf,
}

impl TriggerTiming {
    fn as_sql(self) -> &'static str {
        match self {
            TriggerTiming::Before => "BEFORE",
            TriggerTiming::After => "AFTER",
            TriggerTiming::InsteadOf => "INSTEAD OF",
        }
    }
}

/// The event a trigger listens for.
#[derive(Debug, Clone, PartialEq)]
pub enum TriggerEvent {
    Insert,
    Delete,
    /// `UPDATE [OF <columns>]`
    Update(Vec<NameAlias>),
}

impl TriggerEvent {
    fn query(&self) -> String {
        match self {
            TriggerEvent::Insert => "INSERT".to_string(),
            TriggerEvent::Delete => "DELETE".to_string(),
            TriggerEvent::Update(columns) if columns.is_empty() => "UPDATE".to_string(),
            TriggerEvent::Update(columns) => {
                let names: Vec<String> = columns.iter().map(NameAlias::query).collect();
                format!("UPDATE OF {}", names.join(", "))
            }
        }
    }
}

/// A named trigger, before its event is chosen.
#[derive(Debug, Clone, PartialEq)]
pub struct Trigger {
    name: String,
    temporary: bool,
    timing: Option<TriggerTiming>,
}

impl Trigger {
    pub fn create(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            temporary: false,
            timing: None,
        }
    }

    /// `CREATE TEMP TRIGGER`
    pub fn temporary(&self) -> Self {
        Self {
            temporary: true,
            ..self.clone()
        }
    }

    fn timed(&self, timing: TriggerTiming) -> Self {
        Self {
            timing: Some(timing),
            ..self.clone()
        }
    }

    pub fn before(&self) -> Self {
        self.timed(TriggerTiming::Before)
    }

    pub fn after(&self) -> Self {
        self.timed(TriggerTiming::After)
    }

    pub fn instead_of(&self) -> Self {
        self.timed(TriggerTiming::InsteadOf)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn method(&self, event: TriggerEvent, adapter: &impl Adapter) -> TriggerMethod {
        TriggerMethod {
            trigger: self.clone(),
            event,
            table: adapter.table(),
            for_each_row: false,
            when: None,
        }
    }

    pub fn insert_on(&self, adapter: &impl Adapter) -> TriggerMethod {
        self.method(TriggerEvent::Insert, adapter)
    }

    pub fn delete_on(&self, adapter: &impl Adapter) -> TriggerMethod {
        self.method(TriggerEvent::Delete, adapter)
    }

    /// `UPDATE [OF <columns>] ON <table>`; an empty list fires on any column.
    pub fn update_on(&self, adapter: &impl Adapter, columns: &[&dyn AsColumn]) -> TriggerMethod {
        let columns = columns.iter().map(|c| c.column_name()).collect();
        self.method(TriggerEvent::Update(columns), adapter)
    }

    /// Drop the trigger if it exists.
    pub async fn disable(&self, conn: &impl Connection) -> FlowResult<()> {
        let statement = DropTrigger {
            name: self.name.clone(),
        };
        statement.execute(conn).await
    }
}

/// A trigger with its event, before the body is given.
#[derive(Debug, Clone, PartialEq)]
pub struct TriggerMethod {
    trigger: Trigger,
    event: TriggerEvent,
    table: Table,
    for_each_row: bool,
    when: Option<Condition>,
}

impl TriggerMethod {
    pub fn for_each_row(&self) -> Self {
        Self {
            for_each_row: true,
            ..self.clone()
        }
    }

    /// `WHEN <condition>`
    pub fn when(&self, condition: impl Into<Condition>) -> Self {
        Self {
            when: Some(condition.into()),
            ..self.clone()
        }
    }

    /// Start the body with its first statement.
    pub fn begin(&self, statement: &impl Query) -> CompletedTrigger {
        CompletedTrigger {
            method: self.clone(),
            statements: vec![SubQuery::capture(statement)],
        }
    }

    fn query(&self) -> String {
        let temp = if self.trigger.temporary { "TEMP " } else { "" };
        let mut sql = format!(
            "CREATE {temp}TRIGGER IF NOT EXISTS {} ",
            quote_if_needed(&self.trigger.name)
        );
        if let Some(timing) = self.trigger.timing {
            sql.push_str(timing.as_sql());
            sql.push(' ');
        }
        sql.push_str(&self.event.query());
        sql.push_str(" ON ");
        sql.push_str(&self.table.quoted_name());
        if self.for_each_row {
            sql.push_str(" FOR EACH ROW");
        }
        if let Some(when) = &self.when {
            sql.push_str(" WHEN ");
            sql.push_str(&when.query());
        }
        sql
    }
}

/// A trigger with its body, ready to be created.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletedTrigger {
    method: TriggerMethod,
    statements: Vec<SubQuery>,
}

impl CompletedTrigger {
    /// Append a body statement.
    pub fn and(&self, statement: &impl Query) -> Self {
        let mut next = self.clone();
        next.statements.push(SubQuery::capture(statement));
        next
    }

    pub fn trigger(&self) -> &Trigger {
        &self.method.trigger
    }

    /// Create the trigger if it does not exist.
    pub async fn enable(&self, conn: &impl Connection) -> FlowResult<()> {
        self.execute(conn).await
    }

    /// Drop the trigger if it exists.
    pub async fn disable(&self, conn: &impl Connection) -> FlowResult<()> {
        self.method.trigger.disable(conn).await
    }
}

impl Query for CompletedTrigger {
    fn query(&self) -> String {
        let mut sql = self.method.query();
        sql.push_str(" \nBEGIN\n");
        for statement in &self.statements {
            sql.push_str(statement.sql());
            sql.push_str(";\n");
        }
        sql.push_str("END");
        sql
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Schema
    }

    fn validate(&self) -> FlowResult<()> {
        if self.statements.is_empty() {
            return Err(FlowError::validation(format!(
                "trigger `{}` has an empty body",
                self.method.trigger.name
            )));
        }
        if let Some(when) = &self.method.when {
            when.validate()?;
        }
        self.statements.iter().try_for_each(SubQuery::validate)
    }

    fn primary_table(&self) -> Option<Table> {
        Some(self.method.table.clone())
    }
}

/// `DROP TRIGGER IF EXISTS <name>`
#[derive(Debug, Clone)]
struct DropTrigger {
    name: String,
}

impl Query for DropTrigger {
    fn query(&self) -> String {
        format!("DROP TRIGGER IF EXISTS {}", quote_if_needed(&self.name))
    }

    fn kind(&self) -> QueryKind {
        QueryKind::Schema
    }
}
