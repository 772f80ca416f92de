//! Statement builders.
//!
//! Every builder is an immutable value: clause methods borrow `&self` and return a new builder,
//! so a partially built statement can be cloned into several variants.
//!
//! # Usage
//!
//! ```
//! use flowsql::prelude::*;
//!
//! let users = Table::new("users").with_columns(&["id", "name", "age"]);
//! let name = users.property::<String>("name").unwrap();
//! let age = users.property::<i64>("age").unwrap();
//!
//! // SELECT
//! let adults = select().from(&users).where_(age.gte(18)).order_by(name.asc()).limit(20);
//! assert_eq!(
//!     adults.query(),
//!     "SELECT * FROM `users` WHERE `age`>=18 ORDER BY `name` ASC LIMIT 20"
//! );
//!
//! // INSERT
//! let add = insert(&users).columns(&[&name, &age]).values([SqlValue::from("ann"), 30.into()]);
//! assert_eq!(add.query(), "INSERT INTO `users`(`name`,`age`) VALUES('ann',30)");
//!
//! // UPDATE
//! let rename = update(&users).set(name.eq("bob")).where_(name.eq("ann"));
//! assert_eq!(rename.query(), "UPDATE `users` SET `name`='bob' WHERE `name`='ann'");
//!
//! // DELETE
//! let purge = delete(&users).where_(age.lt(0));
//! assert_eq!(purge.query(), "DELETE FROM `users` WHERE `age`<0");
//! ```

mod delete;
mod from;
mod index;
mod insert;
mod select;
mod trigger;
mod update;
mod where_clause;


pub use delete::{Delete, DeleteFrom};
pub use from::{Join, JoinBuilder, JoinKind, SelectFrom};
pub use index::Index;
pub use insert::Insert;
pub use select::{Qualifier, Select};
pub use trigger::{CompletedTrigger, Trigger, TriggerEvent, TriggerMethod, TriggerTiming};
pub use update::{Update, UpdateSet};
pub use where_clause::{Where, stage};

use crate::property::AsColumn;
use crate::table::Adapter;

/// `SELECT *`
pub fn select() -> Select {
    Select::default()
}

/// `SELECT <columns>`
pub fn select_columns(columns: &[&dyn AsColumn]) -> Select {
    Select::new(columns)
}

/// `SELECT DISTINCT <columns>`
pub fn select_distinct(columns: &[&dyn AsColumn]) -> Select {
    Select::new(columns).distinct()
}

/// `INSERT INTO <table>`
pub fn insert(adapter: &impl Adapter) -> Insert {
    Insert::new(adapter)
}

/// `UPDATE <table>`
pub fn update(adapter: &impl Adapter) -> Update {
    Update::new(adapter)
}

/// `DELETE FROM <table>`
pub fn delete(adapter: &impl Adapter) -> DeleteFrom {
    Delete::from(adapter)
}

/// `CREATE INDEX <name>`
pub fn index(name: impl Into<String>) -> Index {
    Index::new(name)
}

/// `CREATE TRIGGER <name>`
pub fn trigger(name: impl Into<String>) -> Trigger {
    Trigger::create(name)
}
