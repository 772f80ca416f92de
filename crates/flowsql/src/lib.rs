//! # flowsql
//!
//! A statically-typed SQL statement builder and execution core for embedded SQLite.
//!
//! ## Features
//!
//! - **Typed columns**: [`Property<T>`] only compares against values of its own type
//! - **Grammar-checked clause order**: WHERE, GROUP BY, HAVING, ORDER BY, LIMIT and OFFSET can
//!   only be chained in a valid order; anything else fails to compile
//! - **Immutable builders**: every clause returns a new value, so partial statements can branch
//! - **Explicit results**: a [`ResultFactory`] decides what a statement produces (rows, a count,
//!   an inserted row id, affected rows)
//! - **Change notification**: successful INSERT / UPDATE / DELETE report a [`TableChange`] to the
//!   connection's [`ChangeSink`]
//! - **SQL logging**: every executed statement is emitted on the `flowsql.sql` `tracing` target
//!
//! ## Statements
//!
//! ```
//! use flowsql::prelude::*;
//!
//! let users = Table::new("users").with_columns(&["id", "name", "age"]);
//! let name = users.property::<String>("name").unwrap();
//! let age = users.property::<i64>("age").unwrap();
//!
//! let query = select_columns(&[&name, &function::count_all().alias("n")])
//!     .from(&users)
//!     .where_(age.between(18, 65))
//!     .group_by(&[&name])
//!     .having(function::count_all().gt(1))
//!     .order_by(name.asc())
//!     .limit(10)
//!     .offset(20);
//!
//! assert_eq!(
//!     query.query(),
//!     "SELECT `name`, COUNT(*) AS `n` FROM `users` WHERE `age` BETWEEN 18 AND 65 \
//!      GROUP BY `name` HAVING COUNT(*)>1 ORDER BY `name` ASC LIMIT 10 OFFSET 20"
//! );
//! ```
//!
//! ## Execution
//!
//! ```ignore
//! use flowsql::prelude::*;
//!
//! let (queue, mut changes) = ChangeQueue::channel();
//! let conn = SqliteConnection::open(ConnectionConfig::new().path("app.db"))?
//!     .with_change_sink(std::sync::Arc::new(queue));
//!
//! let id = insert(&users).columns(&[&name]).values(["alice"]).execute_insert(&conn).await?;
//! let adults: Vec<User> = select().from(&users).where_(age.gte(18)).query_list(&conn).await?;
//! let removed = delete(&users).where_(age.lt(0)).execute_update_delete(&conn).await?;
//! ```

pub mod config;
pub mod connection;
pub mod error;
pub mod function;
pub mod log;
pub mod name_alias;
pub mod notify;
pub mod operator;
pub mod order_by;
pub mod prelude;
pub mod property;
pub mod query;
pub mod result;
pub mod row;
pub mod statement;
pub mod table;
pub mod value;

#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use config::ConnectionConfig;
pub use connection::Connection;
pub use error::{FlowError, FlowResult};
pub use log::{QueryKind, SqlLogConfig};
pub use name_alias::{NameAlias, NameAliasBuilder};
pub use notify::{ChangeAction, ChangeQueue, ChangeSink, ChangeStream, TableChange};
pub use operator::{
    Collate, Condition, Connective, ExistenceOperator, Operation, Operator, OperatorGroup,
};
pub use order_by::OrderBy;
pub use property::{AsColumn, Property};
pub use query::{Mutation, Queriable, Query};
pub use result::{
    CountResult, InsertResult, ListResult, ResultFactory, RowsResult, SingleResult, StringResult,
    UnitResult, UpdateDeleteResult,
};
pub use row::{FromRow, Row};
pub use table::{Adapter, ConflictAction, Table};
pub use value::{FromSqlValue, SqlValue};

// Re-export the statement entry points for easy access
pub use statement::{
    CompletedTrigger, Delete, DeleteFrom, Index, Insert, JoinKind, Select, SelectFrom, Trigger,
    TriggerMethod, Update, UpdateSet, Where, delete, index, insert, select, select_columns,
    select_distinct, trigger, update,
};

#[cfg(feature = "sqlite")]
pub use sqlite::SqliteConnection;
