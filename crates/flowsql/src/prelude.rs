//! Convenient imports for typical `flowsql` usage.
//!
//! ```ignore
//! use flowsql::prelude::*;
//! ```

pub use crate::{
    Adapter, AsColumn, ChangeAction, ChangeQueue, ChangeSink, ConflictAction, Condition,
    Connection, ConnectionConfig, FlowError, FlowResult, FromRow, Mutation, OperatorGroup,
    Property, Queriable, Query, Row, SqlValue, Table, TableChange,
};
pub use crate::{delete, index, insert, select, select_columns, select_distinct, trigger, update};
pub use crate::function;

#[cfg(feature = "sqlite")]
pub use crate::SqliteConnection;
