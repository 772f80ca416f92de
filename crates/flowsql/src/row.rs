//! Result rows and row mapping.

use crate::error::{FlowError, FlowResult};
use crate::value::{FromSqlValue, SqlValue};
use std::sync::Arc;

/// One row returned by a query. Column names are shared between rows of the same result.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<SqlValue>,
}

impl Row {
    pub fn new(columns: Arc<[String]>, values: Vec<SqlValue>) -> Self {
        Self { columns, values }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The raw value at `idx`.
    pub fn value(&self, idx: usize) -> Option<&SqlValue> {
        self.values.get(idx)
    }

    /// Decode the value at `idx`.
    pub fn get<T: FromSqlValue>(&self, idx: usize) -> FlowResult<T> {
        let column = self
            .columns
            .get(idx)
            .map(String::as_str)
            .unwrap_or_default();
        let value = self
            .values
            .get(idx)
            .ok_or_else(|| FlowError::decode(column, format!("no column at index {idx}")))?;
        T::from_sql_value(value).map_err(|e| with_column(e, column))
    }

    /// Decode the value of the column named `column`.
    pub fn try_get_column<T: FromSqlValue>(&self, column: &str) -> FlowResult<T> {
        let idx = self
            .columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| FlowError::decode(column, "no such column"))?;
        self.get(idx)
    }

    pub fn into_values(self) -> Vec<SqlValue> {
        self.values
    }
}

fn with_column(err: FlowError, column: &str) -> FlowError {
    match err {
        FlowError::Decode { message, .. } => FlowError::decode(column, message),
        other => other,
    }
}

/// Maps a result row into a Rust value.
///
/// ```
/// use flowsql::{FlowResult, FromRow, Row};
///
/// struct User {
///     id: i64,
///     name: String,
/// }
///
/// impl FromRow for User {
///     fn from_row(row: &Row) -> FlowResult<Self> {
///         Ok(Self {
///             id: row.try_get_column("id")?,
///             name: row.try_get_column("name")?,
///         })
///     }
/// }
/// ```
pub trait FromRow: Sized {
    fn from_row(row: &Row) -> FlowResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> FlowResult<Self> {
        Ok(row.clone())
    }
}

macro_rules! impl_from_row_tuple {
    ($($t:ident => $idx:tt),+) => {
        impl<$($t: FromSqlValue),+> FromRow for ($($t,)+) {
            fn from_row(row: &Row) -> FlowResult<Self> {
                Ok(($(row.get::<$t>($idx)?,)+))
            }
        }
    };
}

impl_from_row_tuple!(A => 0);
impl_from_row_tuple!(A => 0, B => 1);
impl_from_row_tuple!(A => 0, B => 1, C => 2);
impl_from_row_tuple!(A => 0, B => 1, C => 2, D => 3);

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        Row::new(
            Arc::from(vec!["id".to_string(), "name".to_string()]),
            vec![SqlValue::Integer(1), SqlValue::Text("a".into())],
        )
    }

    #[test]
    fn typed_access() {
        let row = row();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
        assert_eq!(row.try_get_column::<String>("name").unwrap(), "a");
    }

    #[test]
    fn decode_errors_name_the_column() {
        let err = row().try_get_column::<i64>("name").unwrap_err();
        match err {
            FlowError::Decode { column, .. } => assert_eq!(column, "name"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(row().try_get_column::<i64>("missing").is_err());
        assert!(row().get::<i64>(9).is_err());
    }

    #[test]
    fn tuples() {
        let (id, name): (i64, String) = FromRow::from_row(&row()).unwrap();
        assert_eq!((id, name.as_str()), (1, "a"));
    }
}
