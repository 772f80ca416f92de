//! SQL literal values.
//!
//! Statements in this crate embed their values as literals in the rendered SQL text, so every
//! value that can appear in a predicate or VALUES row converts into a [`SqlValue`] and knows how
//! to render itself.

use crate::error::{FlowError, FlowResult};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt::Write as _;

/// A dynamically-typed SQLite value.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// `NULL`
    Null,
    /// 64-bit signed integer (also booleans, as `0`/`1`)
    Integer(i64),
    /// 64-bit float
    Real(f64),
    /// UTF-8 text
    Text(String),
    /// Binary data
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Whether this value is `NULL`.
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    /// Render as a SQL literal.
    pub fn to_literal(&self) -> String {
        match self {
            SqlValue::Null => "NULL".to_string(),
            SqlValue::Integer(v) => v.to_string(),
            SqlValue::Real(v) => format_real(*v),
            SqlValue::Text(v) => quote_text(v),
            SqlValue::Blob(bytes) => {
                let mut out = String::with_capacity(bytes.len() * 2 + 3);
                out.push_str("X'");
                for b in bytes {
                    let _ = write!(out, "{b:02X}");
                }
                out.push('\'');
                out
            }
        }
    }

    /// Integer view, if this value is an integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    /// Text view, if this value is text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

/// Single-quote `text`, doubling embedded quotes.
pub fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

// SQLite has no NaN (it stores NULL) and reads an overflowing literal as infinity.
fn format_real(v: f64) -> String {
    if v.is_nan() {
        "NULL".to_string()
    } else if v.is_infinite() {
        if v > 0.0 { "9e999" } else { "-9e999" }.to_string()
    } else if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for SqlValue {
                fn from(v: $t) -> Self {
                    SqlValue::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i8, i16, i32, i64, u8, u16, u32);

impl From<bool> for SqlValue {
    fn from(v: bool) -> Self {
        SqlValue::Integer(i64::from(v))
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        SqlValue::Real(f64::from(v))
    }
}

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Real(v)
    }
}

impl From<String> for SqlValue {
    fn from(v: String) -> Self {
        SqlValue::Text(v)
    }
}

impl From<&str> for SqlValue {
    fn from(v: &str) -> Self {
        SqlValue::Text(v.to_string())
    }
}

impl From<&String> for SqlValue {
    fn from(v: &String) -> Self {
        SqlValue::Text(v.clone())
    }
}

impl From<Vec<u8>> for SqlValue {
    fn from(v: Vec<u8>) -> Self {
        SqlValue::Blob(v)
    }
}

impl From<&[u8]> for SqlValue {
    fn from(v: &[u8]) -> Self {
        SqlValue::Blob(v.to_vec())
    }
}

impl<T: Into<SqlValue>> From<Option<T>> for SqlValue {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => SqlValue::Null,
        }
    }
}

impl From<NaiveDate> for SqlValue {
    fn from(v: NaiveDate) -> Self {
        SqlValue::Text(v.format("%Y-%m-%d").to_string())
    }
}

impl From<NaiveTime> for SqlValue {
    fn from(v: NaiveTime) -> Self {
        SqlValue::Text(v.format("%H:%M:%S%.f").to_string())
    }
}

impl From<NaiveDateTime> for SqlValue {
    fn from(v: NaiveDateTime) -> Self {
        SqlValue::Text(v.format("%Y-%m-%d %H:%M:%S%.f").to_string())
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(v: DateTime<Utc>) -> Self {
        SqlValue::Text(v.to_rfc3339())
    }
}

impl From<uuid::Uuid> for SqlValue {
    fn from(v: uuid::Uuid) -> Self {
        SqlValue::Text(v.hyphenated().to_string())
    }
}

impl From<serde_json::Value> for SqlValue {
    fn from(v: serde_json::Value) -> Self {
        SqlValue::Text(v.to_string())
    }
}

/// Decode a Rust value out of a [`SqlValue`] read from a result row.
pub trait FromSqlValue: Sized {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self>;
}

fn mismatch(expected: &str, value: &SqlValue) -> FlowError {
    FlowError::decode("", format!("expected {expected}, got {value:?}"))
}

impl FromSqlValue for SqlValue {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        Ok(value.clone())
    }
}

impl FromSqlValue for i64 {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        match value {
            SqlValue::Integer(v) => Ok(*v),
            other => Err(mismatch("integer", other)),
        }
    }
}

impl FromSqlValue for i32 {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        let v = i64::from_sql_value(value)?;
        i32::try_from(v).map_err(|_| FlowError::decode("", format!("{v} out of range for i32")))
    }
}

impl FromSqlValue for bool {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        Ok(i64::from_sql_value(value)? != 0)
    }
}

impl FromSqlValue for f64 {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        match value {
            SqlValue::Real(v) => Ok(*v),
            SqlValue::Integer(v) => Ok(*v as f64),
            other => Err(mismatch("real", other)),
        }
    }
}

impl FromSqlValue for String {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        match value {
            SqlValue::Text(v) => Ok(v.clone()),
            SqlValue::Integer(v) => Ok(v.to_string()),
            SqlValue::Real(v) => Ok(v.to_string()),
            other => Err(mismatch("text", other)),
        }
    }
}

impl FromSqlValue for Vec<u8> {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        match value {
            SqlValue::Blob(v) => Ok(v.clone()),
            SqlValue::Text(v) => Ok(v.clone().into_bytes()),
            other => Err(mismatch("blob", other)),
        }
    }
}

impl FromSqlValue for uuid::Uuid {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        let text = String::from_sql_value(value)?;
        uuid::Uuid::parse_str(&text).map_err(|e| FlowError::decode("", e.to_string()))
    }
}

impl FromSqlValue for NaiveDateTime {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        let text = String::from_sql_value(value)?;
        NaiveDateTime::parse_from_str(&text, "%Y-%m-%d %H:%M:%S%.f")
            .map_err(|e| FlowError::decode("", e.to_string()))
    }
}

impl FromSqlValue for NaiveDate {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        let text = String::from_sql_value(value)?;
        NaiveDate::parse_from_str(&text, "%Y-%m-%d")
            .map_err(|e| FlowError::decode("", e.to_string()))
    }
}

impl FromSqlValue for NaiveTime {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        let text = String::from_sql_value(value)?;
        NaiveTime::parse_from_str(&text, "%H:%M:%S%.f")
            .map_err(|e| FlowError::decode("", e.to_string()))
    }
}

/// RFC 3339 as written by this crate, or SQLite's `datetime()` text read as UTC.
impl FromSqlValue for DateTime<Utc> {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        let text = String::from_sql_value(value)?;
        match DateTime::parse_from_rfc3339(&text) {
            Ok(v) => Ok(v.with_timezone(&Utc)),
            Err(_) => NaiveDateTime::from_sql_value(value).map(|v| v.and_utc()),
        }
    }
}

impl FromSqlValue for serde_json::Value {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        let text = String::from_sql_value(value)?;
        serde_json::from_str(&text).map_err(|e| FlowError::decode("", e.to_string()))
    }
}

impl<T: FromSqlValue> FromSqlValue for Option<T> {
    fn from_sql_value(value: &SqlValue) -> FlowResult<Self> {
        match value {
            SqlValue::Null => Ok(None),
            other => T::from_sql_value(other).map(Some),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<SqlValue> for rusqlite::types::Value {
    fn from(v: SqlValue) -> Self {
        use rusqlite::types::Value;
        match v {
            SqlValue::Null => Value::Null,
            SqlValue::Integer(v) => Value::Integer(v),
            SqlValue::Real(v) => Value::Real(v),
            SqlValue::Text(v) => Value::Text(v),
            SqlValue::Blob(v) => Value::Blob(v),
        }
    }
}

#[cfg(feature = "sqlite")]
impl From<rusqlite::types::ValueRef<'_>> for SqlValue {
    fn from(v: rusqlite::types::ValueRef<'_>) -> Self {
        use rusqlite::types::ValueRef;
        match v {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(v) => SqlValue::Integer(v),
            ValueRef::Real(v) => SqlValue::Real(v),
            ValueRef::Text(v) => SqlValue::Text(String::from_utf8_lossy(v).into_owned()),
            ValueRef::Blob(v) => SqlValue::Blob(v.to_vec()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_literals_escape_quotes() {
        assert_eq!(SqlValue::from("it's").to_literal(), "'it''s'");
    }

    #[test]
    fn scalar_literals() {
        assert_eq!(SqlValue::from(42i32).to_literal(), "42");
        assert_eq!(SqlValue::from(true).to_literal(), "1");
        assert_eq!(SqlValue::from(1.5f64).to_literal(), "1.5");
        assert_eq!(SqlValue::from(2.0f64).to_literal(), "2.0");
        assert_eq!(SqlValue::Null.to_literal(), "NULL");
        assert_eq!(SqlValue::from(vec![0xABu8, 0x01]).to_literal(), "X'AB01'");
    }

    #[test]
    fn option_none_is_null() {
        assert!(SqlValue::from(Option::<i64>::None).is_null());
        assert_eq!(SqlValue::from(Some("a")), SqlValue::Text("a".into()));
    }

    #[test]
    fn chrono_and_uuid_render_as_text() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(SqlValue::from(date).to_literal(), "'2024-02-29'");
        let id = uuid::Uuid::nil();
        assert_eq!(
            SqlValue::from(id).to_literal(),
            "'00000000-0000-0000-0000-000000000000'"
        );
    }

    #[test]
    fn non_finite_reals_stay_valid_sql() {
        assert_eq!(SqlValue::from(f64::NAN).to_literal(), "NULL");
        assert_eq!(SqlValue::from(f64::INFINITY).to_literal(), "9e999");
        assert_eq!(SqlValue::from(f64::NEG_INFINITY).to_literal(), "-9e999");
        assert_eq!(SqlValue::from(1e300f64).to_literal(), 1e300f64.to_string());
    }

    #[test]
    fn chrono_values_decode_what_they_encode() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
        assert_eq!(NaiveDate::from_sql_value(&SqlValue::from(date)).unwrap(), date);

        let time = NaiveTime::from_hms_milli_opt(13, 5, 9, 250).unwrap();
        assert_eq!(NaiveTime::from_sql_value(&SqlValue::from(time)).unwrap(), time);

        let at = date.and_time(time).and_utc();
        assert_eq!(
            DateTime::<Utc>::from_sql_value(&SqlValue::from(at)).unwrap(),
            at
        );
        let from_sqlite = SqlValue::Text("2024-02-29 13:05:09".into());
        assert_eq!(
            DateTime::<Utc>::from_sql_value(&from_sqlite).unwrap(),
            date.and_hms_opt(13, 5, 9).unwrap().and_utc()
        );
        assert!(NaiveDate::from_sql_value(&SqlValue::Text("yesterday".into())).is_err());
    }

    #[test]
    fn decode_values() {
        assert_eq!(i64::from_sql_value(&SqlValue::Integer(7)).unwrap(), 7);
        assert_eq!(
            Option::<String>::from_sql_value(&SqlValue::Null).unwrap(),
            None
        );
        assert!(i64::from_sql_value(&SqlValue::Text("x".into())).is_err());
    }
}
