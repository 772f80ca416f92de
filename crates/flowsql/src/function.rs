//! SQLite aggregate and scalar functions as typed properties.
//!
//! ```
//! use flowsql::{function, Table};
//!
//! let orders = Table::new("orders");
//! let total = orders.property::<f64>("total").unwrap();
//! assert_eq!(function::sum(&total).query(), "SUM(`total`)");
//! assert_eq!(function::count_all().query(), "COUNT(*)");
//! ```

use crate::name_alias::NameAlias;
use crate::property::{AsColumn, Property};
use crate::value::quote_text;

fn method<T>(name: &str, args: &[&dyn AsColumn]) -> Property<T> {
    let args = args
        .iter()
        .map(|arg| arg.column_name().query())
        .collect::<Vec<_>>()
        .join(", ");
    Property::from_name_alias(NameAlias::raw(format!("{name}({args})")))
}

/// `COUNT(*)`
pub fn count_all() -> Property<i64> {
    Property::raw("COUNT(*)")
}

pub fn count<T>(property: &Property<T>) -> Property<i64> {
    method("COUNT", &[property])
}

pub fn max<T>(property: &Property<T>) -> Property<T> {
    method("MAX", &[property])
}

pub fn min<T>(property: &Property<T>) -> Property<T> {
    method("MIN", &[property])
}

/// `SUM(x)`; NULL for an empty set.
pub fn sum<T>(property: &Property<T>) -> Property<T> {
    method("SUM", &[property])
}

/// `TOTAL(x)`; always a float, 0.0 for an empty set.
pub fn total<T>(property: &Property<T>) -> Property<f64> {
    method("TOTAL", &[property])
}

pub fn avg<T>(property: &Property<T>) -> Property<f64> {
    method("AVG", &[property])
}

/// `GROUP_CONCAT(x)`, or `GROUP_CONCAT(x, 'sep')` with a separator.
pub fn group_concat<T>(property: &Property<T>, separator: Option<&str>) -> Property<String> {
    match separator {
        Some(sep) => Property::raw(format!(
            "GROUP_CONCAT({}, {})",
            property.query(),
            quote_text(sep)
        )),
        None => method("GROUP_CONCAT", &[property]),
    }
}

pub fn upper(property: &Property<String>) -> Property<String> {
    method("UPPER", &[property])
}

pub fn lower(property: &Property<String>) -> Property<String> {
    method("LOWER", &[property])
}

pub fn length<T>(property: &Property<T>) -> Property<i64> {
    method("LENGTH", &[property])
}

pub fn abs<T>(property: &Property<T>) -> Property<T> {
    method("ABS", &[property])
}

/// `datetime(x)`
pub fn datetime<T>(property: &Property<T>) -> Property<String> {
    method("datetime", &[property])
}

/// `strftime('<format>', x)`
pub fn strftime<T>(format: &str, property: &Property<T>) -> Property<String> {
    Property::raw(format!("strftime({}, {})", quote_text(format), property.query()))
}

/// Start a `CAST(x AS <type>)` expression.
pub fn cast<T>(property: &Property<T>) -> Cast {
    Cast {
        expression: property.query(),
    }
}

/// Pending CAST; pick the target storage class.
#[derive(Debug, Clone)]
pub struct Cast {
    expression: String,
}

impl Cast {
    fn to<U>(&self, storage: &str) -> Property<U> {
        Property::raw(format!("CAST({} AS {storage})", self.expression))
    }

    pub fn as_integer(&self) -> Property<i64> {
        self.to("INTEGER")
    }

    pub fn as_real(&self) -> Property<f64> {
        self.to("REAL")
    }

    pub fn as_text(&self) -> Property<String> {
        self.to("TEXT")
    }

    pub fn as_blob(&self) -> Property<Vec<u8>> {
        self.to("BLOB")
    }
}
