//! Error types for flowsql

use thiserror::Error;

/// Result type alias for flowsql operations
pub type FlowResult<T> = Result<T, FlowError>;

/// Error types for statement construction and execution
#[derive(Debug, Error)]
pub enum FlowError {
    /// An INSERT value row does not match the explicit column list
    #[error("Arity error: value row {row} has {actual} values but {expected} columns were specified")]
    Arity {
        row: usize,
        expected: usize,
        actual: usize,
    },

    /// INSERT with neither VALUES rows nor a SELECT sub-statement
    #[error("Construction error: INSERT requires at least one VALUES row or a SELECT")]
    EmptyValues,

    /// INSERT with both VALUES rows and a SELECT sub-statement
    #[error("Construction error: INSERT cannot combine VALUES rows with a SELECT")]
    ValuesWithSelect,

    /// AND and OR appended to the same flat operator group
    #[error("Construction error: cannot mix AND and OR in one flat group, nest a clause instead")]
    MixedConnectives,

    /// WHERE EXISTS set on a statement that also has plain predicates
    #[error("Construction error: WHERE EXISTS cannot be combined with plain predicates")]
    ExistsWithPredicates,

    /// Other builder misuse
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error reported by SQLite
    #[cfg(feature = "sqlite")]
    #[error("Query error: {0}")]
    Query(#[from] rusqlite::Error),

    /// Unique or primary key constraint violation
    #[error("Unique constraint violation: {0}")]
    UniqueViolation(String),

    /// Foreign key constraint violation
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// Check constraint violation
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// NOT NULL constraint violation
    #[error("Not null violation: {0}")]
    NotNullViolation(String),

    /// Row not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Row decode/mapping error
    #[error("Decode error on column '{column}': {message}")]
    Decode { column: String, message: String },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl FlowError {
    /// Create a decode error for a specific column
    pub fn decode(column: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            column: column.into(),
            message: message.into(),
        }
    }

    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Whether this error was raised while building a statement, before any database access.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::Arity { .. }
                | Self::EmptyValues
                | Self::ValuesWithSelect
                | Self::MixedConnectives
                | Self::ExistsWithPredicates
                | Self::Validation(_)
        )
    }

    /// Owned copy for builders that carry an error until validation. Construction errors keep
    /// their variant; anything else becomes `Other` with its message.
    pub(crate) fn detached(&self) -> Self {
        match self {
            Self::Arity {
                row,
                expected,
                actual,
            } => Self::Arity {
                row: *row,
                expected: *expected,
                actual: *actual,
            },
            Self::EmptyValues => Self::EmptyValues,
            Self::ValuesWithSelect => Self::ValuesWithSelect,
            Self::MixedConnectives => Self::MixedConnectives,
            Self::ExistsWithPredicates => Self::ExistsWithPredicates,
            Self::Validation(message) => Self::Validation(message.clone()),
            other => Self::Other(other.to_string()),
        }
    }

    /// Check if this is a unique violation error
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, Self::UniqueViolation(_))
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Parse a rusqlite error into a more specific FlowError
    #[cfg(feature = "sqlite")]
    pub fn from_sqlite_error(err: rusqlite::Error) -> Self {
        use rusqlite::ffi;

        if let rusqlite::Error::SqliteFailure(ref code, ref message) = err {
            if code.code == rusqlite::ErrorCode::ConstraintViolation {
                let message = message.clone().unwrap_or_else(|| code.to_string());
                match code.extended_code {
                    ffi::SQLITE_CONSTRAINT_UNIQUE | ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                        return Self::UniqueViolation(message);
                    }
                    ffi::SQLITE_CONSTRAINT_FOREIGNKEY => return Self::ForeignKeyViolation(message),
                    ffi::SQLITE_CONSTRAINT_CHECK => return Self::CheckViolation(message),
                    ffi::SQLITE_CONSTRAINT_NOTNULL => return Self::NotNullViolation(message),
                    _ => {}
                }
            }
        }
        Self::Query(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_errors_are_flagged() {
        assert!(FlowError::EmptyValues.is_construction());
        assert!(
            FlowError::Arity {
                row: 0,
                expected: 2,
                actual: 1
            }
            .is_construction()
        );
        assert!(!FlowError::not_found("x").is_construction());
    }

    #[test]
    fn detached_copy_keeps_construction_variants() {
        let err = FlowError::Arity {
            row: 0,
            expected: 2,
            actual: 1,
        };
        assert!(matches!(
            err.detached(),
            FlowError::Arity {
                row: 0,
                expected: 2,
                actual: 1
            }
        ));
        assert!(matches!(
            FlowError::MixedConnectives.detached(),
            FlowError::MixedConnectives
        ));
        assert!(matches!(
            FlowError::not_found("user 7").detached(),
            FlowError::Other(message) if message == "Not found: user 7"
        ));
    }

    #[test]
    fn arity_message_names_counts() {
        let err = FlowError::Arity {
            row: 1,
            expected: 2,
            actual: 3,
        };
        assert_eq!(
            err.to_string(),
            "Arity error: value row 1 has 3 values but 2 columns were specified"
        );
    }
}
