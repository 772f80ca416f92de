//! SQL statement logging via `tracing`.
//!
//! Every result factory emits the statement it is about to run on the `flowsql.sql` target
//! before touching the connection, so statements that fail still show up in the log.

use tracing::Level;

/// The kind of statement being run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryKind {
    Select,
    Insert,
    Update,
    Delete,
    /// CREATE / DROP of indexes and triggers
    Schema,
    Other,
}

impl QueryKind {
    /// Detect the kind from the leading keyword of `sql`.
    pub fn from_sql(sql: &str) -> Self {
        let keyword = sql
            .trim_start()
            .split(|c: char| c.is_whitespace() || c == '(')
            .next()
            .unwrap_or_default();
        if keyword.eq_ignore_ascii_case("SELECT") {
            QueryKind::Select
        } else if keyword.eq_ignore_ascii_case("INSERT") || keyword.eq_ignore_ascii_case("REPLACE")
        {
            QueryKind::Insert
        } else if keyword.eq_ignore_ascii_case("UPDATE") {
            QueryKind::Update
        } else if keyword.eq_ignore_ascii_case("DELETE") {
            QueryKind::Delete
        } else if keyword.eq_ignore_ascii_case("CREATE") || keyword.eq_ignore_ascii_case("DROP") {
            QueryKind::Schema
        } else {
            QueryKind::Other
        }
    }
}

/// How executed SQL is logged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SqlLogConfig {
    /// Tracing event level to emit at.
    pub level: Level,
    /// Truncate long SQL strings (in bytes, on a char boundary). `None` means no truncation.
    pub max_sql_length: Option<usize>,
}

impl SqlLogConfig {
    /// DEBUG level, SQL truncated to 200 bytes.
    pub const DEFAULT: SqlLogConfig = SqlLogConfig {
        level: Level::DEBUG,
        max_sql_length: Some(200),
    };

    pub fn new() -> Self {
        Self::default()
    }

    /// Override the tracing event level.
    pub fn level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Set maximum SQL length to display.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.max_sql_length = Some(len);
        self
    }

    /// Disable SQL truncation.
    pub fn no_truncate(mut self) -> Self {
        self.max_sql_length = None;
        self
    }

    pub(crate) fn truncate_sql(&self, sql: &str) -> String {
        match self.max_sql_length {
            Some(max) if sql.len() > max => format!("{}...", truncate_sql_bytes(sql, max)),
            _ => sql.to_string(),
        }
    }
}

impl Default for SqlLogConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}

fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// Emit `sql` on the `flowsql.sql` target at the configured level.
pub(crate) fn log_query(config: &SqlLogConfig, kind: QueryKind, sql: &str) {
    macro_rules! emit_at_level {
        ($level:expr, $($field:tt)*) => {
            match $level {
                Level::ERROR => tracing::error!($($field)*),
                Level::WARN  => tracing::warn!($($field)*),
                Level::INFO  => tracing::info!($($field)*),
                Level::DEBUG => tracing::debug!($($field)*),
                Level::TRACE => tracing::trace!($($field)*),
            }
        };
    }

    let sql = config.truncate_sql(sql);
    emit_at_level!(
        config.level,
        target: "flowsql.sql",
        kind = ?kind,
        sql = %sql,
    );
}
