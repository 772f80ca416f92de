//! Connection configuration.

use crate::log::SqlLogConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::Level;

/// Configuration for opening a [`SqliteConnection`](crate::sqlite::SqliteConnection).
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionConfig {
    /// Database file. `None` opens a private in-memory database.
    pub path: Option<PathBuf>,
    /// Whether `PRAGMA foreign_keys = ON` is issued after opening.
    pub foreign_keys: bool,
    /// How long a statement waits on a locked database before failing.
    pub busy_timeout: Option<Duration>,
    /// SQL logging settings.
    pub log: SqlLogConfig,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            path: None,
            foreign_keys: true,
            busy_timeout: Some(Duration::from_secs(5)),
            log: SqlLogConfig::default(),
        }
    }
}

impl ConnectionConfig {
    /// Create a new configuration with defaults (in-memory database).
    pub fn new() -> Self {
        Self::default()
    }

    /// An in-memory database.
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Use the database file at `path`.
    pub fn path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// Enable or disable foreign key enforcement.
    pub fn foreign_keys(mut self, enabled: bool) -> Self {
        self.foreign_keys = enabled;
        self
    }

    /// Set the busy timeout.
    pub fn busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }

    /// Override the SQL log level.
    pub fn log_level(mut self, level: Level) -> Self {
        self.log = self.log.level(level);
        self
    }

    /// Set maximum SQL length to log.
    pub fn max_sql_length(mut self, len: usize) -> Self {
        self.log = self.log.max_sql_length(len);
        self
    }

    /// Log SQL without truncation.
    pub fn no_truncate(mut self) -> Self {
        self.log = self.log.no_truncate();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = ConnectionConfig::new()
            .path("/tmp/app.db")
            .foreign_keys(false)
            .busy_timeout(Duration::from_millis(250))
            .log_level(Level::INFO)
            .no_truncate();
        assert_eq!(config.path.as_deref(), Some(Path::new("/tmp/app.db")));
        assert!(!config.foreign_keys);
        assert_eq!(config.busy_timeout, Some(Duration::from_millis(250)));
        assert_eq!(config.log.level, Level::INFO);
        assert_eq!(config.log.max_sql_length, None);
    }

    #[test]
    fn defaults() {
        let config = ConnectionConfig::in_memory();
        assert!(config.path.is_none());
        assert!(config.foreign_keys);
        assert_eq!(config.log, SqlLogConfig::DEFAULT);
    }
}
