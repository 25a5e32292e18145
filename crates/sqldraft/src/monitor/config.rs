use std::time::Duration;
use tracing::Level;

/// Configuration for statement logging.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Tracing event level for every statement.
    pub level: Level,
    /// Truncate long SQL strings (in bytes). `None` means no truncation.
    pub max_sql_length: Option<usize>,
    /// Statements slower than this are logged at `WARN`.
    pub slow_query_threshold: Option<Duration>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            level: Level::DEBUG,
            max_sql_length: Some(200),
            slow_query_threshold: None,
        }
    }
}

impl MonitorConfig {
    /// Create a new configuration with defaults (DEBUG, 200-byte SQL, no slow threshold).
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

    /// Set the slow query threshold.
    pub fn with_slow_query_threshold(mut self, threshold: Duration) -> Self {
        self.slow_query_threshold = Some(threshold);
        self
    }

    pub(crate) fn is_slow(&self, elapsed: Duration) -> bool {
        self.slow_query_threshold.is_some_and(|t| elapsed > t)
    }
}
