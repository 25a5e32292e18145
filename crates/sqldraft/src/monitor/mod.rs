//! Statement logging for any [`GenericClient`].
//!
//! [`TracingClient`] wraps a client and emits one `tracing` event per statement
//! on the `sqldraft.sql` target, with the query type, parameter count, elapsed
//! time and (optionally truncated) SQL. Statements slower than the configured
//! threshold are reported at `WARN`.
//!
//! # Example
//!
//! ```rust,ignore
//! use sqldraft::monitor::{MonitorConfig, TracingClient};
//! use std::time::Duration;
//!
//! let client = TracingClient::new(db_client).with_config(
//!     MonitorConfig::new().with_slow_query_threshold(Duration::from_millis(500)),
//! );
//! users.fetch_all(&client).await?;
//! ```

mod config;
mod types;

#[cfg(test)]
mod tests;

pub use config::MonitorConfig;
pub use types::QueryType;

use crate::client::GenericClient;
use crate::error::DraftResult;
use crate::row::Row;
use crate::value::Value;
use std::time::{Duration, Instant};
use tracing::Level;

/// Truncate `sql` to at most `max_bytes`, backing off to a char boundary.
pub(crate) fn truncate_sql_bytes(sql: &str, max_bytes: usize) -> &str {
    if sql.len() <= max_bytes {
        return sql;
    }
    let mut end = max_bytes;
    while end > 0 && !sql.is_char_boundary(end) {
        end -= 1;
    }
    &sql[..end]
}

/// A client wrapper that logs every statement through `tracing`.
pub struct TracingClient<C> {
    client: C,
    config: MonitorConfig,
}

impl<C: GenericClient> TracingClient<C> {
    /// Wrap a client with the default configuration.
    pub fn new(client: C) -> Self {
        Self {
            client,
            config: MonitorConfig::default(),
        }
    }

    /// Set the monitor configuration.
    pub fn with_config(mut self, config: MonitorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MonitorConfig {
        &self.config
    }

    /// Get a reference to the inner client.
    pub fn inner(&self) -> &C {
        &self.client
    }

    /// Unwrap and return the inner client.
    pub fn into_inner(self) -> C {
        self.client
    }

    fn display_sql<'a>(&self, sql: &'a str) -> std::borrow::Cow<'a, str> {
        match self.config.max_sql_length {
            Some(max) if sql.len() > max => {
                format!("{}...", truncate_sql_bytes(sql, max)).into()
            }
            _ => sql.into(),
        }
    }

    fn emit(&self, sql: &str, param_count: usize, elapsed: Duration, failed: bool) {
        /// Dispatch a tracing event at a runtime-determined level.
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

        let query_type = QueryType::from_sql(sql).as_str();
        let shown = self.display_sql(sql);
        let elapsed_ms = elapsed.as_secs_f64() * 1000.0;

        if failed {
            tracing::error!(
                target: "sqldraft.sql",
                query_type,
                param_count,
                elapsed_ms,
                sql = %shown,
                "statement failed"
            );
        } else if self.config.is_slow(elapsed) {
            tracing::warn!(
                target: "sqldraft.sql",
                query_type,
                param_count,
                elapsed_ms,
                sql = %shown,
                "slow statement"
            );
        } else {
            emit_at_level!(
                self.config.level,
                target: "sqldraft.sql",
                query_type,
                param_count,
                elapsed_ms,
                sql = %shown,
            );
        }
    }
}

impl<C: GenericClient> GenericClient for TracingClient<C> {
    async fn query(&self, sql: &str, params: &[Value]) -> DraftResult<Vec<Row>> {
        let start = Instant::now();
        let result = self.client.query(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), result.is_err());
        result
    }

    async fn query_opt(&self, sql: &str, params: &[Value]) -> DraftResult<Option<Row>> {
        let start = Instant::now();
        let result = self.client.query_opt(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), result.is_err());
        result
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DraftResult<u64> {
        let start = Instant::now();
        let result = self.client.execute(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), result.is_err());
        result
    }

    async fn insert(&self, sql: &str, params: &[Value]) -> DraftResult<Option<i64>> {
        let start = Instant::now();
        let result = self.client.insert(sql, params).await;
        self.emit(sql, params.len(), start.elapsed(), result.is_err());
        result
    }
}
