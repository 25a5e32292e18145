//! Generic client trait for database access.

use crate::error::DraftResult;
use crate::row::Row;
use crate::value::Value;
use std::future::Future;

/// The database connection a [`Table`](crate::Table) executes through.
///
/// Statements use positional `?` placeholders and `params` holds exactly one
/// value per placeholder, in order. Implementations wrap a real driver (or a
/// transaction); the crate itself never opens connections.
pub trait GenericClient: Send + Sync {
    /// Execute a query and return all rows.
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<Vec<Row>>> + Send;

    /// Execute a query and return the first row, if any.
    ///
    /// Semantics:
    /// - 0 rows: returns `Ok(None)`
    /// - 1 or more rows: returns `Ok(Some(first_row))` (does **not** error)
    fn query_opt(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<Option<Row>>> + Send {
        async move {
            let rows = self.query(sql, params).await?;
            Ok(rows.into_iter().next())
        }
    }

    /// Execute a statement and return the number of affected rows.
    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<u64>> + Send;

    /// Execute an INSERT and return the last inserted id, if the driver reports one.
    fn insert(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<Option<i64>>> + Send;
}

impl<C: GenericClient> GenericClient for &C {
    fn query(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<Vec<Row>>> + Send {
        (**self).query(sql, params)
    }

    fn query_opt(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<Option<Row>>> + Send {
        (**self).query_opt(sql, params)
    }

    fn execute(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<u64>> + Send {
        (**self).execute(sql, params)
    }

    fn insert(
        &self,
        sql: &str,
        params: &[Value],
    ) -> impl Future<Output = DraftResult<Option<i64>>> + Send {
        (**self).insert(sql, params)
    }
}
