//! INSERT, UPDATE and DELETE statements for a table.
//!
//! Each operation has a pure `*_statement` form that takes the current time
//! explicitly, and an async form that stamps `now` and runs the statement.

use super::{BuiltQuery, Table};
use crate::client::GenericClient;
use crate::condition::{Logic, PredicateGroup, Predicates, render_where};
use crate::error::{DraftError, DraftResult};
use crate::ident;
use crate::row::Row;
use crate::value::Value;
use chrono::{NaiveDateTime, Utc};

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

impl Table {
    /// `INSERT INTO` statement; timestampable tables get both timestamps set to `now`.
    pub fn insert_statement(&self, data: Row, now: NaiveDateTime) -> DraftResult<BuiltQuery> {
        self.render_insert("INSERT INTO", data, now)
    }

    /// Insert that skips rows conflicting with a unique key
    /// (`INSERT IGNORE INTO` on MySQL, `INSERT OR IGNORE INTO` on SQLite).
    pub fn insert_ignore_statement(
        &self,
        data: Row,
        now: NaiveDateTime,
    ) -> DraftResult<BuiltQuery> {
        self.render_insert(self.config.dialect.insert_ignore_prefix(), data, now)
    }

    fn render_insert(
        &self,
        verb: &str,
        mut data: Row,
        now: NaiveDateTime,
    ) -> DraftResult<BuiltQuery> {
        if data.is_empty() {
            return Err(DraftError::validation(format!(
                "insert into `{}` needs at least one column",
                self.name
            )));
        }
        if self.meta.timestampable {
            data.insert(self.config.created_at_column.clone(), now);
            data.insert(self.config.updated_at_column.clone(), now);
        }

        let mut columns = Vec::with_capacity(data.len());
        let mut params = Vec::with_capacity(data.len());
        for (column, value) in data {
            columns.push(ident::quote(&column));
            params.push(value);
        }
        let placeholders = vec!["?"; params.len()].join(", ");
        let sql = format!(
            "{} {} ({}) VALUES ({})",
            verb,
            ident::quote(&self.name),
            columns.join(", "),
            placeholders
        );
        Ok(BuiltQuery::new(sql, params))
    }

    /// `UPDATE ... SET ...`; timestampable tables get the updated-at column refreshed.
    pub fn update_statement(
        &self,
        mut data: Row,
        filter: Predicates,
        now: NaiveDateTime,
    ) -> DraftResult<BuiltQuery> {
        if data.is_empty() {
            return Err(DraftError::validation(format!(
                "update of `{}` needs at least one column",
                self.name
            )));
        }
        if self.meta.timestampable {
            data.insert(self.config.updated_at_column.clone(), now);
        }
        Ok(self.render_update(data, filter))
    }

    /// DELETE, or an update of the soft-delete column when the table is soft-deletable.
    pub fn delete_statement(&self, filter: Predicates, now: NaiveDateTime) -> BuiltQuery {
        if self.meta.soft_deletable {
            let data = Row::new().with(self.config.soft_delete_column.clone(), now);
            return self.render_update(data, filter);
        }
        let mut sql = format!("DELETE FROM {}", ident::quote(&self.name));
        let params = self.push_where(&mut sql, filter);
        BuiltQuery::new(sql, params)
    }

    /// `DELETE FROM` the whole table, ignoring soft-delete.
    pub fn drop_all_statement(&self) -> BuiltQuery {
        BuiltQuery::new(format!("DELETE FROM {}", ident::quote(&self.name)), Vec::new())
    }

    fn render_update(&self, data: Row, filter: Predicates) -> BuiltQuery {
        let mut params = Vec::with_capacity(data.len() + filter.len());
        let assignments: Vec<String> = data
            .into_iter()
            .map(|(column, value)| {
                params.push(value);
                format!("{} = ?", ident::quote(&column))
            })
            .collect();
        let mut sql = format!(
            "UPDATE {} SET {}",
            ident::quote(&self.name),
            assignments.join(", ")
        );
        params.extend(self.push_where(&mut sql, filter));
        BuiltQuery::new(sql, params)
    }

    fn push_where(&self, sql: &mut String, filter: Predicates) -> Vec<Value> {
        let group = PredicateGroup::new(filter, Logic::And);
        let (where_sql, params) =
            render_where(std::slice::from_ref(&group), &self.render_context().predicate());
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }
        params
    }

    // ==================== Executing ====================

    /// Insert a row and return the new id, if the driver reports one.
    pub async fn insert(
        &self,
        client: &impl GenericClient,
        data: Row,
    ) -> DraftResult<Option<i64>> {
        let query = self.insert_statement(data, now())?;
        client.insert(&query.sql, &query.params).await
    }

    /// Insert a row unless it conflicts with a unique key.
    pub async fn insert_ignore(
        &self,
        client: &impl GenericClient,
        data: Row,
    ) -> DraftResult<Option<i64>> {
        let query = self.insert_ignore_statement(data, now())?;
        client.insert(&query.sql, &query.params).await
    }

    /// Update matching rows and return the affected count.
    pub async fn update(
        &self,
        client: &impl GenericClient,
        data: Row,
        filter: Predicates,
    ) -> DraftResult<u64> {
        let query = self.update_statement(data, filter, now())?;
        client.execute(&query.sql, &query.params).await
    }

    /// Delete (or soft-delete) matching rows and return the affected count.
    pub async fn delete(&self, client: &impl GenericClient, filter: Predicates) -> DraftResult<u64> {
        let query = self.delete_statement(filter, now());
        if self.meta.soft_deletable {
            tracing::debug!(table = %self.name, "delete redirected to soft-delete update");
        }
        client.execute(&query.sql, &query.params).await
    }

    /// Remove every row of the table.
    pub async fn drop_all(&self, client: &impl GenericClient) -> DraftResult<u64> {
        let query = self.drop_all_statement();
        client.execute(&query.sql, &query.params).await
    }
}
