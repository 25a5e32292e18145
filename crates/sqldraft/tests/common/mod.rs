//! In-memory client shared by the integration tests.

#![allow(dead_code)]

use sqldraft::{DraftError, DraftResult, GenericClient, Row, Value};
use std::collections::VecDeque;
use std::sync::Mutex;

/// Records every statement and answers queries from a queue of canned results.
#[derive(Default)]
pub struct MockClient {
    calls: Mutex<Vec<(String, Vec<Value>)>>,
    results: Mutex<VecDeque<Vec<Row>>>,
    affected: u64,
    last_id: Option<i64>,
    fail_with: Option<String>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the rows returned by the next `query`.
    pub fn with_rows(self, rows: Vec<Row>) -> Self {
        self.results.lock().unwrap().push_back(rows);
        self
    }

    pub fn with_affected(mut self, affected: u64) -> Self {
        self.affected = affected;
        self
    }

    pub fn with_last_id(mut self, id: i64) -> Self {
        self.last_id = Some(id);
        self
    }

    /// Make every statement fail with a driver error.
    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<(String, Vec<Value>)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn last_sql(&self) -> String {
        self.calls
            .lock()
            .unwrap()
            .last()
            .map(|(sql, _)| sql.clone())
            .unwrap_or_default()
    }

    fn record(&self, sql: &str, params: &[Value]) -> DraftResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((sql.to_string(), params.to_vec()));
        match &self.fail_with {
            Some(message) => Err(DraftError::query(message.clone())),
            None => Ok(()),
        }
    }
}

impl GenericClient for MockClient {
    async fn query(&self, sql: &str, params: &[Value]) -> DraftResult<Vec<Row>> {
        self.record(sql, params)?;
        Ok(self.results.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn execute(&self, sql: &str, params: &[Value]) -> DraftResult<u64> {
        self.record(sql, params)?;
        Ok(self.affected)
    }

    async fn insert(&self, sql: &str, params: &[Value]) -> DraftResult<Option<i64>> {
        self.record(sql, params)?;
        Ok(self.last_id)
    }
}
