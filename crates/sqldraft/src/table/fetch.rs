//! Build-and-execute helpers.
//!
//! Each helper builds the current draft (resetting it) and runs the statement
//! through a [`GenericClient`].

use super::Table;
use crate::client::GenericClient;
use crate::error::{DraftError, DraftResult};
use crate::row::{FromRow, Row};
use crate::value::{FromValue, Value};
use std::collections::BTreeMap;

impl Table {
    /// Fetch all rows.
    pub async fn fetch_all(&mut self, client: &impl GenericClient) -> DraftResult<Vec<Row>> {
        let query = self.build();
        client.query(&query.sql, &query.params).await
    }

    /// Fetch the first row, if any.
    pub async fn fetch_one(&mut self, client: &impl GenericClient) -> DraftResult<Option<Row>> {
        let query = self.build();
        client.query_opt(&query.sql, &query.params).await
    }

    /// Fetch all rows and map them to `T`.
    pub async fn fetch_all_as<T: FromRow>(
        &mut self,
        client: &impl GenericClient,
    ) -> DraftResult<Vec<T>> {
        let rows = self.fetch_all(client).await?;
        rows.iter().map(T::from_row).collect()
    }

    /// Fetch the first row and map it to `T`.
    pub async fn fetch_one_as<T: FromRow>(
        &mut self,
        client: &impl GenericClient,
    ) -> DraftResult<Option<T>> {
        match self.fetch_one(client).await? {
            Some(row) => T::from_row(&row).map(Some),
            None => Ok(None),
        }
    }

    /// Select `COUNT(*)` with the current filters and return the number.
    pub async fn fetch_count(&mut self, client: &impl GenericClient) -> DraftResult<i64> {
        self.count();
        let row = self.fetch_one(client).await?;
        match row.as_ref().and_then(|r| r.get_index(0)) {
            Some(value) => i64::from_value(value).map_err(|message| {
                let column = row
                    .as_ref()
                    .and_then(|r| r.column_names().next())
                    .unwrap_or("count");
                DraftError::decode(column, message)
            }),
            None => Ok(0),
        }
    }

    /// Map the first column of each row to the second. Later rows win on duplicate keys.
    pub async fn fetch_key_pair<K, V>(
        &mut self,
        client: &impl GenericClient,
    ) -> DraftResult<BTreeMap<K, V>>
    where
        K: FromValue + Ord,
        V: FromValue,
    {
        let rows = self.fetch_all(client).await?;
        let mut pairs = BTreeMap::new();
        for row in &rows {
            let (key, value) = match (row.iter().next(), row.iter().nth(1)) {
                (Some(key), Some(value)) => (key, value),
                _ => {
                    return Err(DraftError::decode(
                        "*",
                        format!("key/value fetch needs two columns, got {}", row.len()),
                    ));
                }
            };
            let k = K::from_value(key.1).map_err(|m| DraftError::decode(key.0, m))?;
            let v = V::from_value(value.1).map_err(|m| DraftError::decode(value.0, m))?;
            pairs.insert(k, v);
        }
        Ok(pairs)
    }

    /// Group rows by their first column, keeping the first row of each group
    /// without that column. Groups are in order of first appearance.
    pub async fn fetch_grouped(
        &mut self,
        client: &impl GenericClient,
    ) -> DraftResult<Vec<(Value, Row)>> {
        let rows = self.fetch_all(client).await?;
        let mut groups: Vec<(Value, Row)> = Vec::new();
        for row in rows {
            let Some((key, rest)) = row.split_first() else {
                continue;
            };
            if !groups.iter().any(|(existing, _)| *existing == key) {
                groups.push((key, rest));
            }
        }
        Ok(groups)
    }

    /// Run hand-written SQL through the client, returning the affected count.
    ///
    /// The draft is left untouched.
    pub async fn execute_raw(
        &self,
        client: &impl GenericClient,
        sql: &str,
        params: &[Value],
    ) -> DraftResult<u64> {
        client.execute(sql, params).await
    }
}
