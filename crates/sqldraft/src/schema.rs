//! Table metadata: which behaviors apply to a table.

use crate::client::GenericClient;
use crate::config::TableConfig;
use crate::error::{DraftError, DraftResult};
use crate::ident;
use crate::value::Value;
use std::future::Future;

/// Two flags decided per table from its columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableMeta {
    /// Has both the created-at and updated-at columns.
    pub timestampable: bool,
    /// Has the soft-delete column.
    pub soft_deletable: bool,
}

impl TableMeta {
    pub fn new(timestampable: bool, soft_deletable: bool) -> Self {
        Self {
            timestampable,
            soft_deletable,
        }
    }

    /// Decide both flags from a table's column names.
    pub fn from_columns<S: AsRef<str>>(columns: &[S], config: &TableConfig) -> Self {
        let has = |name: &str| columns.iter().any(|c| c.as_ref() == name);
        Self {
            timestampable: has(&config.created_at_column) && has(&config.updated_at_column),
            soft_deletable: has(&config.soft_delete_column),
        }
    }
}

/// Source of [`TableMeta`] for a table name.
pub trait MetadataProvider: Send + Sync {
    fn table_meta(
        &self,
        table: &str,
        config: &TableConfig,
    ) -> impl Future<Output = DraftResult<TableMeta>> + Send;
}

/// Fixed metadata, for tests and schemas known up front.
impl MetadataProvider for TableMeta {
    async fn table_meta(&self, _table: &str, _config: &TableConfig) -> DraftResult<TableMeta> {
        Ok(*self)
    }
}

/// Reads column names with `DESCRIBE` (MySQL) or `PRAGMA table_info` (SQLite).
pub struct DescribeProvider<C> {
    client: C,
}

impl<C: GenericClient> DescribeProvider<C> {
    pub fn new(client: C) -> Self {
        Self { client }
    }

    /// List a table's column names.
    pub async fn columns(&self, table: &str, config: &TableConfig) -> DraftResult<Vec<String>> {
        let sql = config.dialect.describe_sql(&ident::quote(table));
        let rows = self.client.query(&sql, &[]).await?;
        let name_column = config.dialect.describe_name_column();

        rows.iter()
            .map(|row| match row.get(name_column) {
                Some(Value::Text(name)) => Ok(name.clone()),
                Some(other) => Err(DraftError::decode(
                    name_column,
                    format!("expected text, got {}", other.type_name()),
                )),
                None => Err(DraftError::decode(name_column, "column not found")),
            })
            .collect()
    }
}

impl<C: GenericClient> MetadataProvider for DescribeProvider<C> {
    async fn table_meta(&self, table: &str, config: &TableConfig) -> DraftResult<TableMeta> {
        let columns = self.columns(table, config).await?;
        if columns.is_empty() {
            return Err(DraftError::not_found(format!("table `{table}` has no columns")));
        }
        Ok(TableMeta::from_columns(&columns, config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_from_columns() {
        let config = TableConfig::default();
        let meta = TableMeta::from_columns(
            &["id", "name", "created_at", "updated_at", "deleted_at"],
            &config,
        );
        assert_eq!(meta, TableMeta::new(true, true));

        let meta = TableMeta::from_columns(&["id", "created_at"], &config);
        assert_eq!(meta, TableMeta::new(false, false));
    }

    #[test]
    fn flags_follow_configured_names() {
        let config = TableConfig::new().with_soft_delete_column("removed_at");
        let meta = TableMeta::from_columns(&["id", "removed_at", "deleted_at"], &config);
        assert!(meta.soft_deletable);
        let meta = TableMeta::from_columns(&["id", "deleted_at"], &config);
        assert!(!meta.soft_deletable);
    }
}
