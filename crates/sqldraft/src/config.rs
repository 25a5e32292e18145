//! Per-table configuration.
//!
//! Column-name conventions and the SQL dialect live here instead of being
//! hard-coded, so a schema that names its soft-delete column `removed_at` or
//! runs on SQLite only needs a different [`TableConfig`].
//!
//! ```toml
//! dialect = "sqlite"
//! soft_delete_column = "removed_at"
//! known_aliases = ["u", "c"]
//! ```

use crate::error::DraftResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// SQL dialect. Identifiers are backtick-quoted in both; only a few statement
/// forms differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    #[default]
    #[serde(alias = "mariadb")]
    Mysql,
    Sqlite,
}

impl Dialect {
    /// Statement prefix for an insert that skips conflicting rows.
    pub fn insert_ignore_prefix(&self) -> &'static str {
        match self {
            Dialect::Mysql => "INSERT IGNORE INTO",
            Dialect::Sqlite => "INSERT OR IGNORE INTO",
        }
    }

    /// Statement listing a table's columns.
    pub fn describe_sql(&self, quoted_table: &str) -> String {
        match self {
            Dialect::Mysql => format!("DESCRIBE {quoted_table}"),
            Dialect::Sqlite => format!("PRAGMA table_info({quoted_table})"),
        }
    }

    /// Column of the describe result that holds the column name.
    pub fn describe_name_column(&self) -> &'static str {
        match self {
            Dialect::Mysql => "Field",
            Dialect::Sqlite => "name",
        }
    }
}

/// Naming conventions and dialect for one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    pub dialect: Dialect,
    /// Nullable timestamp column marking a row as deleted.
    pub soft_delete_column: String,
    pub created_at_column: String,
    pub updated_at_column: String,
    /// Root key used by embedding (`<alias>.id`, `<root>_id`).
    pub primary_key: String,
    /// Table aliases that stay unquoted as qualifiers.
    pub known_aliases: Vec<String>,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::default(),
            soft_delete_column: "deleted_at".to_string(),
            created_at_column: "created_at".to_string(),
            updated_at_column: "updated_at".to_string(),
            primary_key: "id".to_string(),
            known_aliases: Vec::new(),
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a configuration from TOML; missing keys take their defaults.
    pub fn from_toml_str(s: &str) -> DraftResult<Self> {
        Ok(toml::from_str(s)?)
    }

    /// Read and parse a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> DraftResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn with_soft_delete_column(mut self, column: impl Into<String>) -> Self {
        self.soft_delete_column = column.into();
        self
    }

    pub fn with_timestamp_columns(
        mut self,
        created_at: impl Into<String>,
        updated_at: impl Into<String>,
    ) -> Self {
        self.created_at_column = created_at.into();
        self.updated_at_column = updated_at.into();
        self
    }

    pub fn with_primary_key(mut self, column: impl Into<String>) -> Self {
        self.primary_key = column.into();
        self
    }

    pub fn with_known_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_aliases.extend(aliases.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = TableConfig::new();
        assert_eq!(config.dialect, Dialect::Mysql);
        assert_eq!(config.soft_delete_column, "deleted_at");
        assert_eq!(config.primary_key, "id");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = TableConfig::from_toml_str(
            r#"
            dialect = "sqlite"
            soft_delete_column = "removed_at"
            known_aliases = ["u", "c"]
            "#,
        )
        .unwrap();
        assert_eq!(config.dialect, Dialect::Sqlite);
        assert_eq!(config.soft_delete_column, "removed_at");
        assert_eq!(config.created_at_column, "created_at");
        assert_eq!(config.known_aliases, ["u", "c"]);
    }

    #[test]
    fn bad_toml_is_config_error() {
        let err = TableConfig::from_toml_str("dialect = \"oracle\"").unwrap_err();
        assert!(matches!(err, crate::DraftError::Config(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = TableConfig::load("/nonexistent/sqldraft.toml").unwrap_err();
        assert!(matches!(err, crate::DraftError::Io(_)));
    }

    #[test]
    fn dialect_statements() {
        assert_eq!(Dialect::Mysql.insert_ignore_prefix(), "INSERT IGNORE INTO");
        assert_eq!(Dialect::Sqlite.insert_ignore_prefix(), "INSERT OR IGNORE INTO");
        assert_eq!(Dialect::Sqlite.describe_sql("`user`"), "PRAGMA table_info(`user`)");
    }
}
