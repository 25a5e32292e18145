//! Fluent statement builder for one table.
//!
//! A [`Table`] owns a [`QueryDraft`]. Chained mutators add clauses to the
//! draft and [`Table::build`] renders SQL and parameters together, then empties
//! the draft so the same handle can build the next statement.
//!
//! # Example
//!
//! ```ignore
//! use sqldraft::{OrderBy, Table, predicates};
//!
//! let mut users = Table::new("user").with_alias("u").with_known_aliases(["c"]);
//! let query = users
//!     .select(["u.name", "c.name"])
//!     .left_join("city c", "c.id", "u.city_id")
//!     .and_where(predicates! { "u.active" => true })
//!     .order_by(OrderBy::new().desc("u.created_at"))
//!     .limit(10)
//!     .build();
//!
//! assert_eq!(query.params.len(), 1);
//! ```

mod draft;
mod fetch;
mod mutate;

#[cfg(test)]
mod tests;

pub use draft::{Limit, OrderBy, QueryDraft, SortDir};

use crate::column::RenderContext;
use crate::condition::{Logic, PredicateGroup, Predicates};
use crate::config::TableConfig;
use crate::error::DraftResult;
use crate::ident;
use crate::schema::{MetadataProvider, TableMeta};
use crate::value::Value;
use std::collections::BTreeSet;

/// A rendered statement with one parameter per `?` placeholder, in order.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltQuery {
    pub sql: String,
    pub params: Vec<Value>,
}

impl BuiltQuery {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    pub fn params(&self) -> &[Value] {
        &self.params
    }

    pub fn into_parts(self) -> (String, Vec<Value>) {
        (self.sql, self.params)
    }
}

/// Statement builder bound to one table.
#[derive(Debug, Clone)]
pub struct Table {
    name: String,
    alias: Option<String>,
    known_aliases: BTreeSet<String>,
    meta: TableMeta,
    config: TableConfig,
    draft: QueryDraft,
}

impl Table {
    /// A table with no alias, default config and no timestamp/soft-delete behavior.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: None,
            known_aliases: BTreeSet::new(),
            meta: TableMeta::default(),
            config: TableConfig::default(),
            draft: QueryDraft::new(),
        }
    }

    /// Set the table alias; it also becomes a known alias.
    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        let alias = alias.into();
        self.known_aliases.insert(alias.clone());
        self.alias = Some(alias);
        self
    }

    /// Register aliases of other tables that stay unquoted as qualifiers.
    pub fn with_known_aliases<I, S>(mut self, aliases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.known_aliases
            .extend(aliases.into_iter().map(Into::into));
        self
    }

    pub fn with_meta(mut self, meta: TableMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Apply a config; its known aliases are added to the table's.
    pub fn with_config(mut self, config: TableConfig) -> Self {
        self.known_aliases
            .extend(config.known_aliases.iter().cloned());
        self.config = config;
        self
    }

    /// Ask a metadata provider for this table's flags.
    pub async fn introspect<P: MetadataProvider>(mut self, provider: &P) -> DraftResult<Self> {
        self.meta = provider.table_meta(&self.name, &self.config).await?;
        tracing::debug!(
            table = %self.name,
            timestampable = self.meta.timestampable,
            soft_deletable = self.meta.soft_deletable,
            "table metadata loaded"
        );
        Ok(self)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn alias(&self) -> Option<&str> {
        self.alias.as_deref()
    }

    /// The alias, or the bare name when there is none.
    pub fn table_ref(&self) -> &str {
        self.alias.as_deref().unwrap_or(&self.name)
    }

    /// How other clauses refer to this table: the alias, or the quoted name.
    pub fn qualifier(&self) -> String {
        match &self.alias {
            Some(alias) => alias.clone(),
            None => ident::quote(&self.name),
        }
    }

    pub fn meta(&self) -> TableMeta {
        self.meta
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn known_aliases(&self) -> &BTreeSet<String> {
        &self.known_aliases
    }

    /// The clauses accumulated since the last build.
    pub fn draft(&self) -> &QueryDraft {
        &self.draft
    }

    // ==================== Mutators ====================

    /// Append SELECT columns. With none added, the statement selects `*`.
    pub fn select<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft
            .push_selects(columns.into_iter().map(Into::into));
        self
    }

    /// Append a predicate group combined with `AND`.
    pub fn and_where(&mut self, predicates: Predicates) -> &mut Self {
        self.where_group(predicates, Logic::And)
    }

    /// Append a predicate group combined with `OR`.
    pub fn or_where(&mut self, predicates: Predicates) -> &mut Self {
        self.where_group(predicates, Logic::Or)
    }

    /// Append a predicate group with an explicit combining operator.
    pub fn where_group(&mut self, predicates: Predicates, logic: Logic) -> &mut Self {
        self.draft.push_group(PredicateGroup::new(predicates, logic));
        self
    }

    /// Append `LEFT JOIN `name` alias ON on_left = on_right`.
    ///
    /// `table` is `"name"` or `"name alias"`; the alias becomes known. The ON
    /// operands are copied verbatim.
    pub fn left_join(&mut self, table: &str, on_left: &str, on_right: &str) -> &mut Self {
        let mut parts = table.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let mut clause = format!("LEFT JOIN {}", ident::quote(name));
        if let Some(alias) = parts.next() {
            clause.push(' ');
            clause.push_str(alias);
            self.known_aliases.insert(alias.to_string());
        }
        clause.push_str(&format!(" ON {on_left} = {on_right}"));
        self.draft.push_join(clause);
        self
    }

    /// Set GROUP BY columns.
    pub fn group_by<I, S>(&mut self, columns: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.draft
            .set_group_by(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set ORDER BY entries.
    pub fn order_by(&mut self, order: OrderBy) -> &mut Self {
        self.draft.set_order_by(order);
        self
    }

    /// `LIMIT count`
    pub fn limit(&mut self, count: u64) -> &mut Self {
        self.draft.set_limit(Limit::Count(count));
        self
    }

    /// `LIMIT offset, count`
    pub fn limit_offset(&mut self, offset: u64, count: u64) -> &mut Self {
        self.draft.set_limit(Limit::OffsetCount { offset, count });
        self
    }

    /// Select `COUNT(*)`, aliased `<alias>_count`.
    pub fn count(&mut self) -> &mut Self {
        self.select(["COUNT(*)"])
    }

    // ==================== Build ====================

    /// Render the draft and reset it.
    ///
    /// A soft-deletable table gets `<table>.<deleted_at> IS NULL` unless the
    /// draft already tests that column on this table (bare, or qualified by
    /// its alias or name). Tests on a joined table's column don't count.
    pub fn build(&mut self) -> BuiltQuery {
        let mut draft = self.draft.take();

        let soft_delete = &self.config.soft_delete_column;
        let owners: Vec<&str> = self
            .alias
            .as_deref()
            .into_iter()
            .chain([self.name.as_str()])
            .collect();
        if self.meta.soft_deletable && !draft.tests_column(soft_delete, &owners) {
            let column = format!("{}.{}", self.table_ref(), soft_delete);
            tracing::trace!(target: "sqldraft.sql", %column, "excluding soft-deleted rows");
            draft.push_group(PredicateGroup::new(
                Predicates::new().is_null(column),
                Logic::And,
            ));
        }

        let from = match &self.alias {
            Some(alias) => format!("{} {}", ident::quote(&self.name), alias),
            None => ident::quote(&self.name),
        };
        draft.render(&from, &self.render_context())
    }

    pub(crate) fn render_context(&self) -> RenderContext<'_> {
        RenderContext::new(&self.known_aliases, self.table_ref())
    }
}
