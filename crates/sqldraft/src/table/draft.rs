//! The mutable statement draft and its rendering.

use super::BuiltQuery;
use crate::column::{RenderContext, render_column, render_columns};
use crate::condition::{PredicateGroup, render_where};

/// Sort direction for ORDER BY.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    fn to_sql(self) -> &'static str {
        match self {
            SortDir::Asc => "ASC",
            SortDir::Desc => "DESC",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
struct OrderItem {
    column: String,
    /// `None` leaves the direction to the database (ascending).
    dir: Option<SortDir>,
}

/// ORDER BY entries, either a plain column list or column/direction pairs.
///
/// # Example
/// ```ignore
/// use sqldraft::OrderBy;
///
/// let plain = OrderBy::columns(["name", "u.id"]);
/// let explicit = OrderBy::new().desc("created_at").asc("id");
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderBy {
    items: Vec<OrderItem>,
}

impl OrderBy {
    /// Create a new empty OrderBy builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Plain column list in the default direction.
    pub fn columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            items: columns
                .into_iter()
                .map(|c| OrderItem {
                    column: c.into(),
                    dir: None,
                })
                .collect(),
        }
    }

    /// Add a column with an explicit direction.
    pub fn with(mut self, column: impl Into<String>, dir: SortDir) -> Self {
        self.items.push(OrderItem {
            column: column.into(),
            dir: Some(dir),
        });
        self
    }

    /// Append a column in the default direction.
    pub fn then(mut self, column: impl Into<String>) -> Self {
        self.items.push(OrderItem {
            column: column.into(),
            dir: None,
        });
        self
    }

    /// Add an ascending column.
    pub fn asc(self, column: impl Into<String>) -> Self {
        self.with(column, SortDir::Asc)
    }

    /// Add a descending column.
    pub fn desc(self, column: impl Into<String>) -> Self {
        self.with(column, SortDir::Desc)
    }

    /// Check if this OrderBy is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        self.items
            .iter()
            .map(|item| {
                let column = render_column(&item.column, ctx);
                match item.dir {
                    Some(dir) => format!("{} {}", column, dir.to_sql()),
                    None => column,
                }
            })
            .collect()
    }
}

impl<S: Into<String>> FromIterator<(S, SortDir)> for OrderBy {
    fn from_iter<I: IntoIterator<Item = (S, SortDir)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(OrderBy::new(), |order, (column, dir)| order.with(column, dir))
    }
}

/// LIMIT clause: `LIMIT count` or `LIMIT offset, count`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Limit {
    Count(u64),
    OffsetCount { offset: u64, count: u64 },
}

impl Limit {
    fn to_sql(self) -> String {
        match self {
            Limit::Count(count) => format!("LIMIT {count}"),
            Limit::OffsetCount { offset, count } => format!("LIMIT {offset}, {count}"),
        }
    }
}

/// The clauses accumulated for one statement.
///
/// Owned by a [`Table`](super::Table) and emptied by every build.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryDraft {
    selects: Vec<String>,
    joins: Vec<String>,
    groups: Vec<PredicateGroup>,
    group_by: Vec<String>,
    order_by: OrderBy,
    limit: Option<Limit>,
}

impl QueryDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// True when nothing has been added since the last build.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Raw SELECT entries; empty means `*`.
    pub fn selects(&self) -> &[String] {
        &self.selects
    }

    /// Rendered JOIN clauses in registration order.
    pub fn joins(&self) -> &[String] {
        &self.joins
    }

    pub fn groups(&self) -> &[PredicateGroup] {
        &self.groups
    }

    pub fn order_by(&self) -> &OrderBy {
        &self.order_by
    }

    pub(crate) fn push_selects(&mut self, columns: impl IntoIterator<Item = String>) {
        self.selects.extend(columns);
    }

    pub(crate) fn push_join(&mut self, clause: String) {
        self.joins.push(clause);
    }

    pub(crate) fn push_group(&mut self, group: PredicateGroup) {
        self.groups.push(group);
    }

    pub(crate) fn set_group_by(&mut self, columns: Vec<String>) {
        self.group_by = columns;
    }

    pub(crate) fn set_order_by(&mut self, order: OrderBy) {
        self.order_by = order;
    }

    pub(crate) fn set_limit(&mut self, limit: Limit) {
        self.limit = Some(limit);
    }

    /// Whether any predicate tests `column`, bare or qualified by one of `owners`.
    pub fn tests_column(&self, column: &str, owners: &[&str]) -> bool {
        self.groups
            .iter()
            .any(|group| group.tests_column(column, owners))
    }

    /// Take the accumulated clauses, leaving the draft empty.
    pub(crate) fn take(&mut self) -> QueryDraft {
        std::mem::take(self)
    }

    /// Render in fixed order: SELECT, joins, WHERE, GROUP BY, ORDER BY, LIMIT.
    pub(crate) fn render(&self, from: &str, ctx: &RenderContext<'_>) -> BuiltQuery {
        let mut sql = String::from("SELECT ");
        if self.selects.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&render_columns(&self.selects, &ctx.select()).join(", "));
        }
        sql.push_str(" FROM ");
        sql.push_str(from);

        for join in &self.joins {
            sql.push(' ');
            sql.push_str(join);
        }

        let (where_sql, params) = render_where(&self.groups, &ctx.predicate());
        if !where_sql.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&where_sql);
        }

        if !self.group_by.is_empty() {
            sql.push_str(" GROUP BY ");
            sql.push_str(&render_columns(&self.group_by, ctx).join(", "));
        }

        if !self.order_by.is_empty() {
            sql.push_str(" ORDER BY ");
            sql.push_str(&self.order_by.render(ctx).join(", "));
        }

        if let Some(limit) = self.limit {
            sql.push(' ');
            sql.push_str(&limit.to_sql());
        }

        BuiltQuery { sql, params }
    }
}
