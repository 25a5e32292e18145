//! Predicates and predicate groups for WHERE clauses.
//!
//! A [`Predicates`] value is an ordered list of column tests. Appending it to a
//! table draft turns it into one [`PredicateGroup`] combined with either `AND`
//! or `OR`. Groups are joined to each other with `AND`, and `OR` groups are
//! parenthesized.
//!
//! Parameters are collected in the same walk that emits `?` placeholders, so
//! the parameter list always lines up with the placeholders left to right.
//!
//! # Example
//! ```ignore
//! use sqldraft::{op, predicates};
//!
//! users.and_where(predicates! {
//!     "name" => "foo bar",
//!     "username" => op("LIKE", "foo%"),
//!     "deleted_at" => sqldraft::Value::Null,
//!     "role_id" => vec![1, 2, 3],
//! });
//! ```

use crate::column::{RenderContext, render_column};
use crate::value::Value;
use chrono::NaiveDateTime;

/// How the predicates of one group are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Logic {
    #[default]
    And,
    Or,
}

impl Logic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Logic::And => "AND",
            Logic::Or => "OR",
        }
    }
}

/// The right-hand side of one column test.
///
/// A plain value picks its operator from its shape: NULL tests with `IS`, a
/// list tests membership with `IN`, anything else compares with `=`.
/// [`op`] supplies an explicit operator instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(Value),
    Op { operator: String, value: Value },
}

/// Wrap a value with an explicit operator, e.g. `op("LIKE", "foo%")`.
pub fn op(operator: impl Into<String>, value: impl Into<Value>) -> Operand {
    Operand::Op {
        operator: operator.into(),
        value: value.into(),
    }
}

impl From<Value> for Operand {
    fn from(v: Value) -> Self {
        Operand::Value(v)
    }
}

macro_rules! impl_operand_from {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Operand {
                fn from(v: $t) -> Self {
                    Operand::Value(Value::from(v))
                }
            }
        )*
    };
}

impl_operand_from!(bool, i32, i64, u32, f64, &str, String, NaiveDateTime, uuid::Uuid);

impl<T: Into<Value>> From<Option<T>> for Operand {
    fn from(v: Option<T>) -> Self {
        Operand::Value(Value::from(v))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Operand {
    fn from(v: Vec<T>) -> Self {
        Operand::Value(Value::from(v))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Operand {
    fn from(v: [T; N]) -> Self {
        Operand::Value(Value::from(v))
    }
}

/// One column test: `column operator value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Predicate {
    /// Raw column, escaped at render time.
    pub column: String,
    pub operator: String,
    pub value: Value,
}

impl Predicate {
    pub fn new(column: impl Into<String>, operand: impl Into<Operand>) -> Self {
        let column = column.into();
        match operand.into() {
            Operand::Value(value) => {
                let operator = match value {
                    Value::Null => "IS",
                    Value::List(_) => "IN",
                    _ => "=",
                };
                Self {
                    column,
                    operator: operator.to_string(),
                    value,
                }
            }
            Operand::Op { operator, value } => Self {
                column,
                operator: operator.trim().to_string(),
                value,
            },
        }
    }

    /// Render as SQL, pushing bound values onto `params` in placeholder order.
    pub fn render(&self, ctx: &RenderContext<'_>, params: &mut Vec<Value>) -> String {
        let column = render_column(&self.column, ctx);
        let upper = self.operator.to_ascii_uppercase();

        match (&self.value, upper.as_str()) {
            // Empty membership tests have no placeholders at all.
            (Value::List(items), "IN") if items.is_empty() => "1=0".to_string(),
            (Value::List(items), "NOT IN") if items.is_empty() => "1=1".to_string(),
            (Value::List(items), "BETWEEN" | "NOT BETWEEN") if items.len() == 2 => {
                params.extend(items.iter().cloned());
                format!("{} {} ? AND ?", column, self.operator)
            }
            (Value::List(items), _) => {
                params.extend(items.iter().cloned());
                let placeholders = vec!["?"; items.len()].join(", ");
                format!("{} {} ({})", column, self.operator, placeholders)
            }
            (Value::Null, "IS" | "IS NOT") => format!("{} {} NULL", column, self.operator),
            (value, "IN" | "NOT IN") => {
                params.push(value.clone());
                format!("{} {} (?)", column, self.operator)
            }
            (value, _) => {
                params.push(value.clone());
                format!("{} {} ?", column, self.operator)
            }
        }
    }

    /// Number of placeholders this predicate emits.
    pub fn placeholder_count(&self) -> usize {
        let upper = self.operator.to_ascii_uppercase();
        match (&self.value, upper.as_str()) {
            (Value::List(items), _) => items.len(),
            (Value::Null, "IS" | "IS NOT") => 0,
            _ => 1,
        }
    }
}

/// An ordered list of column tests, built before being appended to a draft.
///
/// Entries are kept as a list, so testing the same column twice keeps both tests.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Predicates {
    entries: Vec<Predicate>,
}

impl Predicates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a column test; the operator follows the operand's shape.
    pub fn with(mut self, column: impl Into<String>, operand: impl Into<Operand>) -> Self {
        self.entries.push(Predicate::new(column, operand));
        self
    }

    /// Add: column = value (NULL becomes `IS NULL`)
    pub fn eq(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, Operand::Value(value.into()))
    }

    /// Add: column != value
    pub fn ne(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, op("!=", value))
    }

    /// Add: column > value
    pub fn gt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, op(">", value))
    }

    /// Add: column >= value
    pub fn gte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, op(">=", value))
    }

    /// Add: column < value
    pub fn lt(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, op("<", value))
    }

    /// Add: column <= value
    pub fn lte(self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with(column, op("<=", value))
    }

    /// Add: column LIKE pattern
    pub fn like(self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.with(column, op("LIKE", pattern))
    }

    /// Add: column NOT LIKE pattern
    pub fn not_like(self, column: impl Into<String>, pattern: impl Into<Value>) -> Self {
        self.with(column, op("NOT LIKE", pattern))
    }

    /// Add: column IN (values...)
    pub fn in_list<T: Into<Value>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.with(column, op("IN", Value::List(values)))
    }

    /// Add: column NOT IN (values...)
    pub fn not_in<T: Into<Value>>(
        self,
        column: impl Into<String>,
        values: impl IntoIterator<Item = T>,
    ) -> Self {
        let values: Vec<Value> = values.into_iter().map(Into::into).collect();
        self.with(column, op("NOT IN", Value::List(values)))
    }

    /// Add: column BETWEEN from AND to
    pub fn between(
        self,
        column: impl Into<String>,
        from: impl Into<Value>,
        to: impl Into<Value>,
    ) -> Self {
        self.with(
            column,
            op("BETWEEN", Value::List(vec![from.into(), to.into()])),
        )
    }

    /// Add: column IS NULL
    pub fn is_null(self, column: impl Into<String>) -> Self {
        self.with(column, Value::Null)
    }

    /// Add: column IS NOT NULL
    pub fn is_not_null(self, column: impl Into<String>) -> Self {
        self.with(column, op("IS NOT", Value::Null))
    }

    /// Add a pre-built predicate.
    pub fn push(&mut self, predicate: Predicate) {
        self.entries.push(predicate);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Predicate> {
        self.entries.iter()
    }

    /// Columns and values, in order (used for UPDATE SET lists and INSERT rows).
    pub(crate) fn into_entries(self) -> Vec<Predicate> {
        self.entries
    }
}

impl<K: Into<String>, O: Into<Operand>> FromIterator<(K, O)> for Predicates {
    fn from_iter<I: IntoIterator<Item = (K, O)>>(iter: I) -> Self {
        let mut preds = Predicates::new();
        for (column, operand) in iter {
            preds.push(Predicate::new(column, operand));
        }
        preds
    }
}

/// Build [`Predicates`] from `column => operand` pairs.
///
/// ```ignore
/// let preds = sqldraft::predicates! { "name" => "foo", "age" => sqldraft::op(">", 18) };
/// ```
#[macro_export]
macro_rules! predicates {
    () => { $crate::Predicates::new() };
    ($($column:expr => $operand:expr),+ $(,)?) => {
        $crate::Predicates::new()$(.with($column, $operand))+
    };
}

/// Predicates sharing one combining operator.
#[derive(Debug, Clone, PartialEq)]
pub struct PredicateGroup {
    pub logic: Logic,
    pub predicates: Vec<Predicate>,
}

impl PredicateGroup {
    pub fn new(predicates: Predicates, logic: Logic) -> Self {
        Self {
            logic,
            predicates: predicates.into_entries(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.predicates.is_empty()
    }

    /// Whether any predicate tests `column` on one of `owners`.
    ///
    /// An unqualified predicate column belongs to every owner; a qualified one
    /// only matches when its qualifier (backticks trimmed) is in `owners`.
    pub fn tests_column(&self, column: &str, owners: &[&str]) -> bool {
        self.predicates.iter().any(|p| {
            let (qualifier, name) = split_qualified(&p.column);
            name == column && qualifier.is_none_or(|q| owners.contains(&q))
        })
    }

    /// Render the group; OR groups come back parenthesized.
    pub fn render(&self, ctx: &RenderContext<'_>, params: &mut Vec<Value>) -> String {
        let parts: Vec<String> = self
            .predicates
            .iter()
            .map(|p| p.render(ctx, params))
            .collect();
        let joined = parts.join(&format!(" {} ", self.logic.as_str()));
        match self.logic {
            Logic::Or => format!("({})", joined),
            Logic::And => joined,
        }
    }
}

/// Render all groups as one WHERE body (without the `WHERE` keyword).
///
/// Returns an empty string and no parameters when there is nothing to render.
pub fn render_where(groups: &[PredicateGroup], ctx: &RenderContext<'_>) -> (String, Vec<Value>) {
    let mut params = Vec::new();
    let parts: Vec<String> = groups
        .iter()
        .filter(|g| !g.is_empty())
        .map(|g| g.render(ctx, &mut params))
        .collect();
    (parts.join(" AND "), params)
}

/// `` `user`.`deleted_at` `` splits into `(Some("user"), "deleted_at")`.
fn split_qualified(column: &str) -> (Option<&str>, &str) {
    fn unquote(part: &str) -> &str {
        part.trim().trim_matches('`')
    }
    match column.trim().rsplit_once('.') {
        Some((qualifier, name)) => (Some(unquote(qualifier)), unquote(name)),
        None => (None, unquote(column)),
    }
}
