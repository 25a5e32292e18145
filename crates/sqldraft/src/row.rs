//! Row type and row mapping traits

use crate::error::{DraftError, DraftResult};
use crate::value::{FromValue, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};

/// One result row: an ordered mapping from column name to [`Value`].
///
/// Column order is the order the client returned them in. Duplicate names are
/// the caller's responsibility (alias joined columns).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, or overwrite it in place when the name already exists.
    pub fn insert(&mut self, column: impl Into<String>, value: impl Into<Value>) {
        let column = column.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(name, _)| *name == column) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((column, value)),
        }
    }

    /// Chainable [`Row::insert`].
    pub fn with(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.columns
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
    }

    /// Value at a column position.
    pub fn get_index(&self, index: usize) -> Option<&Value> {
        self.columns.get(index).map(|(_, value)| value)
    }

    /// Remove a column, returning its value.
    pub fn remove(&mut self, column: &str) -> Option<Value> {
        let pos = self.columns.iter().position(|(name, _)| name == column)?;
        Some(self.columns.remove(pos).1)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Split off the first column, leaving the rest of the row.
    pub fn split_first(mut self) -> Option<(Value, Row)> {
        if self.columns.is_empty() {
            return None;
        }
        let (_, first) = self.columns.remove(0);
        Some((first, self))
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut row = Row::new();
        for (k, v) in iter {
            row.insert(k, v);
        }
        row
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.columns.into_iter()
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, value) in &self.columns {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Trait for converting a result row into a Rust struct.
///
/// This trait should typically be derived using `#[derive(FromRow)]`
/// from the `sqldraft-derive` crate.
///
/// # Example
///
/// ```ignore
/// use sqldraft::FromRow;
///
/// #[derive(FromRow)]
/// struct City {
///     id: i64,
///     name: String,
/// }
/// ```
pub trait FromRow: Sized {
    /// Convert a row into Self
    fn from_row(row: &Row) -> DraftResult<Self>;
}

impl FromRow for Row {
    fn from_row(row: &Row) -> DraftResult<Self> {
        Ok(row.clone())
    }
}

/// Extension trait for Row to provide typed access
pub trait RowExt {
    /// Try to get a column value, returning DraftError::Decode on failure
    fn try_get_column<T: FromValue>(&self, column: &str) -> DraftResult<T>;
}

impl RowExt for Row {
    fn try_get_column<T: FromValue>(&self, column: &str) -> DraftResult<T> {
        let value = self
            .get(column)
            .ok_or_else(|| DraftError::decode(column, "column not found"))?;
        T::from_value(value).map_err(|message| DraftError::decode(column, message))
    }
}

/// Ordered list of column names a type decodes from.
///
/// Derive with `#[derive(Fields)]`; used to register embed relations from a type alone.
pub trait Fields {
    const FIELDS: &'static [&'static str];
}
