//! Embedding related rows through LEFT JOINs and hydrating them back into
//! nested collections.
//!
//! An [`Embed`] wraps the root [`Table`]. Each registered relation adds its
//! joins and projects its fields as `<alias>_<field>`, plus the child key as
//! `<alias>_<pk>` when it is not one of the fields. The result has one row per
//! (root, child) pair, ordered by the root key. [`Embed::hydrate`] groups rows
//! by root key, strips the projected child columns from the root row and
//! decodes each relation's children with its factory.
//!
//! A child repeated across rows (fan-out from another relation) is kept once,
//! identified by its key column. A list-valued cell yields one child per index.
//!
//! # Example
//!
//! ```ignore
//! use sqldraft::{Embed, EmbedTarget, Table, predicates};
//!
//! let mut embed = Embed::new(Table::new("user").with_alias("u"));
//! let cities = embed.add(City::from_row, EmbedTarget::direct("city c"), ["id", "name"])?;
//! let tags = embed.add_model::<Tag>(EmbedTarget::through("user_tag ut", "tag t"))?;
//! embed.and_where(predicates! { "u.id" => 7 });
//!
//! if let Some(mut user) = embed.finish(&client).await? {
//!     let cities: Vec<City> = user.take(&cities).unwrap_or_default();
//!     let tags: Vec<Tag> = user.take(&tags).unwrap_or_default();
//! }
//! ```

use crate::client::GenericClient;
use crate::condition::Predicates;
use crate::error::{DraftError, DraftResult};
use crate::row::{Fields, FromRow, Row};
use crate::table::{BuiltQuery, Table};
use crate::value::Value;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::any::Any;
use std::fmt;
use std::marker::PhantomData;

/// `"name alias"` or `"name"` (the name doubles as alias).
fn split_table(spec: &str) -> (String, String) {
    let mut parts = spec.split_whitespace();
    let name = parts.next().unwrap_or_default().to_string();
    let alias = parts.next().map_or_else(|| name.clone(), str::to_string);
    (name, alias)
}

/// How a child table is reached from the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbedTarget {
    /// Child holds `<root>_id`.
    Direct { table: String, alias: String },
    /// Junction holds `<root>_id` and `<child>_id`.
    Through {
        junction: String,
        junction_alias: String,
        table: String,
        alias: String,
    },
}

impl EmbedTarget {
    /// `EmbedTarget::direct("city c")`
    pub fn direct(table: &str) -> Self {
        let (table, alias) = split_table(table);
        EmbedTarget::Direct { table, alias }
    }

    /// `EmbedTarget::through("user_tag ut", "tag t")`
    pub fn through(junction: &str, table: &str) -> Self {
        let (junction, junction_alias) = split_table(junction);
        let (table, alias) = split_table(table);
        EmbedTarget::Through {
            junction,
            junction_alias,
            table,
            alias,
        }
    }

    pub fn table(&self) -> &str {
        match self {
            EmbedTarget::Direct { table, .. } | EmbedTarget::Through { table, .. } => table,
        }
    }

    pub fn alias(&self) -> &str {
        match self {
            EmbedTarget::Direct { alias, .. } | EmbedTarget::Through { alias, .. } => alias,
        }
    }
}

type DecodeFn = Box<dyn Fn(&[Row]) -> DraftResult<Box<dyn Any + Send>> + Send + Sync>;

/// One registered child relation.
pub struct EmbedSpec {
    target: EmbedTarget,
    fields: Vec<String>,
    decode: DecodeFn,
}

impl EmbedSpec {
    pub fn target(&self) -> &EmbedTarget {
        &self.target
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Key of the hydrated collection: `<childtable>s`.
    pub fn collection_key(&self) -> String {
        format!("{}s", self.target.table())
    }

    fn column(&self, field: &str) -> String {
        format!("{}_{}", self.target.alias(), field)
    }
}

impl fmt::Debug for EmbedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbedSpec")
            .field("target", &self.target)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Typed handle to a registered relation, used to read its collection back.
pub struct Relation<T> {
    index: usize,
    key: String,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Relation<T> {
    /// Key of the hydrated collection.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl<T> Clone for Relation<T> {
    fn clone(&self) -> Self {
        Self {
            index: self.index,
            key: self.key.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Relation<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Relation")
            .field("index", &self.index)
            .field("key", &self.key)
            .finish()
    }
}

struct Collection {
    index: usize,
    key: String,
    rows: Vec<Row>,
    items: Box<dyn Any + Send>,
}

/// One hydrated root row with its child collections.
///
/// Relations with no children have no collection.
pub struct Embedded {
    root: Row,
    collections: Vec<Collection>,
}

impl Embedded {
    /// Root columns, without the projected child columns.
    pub fn root(&self) -> &Row {
        &self.root
    }

    pub fn into_root(self) -> Row {
        self.root
    }

    /// Collection keys in relation order.
    pub fn collection_keys(&self) -> impl Iterator<Item = &str> {
        self.collections.iter().map(|c| c.key.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.collections.iter().any(|c| c.key == key)
    }

    /// Decoded field rows of a collection, before the factory ran.
    pub fn rows(&self, key: &str) -> Option<&[Row]> {
        self.collections
            .iter()
            .find(|c| c.key == key)
            .map(|c| c.rows.as_slice())
    }

    /// Borrow a relation's children.
    pub fn get<T: 'static>(&self, relation: &Relation<T>) -> Option<&[T]> {
        self.collections
            .iter()
            .find(|c| c.index == relation.index)
            .and_then(|c| c.items.downcast_ref::<Vec<T>>())
            .map(Vec::as_slice)
    }

    /// Take a relation's children out, leaving its field rows in place.
    pub fn take<T: 'static>(&mut self, relation: &Relation<T>) -> Option<Vec<T>> {
        let collection = self
            .collections
            .iter_mut()
            .find(|c| c.index == relation.index)?;
        let items = std::mem::replace(&mut collection.items, Box::new(()));
        match items.downcast::<Vec<T>>() {
            Ok(items) => Some(*items),
            Err(items) => {
                collection.items = items;
                None
            }
        }
    }

    /// JSON object of the root columns plus one array per collection.
    pub fn to_json(&self) -> DraftResult<String> {
        Ok(serde_json::to_string(self)?)
    }
}

impl Serialize for Embedded {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.root.len() + self.collections.len()))?;
        for (name, value) in self.root.iter() {
            map.serialize_entry(name, value)?;
        }
        for collection in &self.collections {
            map.serialize_entry(&collection.key, &collection.rows)?;
        }
        map.end()
    }
}

impl fmt::Debug for Embedded {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let collections: Vec<(&str, usize)> = self
            .collections
            .iter()
            .map(|c| (c.key.as_str(), c.rows.len()))
            .collect();
        f.debug_struct("Embedded")
            .field("root", &self.root)
            .field("collections", &collections)
            .finish()
    }
}

/// Root table plus the child relations joined into it.
#[derive(Debug)]
pub struct Embed {
    table: Table,
    specs: Vec<EmbedSpec>,
}

impl Embed {
    pub fn new(table: Table) -> Self {
        Self {
            table,
            specs: Vec::new(),
        }
    }

    pub fn table(&self) -> &Table {
        &self.table
    }

    /// The root table, for adding filters, limits or extra selects.
    pub fn table_mut(&mut self) -> &mut Table {
        &mut self.table
    }

    pub fn specs(&self) -> &[EmbedSpec] {
        &self.specs
    }

    /// Register a child relation decoded by `factory` from its `fields`.
    ///
    /// The factory receives a row keyed by the plain field names.
    pub fn add<T, F, I, S>(
        &mut self,
        factory: F,
        target: EmbedTarget,
        fields: I,
    ) -> DraftResult<Relation<T>>
    where
        T: Send + 'static,
        F: Fn(&Row) -> DraftResult<T> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let fields: Vec<String> = fields.into_iter().map(Into::into).collect();
        if fields.is_empty() {
            return Err(DraftError::validation(format!(
                "embedded relation `{}` needs at least one field",
                target.table()
            )));
        }

        let decode: DecodeFn = Box::new(move |rows: &[Row]| {
            let items = rows.iter().map(&factory).collect::<DraftResult<Vec<T>>>()?;
            Ok(Box::new(items) as Box<dyn Any + Send>)
        });
        let spec = EmbedSpec {
            target,
            fields,
            decode,
        };
        let relation = Relation {
            index: self.specs.len(),
            key: spec.collection_key(),
            _marker: PhantomData,
        };
        self.specs.push(spec);
        Ok(relation)
    }

    /// Register a child relation from a type's derived field list.
    pub fn add_model<T>(&mut self, target: EmbedTarget) -> DraftResult<Relation<T>>
    where
        T: FromRow + Fields + Send + 'static,
    {
        self.add(T::from_row, target, T::FIELDS.iter().copied())
    }

    /// Filter the root table (combined with `AND`).
    pub fn and_where(&mut self, predicates: Predicates) -> &mut Self {
        self.table.and_where(predicates);
        self
    }

    /// Filter the root table (combined with `OR`).
    pub fn or_where(&mut self, predicates: Predicates) -> &mut Self {
        self.table.or_where(predicates);
        self
    }

    /// Add the joins, projections and root ordering, then build.
    ///
    /// The root key is ordered after any ordering already on the root table.
    pub fn build(&mut self) -> BuiltQuery {
        let root_name = self.table.name().to_string();
        let root_ref = self.table.table_ref().to_string();
        let root_qualifier = self.table.qualifier();
        let pk = self.table.config().primary_key.clone();

        let mut selects = vec![format!("{root_ref}.*")];
        let order = self.table.draft().order_by().clone();
        for spec in &self.specs {
            match &spec.target {
                EmbedTarget::Direct { table, alias } => {
                    self.table.left_join(
                        &format!("{table} {alias}"),
                        &format!("{alias}.{root_name}_id"),
                        &format!("{root_qualifier}.{pk}"),
                    );
                }
                EmbedTarget::Through {
                    junction,
                    junction_alias,
                    table,
                    alias,
                } => {
                    self.table
                        .left_join(
                            &format!("{junction} {junction_alias}"),
                            &format!("{junction_alias}.{root_name}_id"),
                            &format!("{root_qualifier}.{pk}"),
                        )
                        .left_join(
                            &format!("{table} {alias}"),
                            &format!("{alias}.{pk}"),
                            &format!("{junction_alias}.{table}_id"),
                        );
                }
            }
            let alias = spec.target.alias();
            selects.extend(
                spec.fields
                    .iter()
                    .map(|field| format!("{alias}.{field} {}", spec.column(field))),
            );
            if !spec.fields.contains(&pk) {
                selects.push(format!("{alias}.{pk} {}", spec.column(&pk)));
            }
        }

        self.table
            .select(selects)
            .order_by(order.then(format!("{root_ref}.{pk}")))
            .build()
    }

    /// Fetch and hydrate the first root, if any.
    ///
    /// Every returned row is hydrated before the first root is picked; add a
    /// root filter to keep the result small.
    pub async fn finish(&mut self, client: &impl GenericClient) -> DraftResult<Option<Embedded>> {
        Ok(self.finish_all(client).await?.into_iter().next())
    }

    /// Fetch and hydrate every root.
    pub async fn finish_all(&mut self, client: &impl GenericClient) -> DraftResult<Vec<Embedded>> {
        let query = self.build();
        let rows = client.query(&query.sql, &query.params).await?;
        self.hydrate(rows)
    }

    /// Group flattened rows by root key and decode each relation's children.
    pub fn hydrate(&self, rows: Vec<Row>) -> DraftResult<Vec<Embedded>> {
        let pk = &self.table.config().primary_key;
        let row_count = rows.len();

        let mut groups: Vec<(Value, Vec<Row>)> = Vec::new();
        for row in rows {
            let key = row
                .get(pk)
                .cloned()
                .ok_or_else(|| DraftError::decode(pk.as_str(), "root key missing from row"))?;
            // Rows arrive ordered by root key; the scan covers unordered input.
            let slot = match groups.last() {
                Some((last, _)) if *last == key => Some(groups.len() - 1),
                _ => groups.iter().position(|(existing, _)| *existing == key),
            };
            match slot {
                Some(i) => groups[i].1.push(row),
                None => groups.push((key, vec![row])),
            }
        }

        let embedded = groups
            .into_iter()
            .map(|(_, rows)| self.hydrate_root(rows))
            .collect::<DraftResult<Vec<_>>>()?;
        tracing::debug!(
            table = %self.table.name(),
            rows = row_count,
            roots = embedded.len(),
            relations = self.specs.len(),
            "hydrated embedded rows"
        );
        Ok(embedded)
    }

    fn hydrate_root(&self, rows: Vec<Row>) -> DraftResult<Embedded> {
        let pk = &self.table.config().primary_key;
        let mut collections = Vec::new();
        for (index, spec) in self.specs.iter().enumerate() {
            let key_column = spec.column(pk);
            let mut seen: Vec<&Value> = Vec::new();
            let mut children: Vec<Row> = Vec::new();
            for row in &rows {
                let key = row
                    .get(&key_column)
                    .filter(|k| !k.is_null() && k.as_list().is_none());
                if let Some(key) = key {
                    if seen.contains(&key) {
                        continue;
                    }
                    seen.push(key);
                }
                children.extend(child_rows(spec, &key_column, row));
            }
            if children.is_empty() {
                continue;
            }
            let items = (spec.decode)(&children)?;
            collections.push(Collection {
                index,
                key: spec.collection_key(),
                rows: children,
                items,
            });
        }

        let mut root = rows.into_iter().next().unwrap_or_default();
        for spec in &self.specs {
            for field in &spec.fields {
                root.remove(&spec.column(field));
            }
            root.remove(&spec.column(pk));
        }
        Ok(Embedded { root, collections })
    }
}

/// Children one flattened row holds for a relation.
///
/// Presence is read from the key column, or from the first field when the row
/// has no key column. NULL means none. A list-valued cell holds one child per
/// index, read from parallel lists in the fields.
fn child_rows(spec: &EmbedSpec, key_column: &str, row: &Row) -> Vec<Row> {
    let marker = match row.get(key_column) {
        Some(key) => Some(key),
        None => spec.fields.first().and_then(|first| row.get(&spec.column(first))),
    };
    match marker {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::List(items)) => (0..items.len())
            .map(|i| {
                spec.fields
                    .iter()
                    .map(|field| {
                        let value = match row.get(&spec.column(field)) {
                            Some(Value::List(values)) => {
                                values.get(i).cloned().unwrap_or(Value::Null)
                            }
                            Some(scalar) => scalar.clone(),
                            None => Value::Null,
                        };
                        (field.clone(), value)
                    })
                    .collect()
            })
            .collect(),
        Some(_) => vec![
            spec.fields
                .iter()
                .map(|field| {
                    let value = row.get(&spec.column(field)).cloned().unwrap_or(Value::Null);
                    (field.clone(), value)
                })
                .collect(),
        ],
    }
}
