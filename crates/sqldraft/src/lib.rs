//! # sqldraft
//!
//! A fluent, mutable SQL query builder for MySQL and SQLite, with a join-based
//! engine that hydrates flattened rows back into nested collections.
//!
//! ## Features
//!
//! - **Fluent drafts**: chain `select`, `and_where`, `left_join`, `order_by`, `limit` on a [`Table`]
//! - **Atomic build**: [`Table::build`] returns SQL and parameters together and resets the draft
//! - **Column parsing**: a small tokenizer/parser quotes identifiers and auto-aliases aggregates
//! - **Embedding**: [`Embed`] joins child tables and decodes them with typed factories
//! - **Schema conventions**: timestamp columns and soft-delete handled from [`TableMeta`]
//! - **Bring your own driver**: everything runs through the [`GenericClient`] trait
//! - **Query logging**: [`monitor::TracingClient`] logs every statement via `tracing`
//!
//! ## Building queries
//!
//! ```ignore
//! use sqldraft::{Table, op, predicates};
//!
//! let mut users = Table::new("user").with_alias("u").with_known_aliases(["c", "i"]);
//!
//! let query = users
//!     .select(["u.username", "COUNT(i.id)"])
//!     .left_join("item i", "i.owner_id", "u.id")
//!     .and_where(predicates! { "u.name" => op("LIKE", "jo%") })
//!     .group_by(["u.username"])
//!     .build();
//!
//! // SELECT u.`username`, COUNT(i.`id`) AS i_count FROM `user` u
//! //   LEFT JOIN `item` i ON i.owner_id = u.id WHERE u.name LIKE ? GROUP BY u.`username`
//! let rows = client.query(&query.sql, &query.params).await?;
//! ```
//!
//! ## Embedding
//!
//! ```ignore
//! use sqldraft::{Embed, EmbedTarget, FromRow, Fields, Table};
//!
//! #[derive(FromRow, Fields)]
//! struct City {
//!     id: i64,
//!     name: String,
//! }
//!
//! let mut embed = Embed::new(Table::new("user").with_alias("u"));
//! let cities = embed.add_model::<City>(EmbedTarget::direct("city c"))?;
//!
//! for mut user in embed.finish_all(&client).await? {
//!     let cities: Vec<City> = user.take(&cities).unwrap_or_default();
//! }
//! ```

pub mod client;
pub mod column;
pub mod condition;
pub mod config;
pub mod embed;
pub mod error;
pub mod ident;
pub mod monitor;
pub mod row;
pub mod schema;
pub mod table;
pub mod value;

pub use client::GenericClient;
pub use column::{ColumnExpr, RenderContext};
pub use condition::{Logic, Operand, Predicate, PredicateGroup, Predicates, op};
pub use config::{Dialect, TableConfig};
pub use embed::{Embed, EmbedSpec, EmbedTarget, Embedded, Relation};
pub use error::{DraftError, DraftResult};
pub use monitor::{MonitorConfig, QueryType, TracingClient};
pub use row::{Fields, FromRow, Row, RowExt};
pub use schema::{DescribeProvider, MetadataProvider, TableMeta};
pub use table::{BuiltQuery, Limit, OrderBy, QueryDraft, SortDir, Table};
pub use value::{FromValue, Value};

#[cfg(feature = "derive")]
pub use sqldraft_derive::{Fields, FromRow};
