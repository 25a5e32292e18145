//! Derive macros for sqldraft
//!
//! Provides `#[derive(FromRow)]` and `#[derive(Fields)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod fields;
mod from_row;

/// Derive `FromRow` for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use sqldraft::FromRow;
///
/// #[derive(FromRow)]
/// struct User {
///     id: i64,
///     username: String,
///     #[draft(column = "email_address")]
///     email: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[draft(column = "name")]` - Map field to a different column name
#[proc_macro_derive(FromRow, attributes(draft))]
pub fn derive_from_row(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    from_row::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

/// Derive `Fields`: the ordered column list a struct decodes from.
///
/// Column renames follow the same `#[draft(column = "...")]` attribute as
/// `FromRow`, so `Embed::add_model::<T>()` projects exactly what `from_row` reads.
///
/// # Example
///
/// ```ignore
/// use sqldraft::Fields;
///
/// #[derive(Fields)]
/// struct City {
///     id: i64,
///     name: String,
/// }
///
/// assert_eq!(City::FIELDS, ["id", "name"]);
/// ```
#[proc_macro_derive(Fields, attributes(draft))]
pub fn derive_fields(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    fields::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
