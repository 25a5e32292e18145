//! Fields derive macro implementation

use crate::attrs::{column_name, named_fields};
use proc_macro2::TokenStream;
use quote::quote;
use syn::{DeriveInput, Result};

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let columns = named_fields(&input, "Fields")?
        .iter()
        .map(column_name)
        .collect::<Result<Vec<_>>>()?;

    if columns.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Fields needs at least one named field",
        ));
    }

    Ok(quote! {
        impl #impl_generics sqldraft::Fields for #name #ty_generics #where_clause {
            const FIELDS: &'static [&'static str] = &[#(#columns),*];
        }
    })
}
