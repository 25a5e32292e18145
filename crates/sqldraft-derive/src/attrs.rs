use syn::punctuated::Punctuated;
use syn::token::Comma;
use syn::{Data, DeriveInput, Field, Fields, LitStr, Result};

/// The named fields of a struct, or a spanned error naming the derive.
pub fn named_fields<'a>(
    input: &'a DeriveInput,
    derive: &str,
) -> Result<&'a Punctuated<Field, Comma>> {
    match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => Ok(&fields.named),
            _ => Err(syn::Error::new_spanned(
                input,
                format!("{derive} can only be derived for structs with named fields"),
            )),
        },
        _ => Err(syn::Error::new_spanned(
            input,
            format!("{derive} can only be derived for structs"),
        )),
    }
}

/// Column a field reads from: `#[draft(column = "...")]` or the field name.
pub fn column_name(field: &Field) -> Result<String> {
    let mut column = None;
    for attr in &field.attrs {
        if !attr.path().is_ident("draft") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("column") {
                let lit: LitStr = meta.value()?.parse()?;
                column = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("unsupported draft attribute, expected `column = \"...\"`"))
            }
        })?;
    }

    match (column, &field.ident) {
        (Some(column), _) => Ok(column),
        (None, Some(ident)) => Ok(ident.to_string()),
        (None, None) => Err(syn::Error::new_spanned(field, "field has no name")),
    }
}
