use syn::{DataStruct, DeriveInput, Field, LitStr, Result};

/// Named fields of the struct, in declaration order.
pub(crate) fn named_fields<'a>(ast: &DeriveInput, data: &'a DataStruct) -> Result<Vec<&'a Field>> {
    match &data.fields {
        syn::Fields::Named(fields) => Ok(fields.named.iter().collect()),
        _ => Err(syn::Error::new_spanned(
            ast,
            "only structs with named fields are supported",
        )),
    }
}

/// Field names listed in `#[converter(ignored = "a, b")]`.
pub(crate) fn ignored_fields(ast: &DeriveInput) -> Result<Vec<String>> {
    let mut ignored = Vec::new();
    for attr in &ast.attrs {
        if attr.path().is_ident("converter") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("ignored") {
                    let s: LitStr = meta.value()?.parse()?;
                    ignored.extend(
                        s.value()
                            .split(',')
                            .map(str::trim)
                            .filter(|f| !f.is_empty())
                            .map(str::to_string),
                    );
                    Ok(())
                } else {
                    Err(meta.error("unknown converter attribute"))
                }
            })?;
        }
    }
    Ok(ignored)
}

/// Column a field is stored under: `#[column(name = "..")]`, or the field name.
pub(crate) fn column_name(field: &Field) -> Result<String> {
    let mut column = field.ident.as_ref().map(|ident| ident.to_string());
    for attr in &field.attrs {
        if attr.path().is_ident("column") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    column = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unknown column attribute"))
                }
            })?;
        }
    }
    column.ok_or_else(|| syn::Error::new_spanned(field, "field has no name"))
}
