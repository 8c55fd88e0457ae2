use crate::attributes::{column_name, ignored_fields, named_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, LitStr, Result};

pub(crate) fn generate_entity_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let name = &ast.ident;
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let mut entity_name = name.to_string();
    let mut entity_id: Option<String> = None;

    for attr in &ast.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("name") {
                    let s: LitStr = meta.value()?.parse()?;
                    entity_name = s.value();
                    Ok(())
                } else if meta.path.is_ident("id") {
                    if entity_id.is_some() {
                        return Err(meta.error("multiple id attributes are not allowed"));
                    }
                    let s: LitStr = meta.value()?.parse()?;
                    entity_id = Some(s.value());
                    Ok(())
                } else {
                    Err(meta.error("unknown entity attribute"))
                }
            })?;
        }
    }

    let ignored = ignored_fields(ast)?;
    let mut mappings = Vec::new();
    let mut id_found = false;

    for field in named_fields(ast, data)? {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let field_name = ident.to_string();
        if ignored.contains(&field_name) {
            continue;
        }
        if entity_id.as_deref() == Some(field_name.as_str()) {
            id_found = true;
        }

        let column = column_name(field)?;
        mappings.push(quote! { .mapped_field(#field_name, #column) });
    }

    let id_code = match entity_id {
        Some(id) if id_found => quote! { .id(#id) },
        Some(id) => {
            return Err(syn::Error::new_spanned(
                ast,
                format!("id field {} not found in struct", id),
            ))
        }
        None => quote! {},
    };

    let gen = quote! {
        impl #impl_generics artemis::entity::Entity for #name #ty_generics #where_clause {
            fn entity_metadata() -> artemis::entity::EntityMetadata {
                artemis::entity::EntityMetadata::new(#entity_name)
                    #(#mappings)*
                    #id_code
            }
        }
    };

    Ok(TokenStream::from(gen))
}
