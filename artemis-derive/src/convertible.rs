use crate::attributes::{column_name, ignored_fields, named_fields};
use proc_macro::TokenStream;
use quote::quote;
use syn::{DataStruct, DeriveInput, Result};

pub(crate) fn generate_convertible_for_struct(
    ast: &DeriveInput,
    data: &DataStruct,
) -> Result<TokenStream> {
    let ignored = ignored_fields(ast)?;
    let fields = named_fields(ast, data)?;

    let mut puts = Vec::with_capacity(fields.len());
    let mut initializers = Vec::with_capacity(fields.len());

    for field in fields {
        let Some(ident) = field.ident.as_ref() else {
            continue;
        };
        let ty = &field.ty;

        if ignored.contains(&ident.to_string()) {
            initializers.push(quote! { #ident: ::core::default::Default::default() });
            continue;
        }

        let column = column_name(field)?;
        puts.push(quote! {
            doc.put(#column, artemis::common::Convertible::to_value(&self.#ident)?);
        });
        initializers.push(quote! {
            #ident: artemis::common::from_value::<#ty>(&doc.get(#column))?
        });
    }

    let name = &ast.ident;
    let type_name = name.to_string();
    let (impl_generics, ty_generics, where_clause) = ast.generics.split_for_impl();

    let gen = quote! {
        impl #impl_generics artemis::common::Convertible for #name #ty_generics #where_clause {
            type Output = Self;

            fn to_value(&self) -> artemis::errors::ArtemisResult<artemis::common::Value> {
                let mut doc = artemis::common::Document::new();
                #(#puts)*
                Ok(artemis::common::Value::Document(doc))
            }

            fn from_value(value: &artemis::common::Value) -> artemis::errors::ArtemisResult<Self::Output> {
                match value {
                    artemis::common::Value::Document(doc) => Ok(#name {
                        #(#initializers,)*
                    }),
                    _ => Err(artemis::errors::ArtemisError::new(
                        &format!("Value {} is not a document, cannot map it to {}", value, #type_name),
                        artemis::errors::ErrorKind::ObjectMappingError,
                    )),
                }
            }
        }
    };

    Ok(TokenStream::from(gen))
}
