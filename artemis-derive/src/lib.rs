#![recursion_limit = "128"]
//! # Artemis Derive Macros
//!
//! Procedural macros that implement the artemis mapping traits for plain
//! structs.
//!
//! ## Macros
//!
//! ### `Convertible`
//!
//! Converts a struct to and from an `artemis::common::Document`, one entry per
//! field. Every field type must itself implement `Convertible`.
//!
//! - **Supported for**: structs with named fields
//! - **Struct attribute**: `#[converter(ignored = "a, b")]` leaves fields out
//!   of the document; they are rebuilt with `Default::default()`
//! - **Field attribute**: `#[column(name = "...")]` stores the field under
//!   another key
//!
//! ### `Entity`
//!
//! Produces the `EntityMetadata` the query translator matches method names
//! against.
//!
//! - **Supported for**: structs with named fields
//! - **Struct attribute**: `#[entity(name = "...", id = "field")]`; the name
//!   defaults to the struct name, the id is optional
//! - **Field attribute**: `#[column(name = "...")]`, shared with `Convertible`
//!
//! # Examples
//!
//! ```rust,ignore
//! use artemis_derive::{Convertible, Entity};
//!
//! #[derive(Entity, Convertible, Default)]
//! #[entity(name = "Person", id = "name")]
//! pub struct Person {
//!     pub name: String,
//!     #[column(name = "person_age")]
//!     pub age: i32,
//!     pub nick_names: Vec<String>,
//! }
//! ```

extern crate proc_macro;
mod attributes;
mod convertible;
mod entity;

use crate::convertible::generate_convertible_for_struct;
use crate::entity::generate_entity_for_struct;
use proc_macro::TokenStream;
use syn::{Data, DeriveInput};

/// Derives `artemis::common::Convertible` for a struct with named fields.
///
/// # Errors
///
/// Returns a compile error if:
/// - Applied to an enum, a union, or a tuple struct
/// - A `converter` or `column` attribute is malformed
#[proc_macro_derive(Convertible, attributes(converter, column))]
pub fn derive_convertible(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_convertible_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!(
                    "Failed to derive Convertible for struct '{}': {}.\n\
                     Make sure all fields implement Convertible.",
                    ast.ident, e
                ),
            )
            .to_compile_error()
            .into(),
        },
        Data::Enum(_) | Data::Union(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive Convertible here. Only structs with named fields are supported.",
        )
        .to_compile_error()
        .into(),
    }
}

/// Derives `artemis::entity::Entity` for a struct with named fields.
///
/// Fields listed in `#[converter(ignored = "...")]` are left out of the
/// metadata, so method names cannot query them.
///
/// ```rust,ignore
/// #[derive(Entity, Convertible, Default)]
/// #[entity(id = "plate")]
/// pub struct Car {
///     #[column(name = "_key")]
///     pub plate: String,
///     pub model: String,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(entity, converter, column))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let ast = syn::parse_macro_input!(input as DeriveInput);

    match ast.data {
        Data::Struct(ref data) => match generate_entity_for_struct(&ast, data) {
            Ok(token_stream) => token_stream,
            Err(e) => syn::Error::new_spanned(
                &ast,
                format!(
                    "Failed to derive Entity for struct '{}': {}.\n\
                     Example: #[derive(Entity)] #[entity(id = \"name\")] pub struct Person {{ name: String }}",
                    ast.ident, e
                ),
            )
            .to_compile_error()
            .into(),
        },
        Data::Enum(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive Entity for enums. Only structs are supported.",
        )
        .to_compile_error()
        .into(),
        Data::Union(_) => syn::Error::new_spanned(
            &ast,
            "Cannot derive Entity for unions. Only structs are supported.",
        )
        .to_compile_error()
        .into(),
    }
}
