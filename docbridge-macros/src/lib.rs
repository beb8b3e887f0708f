//! Procedural macros for the docbridge project.
//!
//! This crate provides the `#[derive(Entity)]` macro, which generates the
//! `docbridge_core::entity::Entity` implementation for a struct: the
//! collection name and the static field table used for predicate
//! validation.
//!
//! # Example
//!
//! ```ignore
//! use docbridge::Entity;
//! use serde::{Serialize, Deserialize};
//!
//! #[derive(Debug, Clone, Serialize, Deserialize, Entity)]
//! #[entity(collection = "users")]
//! pub struct User {
//!     pub name: String,
//!     pub age: i64,
//! }
//! ```
//!
//! Without the `collection` attribute the struct's own name is used, so
//! `User` documents land in a collection named `User`.

#[allow(unused_extern_crates)]
extern crate self as docbridge_macros;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type, parse_macro_input};

/// Derives `docbridge_core::entity::Entity` for a struct with named fields.
///
/// Field kinds are inferred from the Rust types: strings map to `Text`,
/// integers and floats to `Number`, `bool` to `Bool`, `DateTime` to
/// `DateTime`, `ObjectId` to `ObjectId`, `Vec<_>` to `Array`, `Document` to
/// `Document`, and anything else to `Any` (unchecked). `Option<T>` maps to
/// the kind of `T`.
///
/// Field names must match the serialized document keys; the derive uses the
/// field identifiers as-is.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match generate(&input) {
        Ok(output) => output.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn generate(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;

    let mut collection = name.to_string();
    for attr in &input.attrs {
        if attr.path().is_ident("entity") {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("collection") {
                    let lit: LitStr = meta.value()?.parse()?;
                    collection = lit.value();
                    Ok(())
                } else {
                    Err(meta.error("unsupported entity attribute"))
                }
            })?;
        }
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "#[derive(Entity)] only works on structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "#[derive(Entity)] only works on structs",
            ));
        }
    };

    let mut specs = Vec::new();

    for field in fields {
        let field_name = field.ident.as_ref().unwrap().to_string();
        let kind = field_kind(&field.ty);

        specs.push(quote! {
            docbridge_core::entity::FieldSpec {
                name: #field_name,
                kind: docbridge_core::entity::FieldKind::#kind,
            }
        });
    }

    Ok(quote! {
        impl docbridge_core::entity::Entity for #name {
            fn collection_name() -> &'static str {
                #collection
            }

            fn fields() -> &'static [docbridge_core::entity::FieldSpec] {
                &[#(#specs),*]
            }
        }
    })
}

/// Maps a Rust field type to the `FieldKind` variant name it declares.
fn field_kind(ty: &Type) -> proc_macro2::Ident {
    let ident = |name: &str| proc_macro2::Ident::new(name, proc_macro2::Span::call_site());

    let Type::Path(path) = unwrap_option(ty) else {
        return ident("Any");
    };
    let Some(segment) = path.path.segments.last() else {
        return ident("Any");
    };

    match segment.ident.to_string().as_str() {
        "String" | "str" => ident("Text"),
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" | "u64" | "isize" | "usize"
        | "f32" | "f64" => ident("Number"),
        "bool" => ident("Bool"),
        "DateTime" => ident("DateTime"),
        "ObjectId" => ident("ObjectId"),
        "Vec" => ident("Array"),
        "Document" => ident("Document"),
        _ => ident("Any"),
    }
}

/// Peels `Option<T>` down to `T`; an optional field declares the kind of its
/// inner type (null is accepted everywhere).
fn unwrap_option(ty: &Type) -> &Type {
    if let Type::Path(path) = ty
        && let Some(segment) = path.path.segments.last()
        && segment.ident == "Option"
        && let PathArguments::AngleBracketed(args) = &segment.arguments
        && let Some(GenericArgument::Type(inner)) = args.args.first()
    {
        return inner;
    }

    ty
}
