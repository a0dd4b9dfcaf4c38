// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

extern crate proc_macro;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, GenericArgument, PathArguments, Type};

/// How a struct field maps onto the wire value model.
#[derive(Clone)]
enum FieldKind {
    /// Anything covered by the `WireField` trait: scalars, `String`,
    /// `Option<T>`, and nested derived structs.
    Wire,
    /// `Vec<u8>`, encoded as a byte payload rather than a list.
    ByteVec,
    /// `Vec<T>` with a `WireField` element type.
    List(Box<Type>),
}

/// `#[derive(Reflect)]` macro: generates a `TypeDescriptor` plus the
/// value-graph conversions the serializer engine consumes.
///
/// Supports:
/// - Scalar types: bool, i8-i64, u8-u64, f32, f64, char, String
/// - `Vec<u8>`: byte payload
/// - `Vec<T>`: list of any supported element type
/// - `Option<T>`: absent values travel as null
/// - Nested structs that also derive `Reflect`
///
/// Example:
/// ```ignore
/// use objwire::Reflect;
///
/// #[derive(Reflect)]
/// struct Person {
///     name: String,
///     age: i32,
///     avatar: Vec<u8>,
/// }
/// ```
#[proc_macro_derive(Reflect)]
pub fn derive_reflect(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    let name = &input.ident;
    let type_name = name.to_string();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(f) => &f.named,
            _ => {
                return syn::Error::new_spanned(&input, "Only named fields are supported")
                    .to_compile_error()
                    .into()
            }
        },
        _ => {
            return syn::Error::new_spanned(&input, "Only structs are supported")
                .to_compile_error()
                .into()
        }
    };

    struct FieldInfo {
        name: syn::Ident,
        ty: syn::Type,
        kind: FieldKind,
    }

    let mut field_infos = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.as_ref() else {
            return syn::Error::new_spanned(field, "Field must have a name")
                .to_compile_error()
                .into();
        };
        let field_type = &field.ty;
        let Some(kind) = get_field_kind(field_type) else {
            return syn::Error::new_spanned(
                field_type,
                "Unsupported type. Supported: scalars, String, Vec<T>, Option<T>, derived structs.",
            )
            .to_compile_error()
            .into();
        };
        field_infos.push(FieldInfo {
            name: field_name.clone(),
            ty: field_type.clone(),
            kind,
        });
    }

    // Descriptor field table, in declaration order.
    let descriptor_fields: Vec<_> = field_infos
        .iter()
        .map(|f| {
            let name_str = f.name.to_string();
            let ty = &f.ty;
            let kind_expr = match &f.kind {
                FieldKind::Wire => quote! { <#ty as ::objwire::WireField>::kind() },
                FieldKind::ByteVec => quote! { ::objwire::ValueKind::Bytes },
                FieldKind::List(_) => quote! { ::objwire::ValueKind::List },
            };
            quote! { .field(#name_str, #kind_expr) }
        })
        .collect();

    let value_fields: Vec<_> = field_infos
        .iter()
        .map(|f| {
            let field_name = &f.name;
            match &f.kind {
                FieldKind::Wire => quote! {
                    ::objwire::WireField::to_field(&self.#field_name)
                },
                FieldKind::ByteVec => quote! {
                    ::objwire::Value::Bytes(self.#field_name.clone())
                },
                FieldKind::List(_) => quote! {
                    ::objwire::Value::List(
                        self.#field_name
                            .iter()
                            .map(::objwire::WireField::to_field)
                            .collect(),
                    )
                },
            }
        })
        .collect();

    let field_inits: Vec<_> = field_infos
        .iter()
        .map(|f| {
            let field_name = &f.name;
            let name_str = f.name.to_string();
            let missing = field_error(&type_name, &name_str, "object carries no such field");
            let bad_kind = field_error(&type_name, &name_str, "value kind does not match");
            let convert = match &f.kind {
                FieldKind::Wire => quote! {
                    ::objwire::WireField::from_field(field_value).ok_or_else(|| #bad_kind)?
                },
                FieldKind::ByteVec => quote! {
                    match field_value {
                        ::objwire::Value::Bytes(bytes) => bytes.clone(),
                        ::objwire::Value::Null => Vec::new(),
                        _ => return Err(#bad_kind),
                    }
                },
                FieldKind::List(elem) => quote! {
                    match field_value {
                        ::objwire::Value::List(items) => items
                            .iter()
                            .map(<#elem as ::objwire::WireField>::from_field)
                            .collect::<Option<Vec<_>>>()
                            .ok_or_else(|| #bad_kind)?,
                        ::objwire::Value::Null => Vec::new(),
                        _ => return Err(#bad_kind),
                    }
                },
            };
            quote! {
                #field_name: {
                    let field_value = obj.field(#name_str).ok_or_else(|| #missing)?;
                    #convert
                }
            }
        })
        .collect();

    let expanded = quote! {
        impl ::objwire::Reflect for #name {
            fn descriptor() -> &'static ::std::sync::Arc<::objwire::TypeDescriptor> {
                static DESCRIPTOR: ::std::sync::OnceLock<
                    ::std::sync::Arc<::objwire::TypeDescriptor>,
                > = ::std::sync::OnceLock::new();
                DESCRIPTOR.get_or_init(|| {
                    ::objwire::TypeDescriptorBuilder::new(#type_name)
                        #(#descriptor_fields)*
                        .build()
                })
            }

            fn to_value(&self) -> ::objwire::Value {
                ::objwire::Value::object(
                    <Self as ::objwire::Reflect>::descriptor(),
                    vec![#(#value_fields),*],
                )
            }

            fn from_value(value: &::objwire::Value) -> ::objwire::WireResult<Self> {
                let ::objwire::Value::Object(obj) = value else {
                    return Err(::objwire::WireError::TypeMismatch {
                        expected: #type_name.to_string(),
                        found: format!("{:?}", value.kind()),
                    });
                };
                let obj = obj.read();
                Ok(Self {
                    #(#field_inits),*
                })
            }
        }

        // Lets a derived struct appear as a field of another derived struct.
        impl ::objwire::WireField for #name {
            fn kind() -> ::objwire::ValueKind {
                ::objwire::ValueKind::Object
            }

            fn to_field(&self) -> ::objwire::Value {
                <Self as ::objwire::Reflect>::to_value(self)
            }

            fn from_field(value: &::objwire::Value) -> Option<Self> {
                <Self as ::objwire::Reflect>::from_value(value).ok()
            }
        }
    };

    TokenStream::from(expanded)
}

/// Build the `FieldAccess` error expression used by generated `from_value`.
fn field_error(type_name: &str, field: &str, reason: &str) -> proc_macro2::TokenStream {
    quote! {
        ::objwire::WireError::FieldAccess {
            type_name: #type_name.to_string(),
            field: #field.to_string(),
            reason: #reason.to_string(),
        }
    }
}

/// Classify a Rust type into its wire mapping.
///
/// `Vec<u8>` is singled out as a byte payload; every other `Vec<T>` becomes
/// a list. Everything else (scalars, `String`, `Option<T>`, nested derived
/// structs) goes through the `WireField` trait and fails at compile time if
/// no impl exists.
fn get_field_kind(ty: &syn::Type) -> Option<FieldKind> {
    let Type::Path(type_path) = ty else {
        return None;
    };
    let segment = type_path.path.segments.last()?;
    if segment.ident == "Vec" {
        let PathArguments::AngleBracketed(args) = &segment.arguments else {
            return None;
        };
        let Some(GenericArgument::Type(elem)) = args.args.first() else {
            return None;
        };
        if let Type::Path(inner) = elem {
            if let Some(inner_segment) = inner.path.segments.last() {
                if inner_segment.ident == "u8" {
                    return Some(FieldKind::ByteVec);
                }
            }
        }
        return Some(FieldKind::List(Box::new(elem.clone())));
    }
    Some(FieldKind::Wire)
}
