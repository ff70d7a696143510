//! Procedural macros for the postmark envelope crate.
//!
//! - `#[derive(Payload)]`: Implements `postmark::Payload` for your type, preserving generics
//!   and bounds. The generated `message_type()` returns the bare type identifier, or the value
//!   given with `#[payload(message_type = "...")]`.
//!
//! Usage:
//! ```rust,ignore
//! use postmark::Payload;
//!
//! #[derive(Clone, Debug, Payload)]
//! struct OrderPlaced { order_id: u64 }
//!
//! #[derive(Clone, Debug, Payload)]
//! #[payload(message_type = "order.cancelled")]
//! struct OrderCancelled { order_id: u64 }
//! ```
use proc_macro::TokenStream;
use quote::quote;
use syn::{DeriveInput, LitStr, parse_macro_input};

#[proc_macro_derive(Payload, attributes(payload))]
pub fn derive_payload(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand_payload(&input) {
        Ok(tokens) => tokens.into(),
        Err(e) => e.into_compile_error().into(),
    }
}

fn expand_payload(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let ident = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let mut message_type = ident.to_string();
    for attr in input.attrs.iter().filter(|a| a.path().is_ident("payload")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("message_type") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(meta.error("message_type cannot be empty"));
                }
                message_type = value.value();
                Ok(())
            } else {
                Err(meta.error("unsupported payload attribute, expected `message_type`"))
            }
        })?;
    }

    Ok(quote! {
        impl #impl_generics postmark::Payload for #ident #ty_generics #where_clause {
            fn message_type() -> ::std::borrow::Cow<'static, str> {
                ::std::borrow::Cow::Borrowed(#message_type)
            }
        }
    })
}
