use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

/// Implements `ollama_client::types::FromBytes` for a deserializable response type,
/// so the unary executor can decode a complete response body into it. The type
/// must also implement `Default`, which an empty body decodes to.
#[proc_macro_derive(FromBytes)]
pub fn derive_from_bytes(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let expanded = quote! {
        impl #impl_generics crate::types::FromBytes for #name #ty_generics #where_clause {
            fn from_bytes(bytes: ::bytes::Bytes) -> crate::Result<Self> {
                if bytes.is_empty() {
                    return Ok(<Self as ::std::default::Default>::default());
                }
                ::serde_json::from_slice(&bytes).map_err(crate::Error::JsonParse)
            }
        }
    };
    TokenStream::from(expanded)
}
