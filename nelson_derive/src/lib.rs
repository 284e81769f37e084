extern crate proc_macro;

mod generate;
mod load;
mod model;

use crate::model::DeriveReceiver;
use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::spanned::Spanned;

#[proc_macro_attribute]
pub fn receiver(attribute: TokenStream, item: TokenStream) -> TokenStream {
    let attribute = TokenStream2::from(attribute);
    let mut item = syn::parse_macro_input!(item as syn::ItemImpl);

    if !attribute.is_empty() {
        return syn::Error::new(
            attribute.span(),
            "Invalid - receiver does not take arguments.",
        )
        .to_compile_error()
        .into();
    }

    let generated = DeriveReceiver::try_from(&mut item).and_then(TokenStream2::try_from);

    match generated {
        Ok(tokens) => quote! {
            #item
            #tokens
        }
        .into(),
        Err(error) => {
            let error = error.to_compile_error();
            // Keep the (stripped) impl block, so the only errors reported are ours.
            quote! {
                #item
                #error
            }
            .into()
        }
    }
}
