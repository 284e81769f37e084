use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};

use crate::model::{DeriveMethod, DeriveReceiver, DeriveValue, SelfKind};

impl TryFrom<DeriveReceiver> for TokenStream2 {
    type Error = syn::Error;

    fn try_from(value: DeriveReceiver) -> Result<Self, Self::Error> {
        let DeriveReceiver {
            self_type,
            impl_generics,
            where_clause,
            methods,
        } = value;
        let DeriveValue { tokens: self_type } = self_type;
        let DeriveValue {
            tokens: impl_generics,
        } = impl_generics;
        let DeriveValue {
            tokens: where_clause,
        } = where_clause;
        let method_names = methods
            .iter()
            .map(|method| method.method_name.to_string())
            .collect::<Vec<_>>();
        let arms = methods
            .into_iter()
            .map(|method| method_arm(&self_type, method))
            .collect::<Vec<_>>();

        Ok(quote! {
            impl #impl_generics ::nelson::prelude::Receiver for #self_type #where_clause {
                fn method(&mut self, name: &str) -> ::std::option::Option<::nelson::Method<'_>> {
                    match name {
                        #( #arms )*
                        _ => ::std::option::Option::None,
                    }
                }

                fn method_names(&self) -> ::std::vec::Vec<&'static str> {
                    ::std::vec![#( #method_names ),*]
                }
            }
        })
    }
}

fn method_arm(self_type: &TokenStream2, method: DeriveMethod) -> TokenStream2 {
    let DeriveMethod {
        method_name,
        self_kind,
        parameters,
    } = method;
    let method_name_str = method_name.to_string();
    let arguments = (0..parameters.len())
        .map(|i| format_ident!("arg{i}"))
        .collect::<Vec<_>>();
    let types = parameters
        .into_iter()
        .map(|DeriveValue { tokens }| tokens)
        .collect::<Vec<_>>();
    let this = match self_kind {
        SelfKind::Shared => quote! { &*self },
        SelfKind::Exclusive => quote! { &mut *self },
    };

    quote! {
        #method_name_str => ::std::option::Option::Some(::nelson::Handler::into_method(
            move |#( #arguments: #types ),*| <#self_type>::#method_name(#this #(, #arguments)*),
            #method_name_str,
        )),
    }
}
