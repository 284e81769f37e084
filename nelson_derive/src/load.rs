use quote::{quote, ToTokens};
use syn::spanned::Spanned;

use crate::model::{DeriveMethod, DeriveReceiver, DeriveValue, SelfKind};

const ATTRIBUTE: &str = "receiver";

impl TryFrom<&mut syn::ItemImpl> for DeriveReceiver {
    type Error = syn::Error;

    fn try_from(value: &mut syn::ItemImpl) -> Result<Self, Self::Error> {
        if let Some((_, path, _)) = &value.trait_ {
            return Err(syn::Error::new(
                path.span(),
                "Invalid - receiver must be an inherent impl block.",
            ));
        }

        let mut methods = Vec::default();

        for item in value.items.iter_mut() {
            if let syn::ImplItem::Fn(function) = item {
                // The attribute must not outlive the expansion.
                let skip = take_skip(&mut function.attrs)?;

                if skip || function.sig.receiver().is_none() {
                    continue;
                }

                methods.push(DeriveMethod::try_from(&function.sig)?);
            }
        }

        let (impl_generics, _, where_clause) = value.generics.split_for_impl();

        Ok(DeriveReceiver {
            self_type: DeriveValue {
                tokens: value.self_ty.to_token_stream(),
            },
            impl_generics: DeriveValue {
                tokens: quote! { #impl_generics },
            },
            where_clause: DeriveValue {
                tokens: quote! { #where_clause },
            },
            methods,
        })
    }
}

impl TryFrom<&syn::Signature> for DeriveMethod {
    type Error = syn::Error;

    fn try_from(value: &syn::Signature) -> Result<Self, Self::Error> {
        let method_name = &value.ident;

        if !value.generics.params.is_empty() {
            return Err(syn::Error::new(
                value.generics.span(),
                format!("Invalid - method '{method_name}' cannot be generic."),
            ));
        }

        if let Some(asyncness) = &value.asyncness {
            return Err(syn::Error::new(
                asyncness.span(),
                format!("Invalid - method '{method_name}' cannot be async."),
            ));
        }

        let mut self_kind = None;
        let mut parameters = Vec::default();

        for input in &value.inputs {
            match input {
                syn::FnArg::Receiver(receiver) => {
                    if receiver.reference.is_none() || receiver.colon_token.is_some() {
                        return Err(syn::Error::new(
                            receiver.span(),
                            format!(
                                "Invalid - method '{method_name}' must take `&self` or `&mut self`."
                            ),
                        ));
                    }

                    self_kind.replace(match receiver.mutability {
                        Some(_) => SelfKind::Exclusive,
                        None => SelfKind::Shared,
                    });
                }
                syn::FnArg::Typed(typed) => {
                    parameters.push(parameter(method_name, typed)?);
                }
            }
        }

        Ok(DeriveMethod {
            method_name: method_name.clone(),
            self_kind: self_kind.ok_or_else(|| {
                syn::Error::new(
                    value.span(),
                    format!("Invalid - method '{method_name}' must take `&self` or `&mut self`."),
                )
            })?,
            parameters,
        })
    }
}

fn parameter(method_name: &syn::Ident, typed: &syn::PatType) -> Result<DeriveValue, syn::Error> {
    match typed.pat.as_ref() {
        syn::Pat::Ident(syn::PatIdent {
            by_ref: None,
            subpat: None,
            ..
        })
        | syn::Pat::Wild(_) => {}
        pattern => {
            return Err(syn::Error::new(
                pattern.span(),
                format!("Invalid - method '{method_name}' parameters cannot be patterns."),
            ));
        }
    }

    match typed.ty.as_ref() {
        syn::Type::Reference(reference) => Err(syn::Error::new(
            reference.span(),
            format!("Invalid - method '{method_name}' parameters cannot be references (injected values are owned clones)."),
        )),
        syn::Type::ImplTrait(impl_trait) => Err(syn::Error::new(
            impl_trait.span(),
            format!("Invalid - method '{method_name}' parameters cannot be `impl Trait`."),
        )),
        ty => Ok(DeriveValue {
            tokens: ty.to_token_stream(),
        }),
    }
}

// Remove the `#[receiver(..)]` attributes, reporting whether any asked to skip the method.
fn take_skip(attributes: &mut Vec<syn::Attribute>) -> Result<bool, syn::Error> {
    let mut skip = false;

    for attribute in attributes.iter() {
        if attribute.path().is_ident(ATTRIBUTE) {
            attribute.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else {
                    Err(meta.error("Invalid - unsupported receiver attribute."))
                }
            })?;
        }
    }

    attributes.retain(|attribute| !attribute.path().is_ident(ATTRIBUTE));
    Ok(skip)
}
