use proc_macro2::TokenStream as TokenStream2;

#[derive(Debug, Clone)]
pub struct DeriveValue {
    pub tokens: TokenStream2,
}

impl PartialEq for DeriveValue {
    fn eq(&self, other: &Self) -> bool {
        let st = &self.tokens.to_string();
        let ot = &other.tokens.to_string();
        st == ot
    }
}

impl Eq for DeriveValue {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelfKind {
    // &self
    Shared,
    // &mut self
    Exclusive,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveMethod {
    pub method_name: syn::Ident,
    pub self_kind: SelfKind,
    pub parameters: Vec<DeriveValue>,
}

#[derive(Debug, PartialEq, Eq)]
pub struct DeriveReceiver {
    pub self_type: DeriveValue,
    pub impl_generics: DeriveValue,
    pub where_clause: DeriveValue,
    pub methods: Vec<DeriveMethod>,
}
