use indexmap::IndexMap;

use crate::injector::{Error, Injector};
use crate::model::{TypeKey, Value};

/// An ordered set of parameter types, each with an optional input value.
///
/// Types keep the order in which they were first added (for [`Method::deps`](crate::Method::deps), declaration order).
///
/// Collects the dependencies of one or more [`Method`](crate::Method)s so they may be filled up front,
/// and then invoked via [`Method::call_with`](crate::Method::call_with).
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::{Injector, Method};
///
/// let mut injector = Injector::new();
/// injector.provide(7u8).unwrap();
///
/// let mut method = Method::from_handler("show", |value: u8| assert_eq!(value, 7));
/// let mut deps = method.deps().unwrap();
/// deps.fill_from(&mut injector).unwrap();
/// method.call_with(&deps).unwrap();
/// ```
#[derive(Debug, Clone, Default)]
pub struct Deps {
    entries: IndexMap<TypeKey, Option<Value>>,
}

impl Deps {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a set of the types `keys`, each without a value.
    pub fn from_keys(keys: impl IntoIterator<Item = TypeKey>) -> Self {
        Self {
            entries: keys.into_iter().map(|key| (key, None)).collect(),
        }
    }

    /// The types in this set, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &TypeKey> {
        self.entries.keys()
    }

    /// The number of types in this set.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether this set has no types.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `ty` is in this set (with or without a value).
    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.entries.contains_key(ty)
    }

    /// The value for `ty`, if it is present.
    pub fn get(&self, ty: &TypeKey) -> Option<&Value> {
        self.entries.get(ty).and_then(Option::as_ref)
    }

    /// Add the types of `other` which are not yet in this set, after the existing ones.
    /// Values are ignored; existing entries are kept as is.
    pub fn merge(&mut self, other: &Deps) {
        for key in other.entries.keys() {
            self.entries.entry(*key).or_insert(None);
        }
    }

    /// A new set of the same types, each without a value.
    pub fn copy(&self) -> Deps {
        Deps::from_keys(self.entries.keys().copied())
    }

    /// Set the value for its own type, returning the previous value (if any).
    /// Adds the type to the end of this set when it is not yet present.
    pub fn insert(&mut self, value: Value) -> Option<Value> {
        self.entries.insert(*value.type_key(), Some(value)).flatten()
    }

    /// Resolve a value for every type without one, in order, via [`Injector::get`].
    ///
    /// Stops at the first failure: entries filled up to that point are kept, and later types are not resolved.
    pub fn fill_from(&mut self, injector: &mut Injector) -> Result<(), Error> {
        for (key, entry) in self.entries.iter_mut() {
            if entry.is_none() {
                entry.replace(injector.get(key)?);
            }
        }

        Ok(())
    }
}
