use std::any::Any;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use crate::injector::Error;
use crate::model::{TypeKey, TypeKind, Value};
use crate::prelude::{Capability, Vivifier};

#[cfg(feature = "tracing_debug")]
use tracing::debug;

const FALLBACK: &str = "<fallback vivifier>";

/// A type indexed pool of values for dependency injection.
///
/// Holds at most one value per type.
/// Values are either registered up front (`add`, `add_interface`), or constructed on demand by vivifiers (`add_vivifier`, `set_fallback`).
/// Once constructed, a value is cached and served for every subsequent request of its type.
///
/// A capability set becomes known to the injector once it is named via [`TypeKey::interface`] in any registration
/// (or explicitly, via [`Injector::declare_interface`]).
/// From then on, a concrete value vivified for it is coerced into the shared trait object, however the type is requested
/// (ex: as an `Arc<dyn Trait>` handler parameter).
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::{Injector, TypeKey, Value};
///
/// let mut injector = Injector::new();
/// injector.add(Value::new("hello".to_string())).unwrap();
/// injector
///     .vivify_with(TypeKey::of::<u32>(), |_, _| Ok(Value::new(42u32)))
///     .unwrap();
///
/// let mut seen = None;
/// injector
///     .invoke(|i: u32, s: String| seen = Some(format!("{s} {i}")))
///     .unwrap();
/// assert_eq!(seen.as_deref(), Some("hello 42"));
/// ```
#[derive(Default)]
pub struct Injector {
    objects: HashMap<TypeKey, Value>,
    vivifiers: HashMap<TypeKey, Box<dyn Vivifier>>,
    fallback: Option<Box<dyn Vivifier>>,
    interfaces: HashMap<TypeKey, TypeKey>,
}

impl std::fmt::Debug for Injector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Injector")
            .field("objects", &self.objects.keys().collect::<Vec<_>>())
            .field("vivifiers", &self.vivifiers.keys().collect::<Vec<_>>())
            .field("fallback", &self.fallback.is_some())
            .field("interfaces", &self.interfaces.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// A read-only view of an [`Injector`], as handed to a [`Vivifier`].
///
/// Only previously cached values are visible; a view never vivifies.
#[derive(Debug, Clone, Copy)]
pub struct View<'i> {
    injector: &'i Injector,
}

impl<'i> View<'i> {
    /// The cached value for `ty`, if any.
    pub fn get(&self, ty: &TypeKey) -> Option<&'i Value> {
        self.injector.objects.get(ty)
    }

    /// A clone of the cached `T`, if any.
    pub fn get_as<T: Clone + Any>(&self) -> Option<T> {
        self.get(&TypeKey::of::<T>())
            .and_then(|value| value.downcast_ref::<T>())
            .cloned()
    }

    /// Whether a value is cached for `ty`.
    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.injector.contains(ty)
    }
}

// Check (or coerce) the value into the type it is about to be cached under.
fn assign(key: &TypeKey, value: Value) -> Result<Value, Error> {
    if value.type_key() == key {
        return Ok(value);
    }

    match key.kind() {
        TypeKind::Interface { coerce } => coerce(&value),
        TypeKind::Concrete => None,
    }
    .ok_or_else(|| Error::BadType {
        value: value.type_key().to_string(),
        ty: key.to_string(),
    })
}

// Record `ty` as a capability set, if it names one.
fn declare(interfaces: &mut HashMap<TypeKey, TypeKey>, ty: &TypeKey) {
    if ty.is_interface() && !interfaces.contains_key(ty) {
        #[cfg(feature = "tracing_debug")]
        {
            debug!("Declaring capability set '{ty}'.");
        }

        interfaces.insert(*ty, *ty);
    }
}

impl Injector {
    /// Create an empty injector.
    pub fn new() -> Self {
        Self::default()
    }

    // The key as the injector knows it: upgraded to its capability set, when declared.
    fn known(&self, ty: &TypeKey) -> TypeKey {
        self.interfaces.get(ty).copied().unwrap_or(*ty)
    }

    fn insert(&mut self, key: TypeKey, value: Value) -> Result<Value, Error> {
        let key = if key.is_interface() {
            key
        } else {
            self.known(&key)
        };
        let value = assign(&key, value)?;

        match self.objects.entry(key) {
            Entry::Occupied(_) => Err(Error::DuplicateType(key.to_string())),
            Entry::Vacant(entry) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Caching value for type '{key}'.");
                }

                declare(&mut self.interfaces, &key);
                Ok(entry.insert(value).clone())
            }
        }
    }

    /// Add a value, keyed by its own type.
    ///
    /// Fails with `NilValue` if the value is absent, or `DuplicateType` if a value of the same type is already present.
    ///
    /// ### Example
    /// ```
    /// # use nelson_core as nelson;
    /// use nelson::{Error, Injector, Value};
    ///
    /// let mut injector = Injector::new();
    /// injector.add(Value::new(1u32)).unwrap();
    ///
    /// assert!(matches!(injector.add(Value::new(2u32)), Err(Error::DuplicateType(_))));
    /// assert!(matches!(injector.add(None), Err(Error::NilValue)));
    /// ```
    pub fn add(&mut self, value: impl Into<Option<Value>>) -> Result<(), Error> {
        let value = value.into().ok_or(Error::NilValue)?;
        let key = *value.type_key();
        self.insert(key, value).map(|_| ())
    }

    /// Add a plain `T`, keyed by `T`.
    pub fn provide<T: Any + Send + Sync>(&mut self, value: T) -> Result<(), Error> {
        self.add(Value::new(value))
    }

    /// Add a value, keyed by the capability set `capability` rather than its own type.
    ///
    /// Fails with `NilValue` if the value is absent, `BadInterface` if `capability` does not name a capability set,
    /// `BadType` if the value does not implement the capability set, or `DuplicateType` if the capability set is already present.
    pub fn add_interface(
        &mut self,
        capability: TypeKey,
        value: impl Into<Option<Value>>,
    ) -> Result<(), Error> {
        let value = value.into().ok_or(Error::NilValue)?;

        if !capability.is_interface() {
            return Err(Error::BadInterface(capability.to_string()));
        }

        self.insert(capability, value).map(|_| ())
    }

    /// Add a shared trait object, keyed by its capability set `I`.
    pub fn provide_interface<I: Capability + ?Sized>(&mut self, value: Arc<I>) -> Result<(), Error>
    where
        Arc<I>: Send + Sync,
    {
        self.add_interface(TypeKey::interface::<I>(), Value::from_interface(value))
    }

    /// Declare the capability set `I`, so that concrete values vivified for `Arc<I>` are coerced into it.
    ///
    /// Registering via [`TypeKey::interface`] declares the capability set too; this is only needed when every vivifier
    /// for it is the fallback.
    pub fn declare_interface<I: Capability + ?Sized>(&mut self) {
        declare(&mut self.interfaces, &TypeKey::interface::<I>());
    }

    /// Add a vivifier which constructs the value for `ty` on demand.
    ///
    /// Fails with `NilValue` if the vivifier is absent, or `DuplicateType` if a vivifier for `ty` is already present.
    /// A capability set is named via [`TypeKey::interface`], which indexes the same type as `add_interface`.
    pub fn add_vivifier(
        &mut self,
        ty: TypeKey,
        vivifier: Option<Box<dyn Vivifier>>,
    ) -> Result<(), Error> {
        let vivifier = vivifier.ok_or(Error::NilValue)?;

        match self.vivifiers.entry(ty) {
            Entry::Occupied(_) => Err(Error::DuplicateType(ty.to_string())),
            Entry::Vacant(entry) => {
                #[cfg(feature = "tracing_debug")]
                {
                    debug!("Adding vivifier for type '{ty}'.");
                }

                declare(&mut self.interfaces, &ty);
                entry.insert(vivifier);
                Ok(())
            }
        }
    }

    /// Add a closure vivifier for `ty`.
    pub fn vivify_with<F>(&mut self, ty: TypeKey, vivifier: F) -> Result<(), Error>
    where
        F: Fn(&View<'_>, &TypeKey) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.add_vivifier(ty, Some(Box::new(vivifier)))
    }

    /// Set the fallback vivifier, consulted for any type without a value or specific vivifier.
    ///
    /// Fails with `NilValue` if the vivifier is absent, or `DuplicateType` if a fallback is already set.
    pub fn set_fallback(&mut self, vivifier: Option<Box<dyn Vivifier>>) -> Result<(), Error> {
        let vivifier = vivifier.ok_or(Error::NilValue)?;

        if self.fallback.is_some() {
            return Err(Error::DuplicateType(FALLBACK.to_string()));
        }

        #[cfg(feature = "tracing_debug")]
        {
            debug!("Setting fallback vivifier.");
        }

        self.fallback.replace(vivifier);
        Ok(())
    }

    /// Set a closure as the fallback vivifier.
    pub fn fallback_with<F>(&mut self, vivifier: F) -> Result<(), Error>
    where
        F: Fn(&View<'_>, &TypeKey) -> Result<Value, Error> + Send + Sync + 'static,
    {
        self.set_fallback(Some(Box::new(vivifier)))
    }

    /// Get the value for `ty`.
    ///
    /// Resolution happens in a fixed order:
    /// 1. The cached value, if present.
    /// 2. The value constructed by the vivifier for `ty`, if present.
    /// 3. The value constructed by the fallback vivifier, if present.
    ///
    /// A constructed value is cached before it is returned.
    /// A vivifier's error is returned unchanged, and nothing is cached.
    /// A declared capability set is coerced into, even when `ty` was named via [`TypeKey::of`].
    /// When none of the above apply, fails with `MissingValue`.
    pub fn get(&mut self, ty: &TypeKey) -> Result<Value, Error> {
        if let Some(value) = self.objects.get(ty) {
            return Ok(value.clone());
        }

        let (key, vivified) = if let Some((key, vivifier)) = self.vivifiers.get_key_value(ty) {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("Vivifying type '{ty}'.");
            }

            (*key, vivifier.vivify(&self.view(), ty)?)
        } else if let Some(fallback) = &self.fallback {
            let key = self.known(ty);

            #[cfg(feature = "tracing_debug")]
            {
                debug!("Vivifying type '{key}' via fallback.");
            }

            (key, fallback.vivify(&self.view(), &key)?)
        } else {
            #[cfg(feature = "tracing_debug")]
            {
                debug!("No value for type '{ty}'.");
            }

            return Err(Error::MissingValue(ty.to_string()));
        };

        self.insert(key, vivified)
    }

    /// Get a clone of the `T` value.
    pub fn resolve<T: Clone + Any + Send + Sync>(&mut self) -> Result<T, Error> {
        let ty = TypeKey::of::<T>();
        let value = self.get(&ty)?;

        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| Error::BadType {
                value: value.type_key().to_string(),
                ty: ty.to_string(),
            })
    }

    /// A read-only view of the cached values.
    pub fn view(&self) -> View<'_> {
        View { injector: self }
    }

    /// Whether a value is cached for `ty`.
    pub fn contains(&self, ty: &TypeKey) -> bool {
        self.objects.contains_key(ty)
    }

    /// Whether a specific vivifier is present for `ty`.
    pub fn has_vivifier(&self, ty: &TypeKey) -> bool {
        self.vivifiers.contains_key(ty)
    }

    /// Whether a fallback vivifier is set.
    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// The number of cached values.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no values are cached.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}
