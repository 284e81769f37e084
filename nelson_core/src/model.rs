use std::any::{Any, TypeId};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::prelude::Capability;

/// How a [`TypeKey`] was named.
#[derive(Clone, Copy)]
pub enum TypeKind {
    /// A concrete type, named via [`TypeKey::of`].
    Concrete,
    /// A capability set (trait object), named via [`TypeKey::interface`].
    /// Carries the coercion from the implementing concrete types.
    Interface {
        /// Coerce a concrete `Value` into a `Value` holding the shared trait object.
        coerce: fn(&Value) -> Option<Value>,
    },
}

impl fmt::Debug for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Concrete => write!(f, "Concrete"),
            TypeKind::Interface { .. } => write!(f, "Interface"),
        }
    }
}

/// The runtime identity of an injectable type.
///
/// Two keys are equal iff they denote the same type, regardless of how they were named.
/// In particular, `TypeKey::interface::<dyn Trait>()` equals `TypeKey::of::<Arc<dyn Trait>>()`.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::TypeKey;
///
/// assert_eq!(TypeKey::of::<u32>(), TypeKey::of::<u32>());
/// assert_ne!(TypeKey::of::<u32>(), TypeKey::of::<u64>());
/// assert_eq!(TypeKey::of::<u32>().name(), "u32");
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
    kind: TypeKind,
}

impl TypeKey {
    /// The key of the concrete type `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
            kind: TypeKind::Concrete,
        }
    }

    /// The key of the capability set `I` (ex: `dyn Greeter`).
    ///
    /// Values registered under this key are shared trait objects: `Arc<I>`.
    /// See [`capability!`](crate::capability) for declaring a capability set.
    pub fn interface<I: Capability + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<Arc<I>>(),
            name: std::any::type_name::<I>(),
            kind: TypeKind::Interface { coerce: I::coerce },
        }
    }

    /// The [`TypeId`] underlying this key.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// The type name, for diagnostics only.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// How this key was named.
    pub fn kind(&self) -> TypeKind {
        self.kind
    }

    /// Whether this key names a capability set.
    pub fn is_interface(&self) -> bool {
        matches!(self.kind, TypeKind::Interface { .. })
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

/// A type erased, shared value along with its [`TypeKey`].
///
/// Cloning a `Value` shares the underlying allocation.
///
/// ### Example
/// ```
/// # use nelson_core as nelson;
/// use nelson::{TypeKey, Value};
///
/// let value = Value::new("hello".to_string());
/// assert_eq!(value.type_key(), &TypeKey::of::<String>());
/// assert_eq!(value.downcast_ref::<String>().unwrap(), "hello");
/// assert!(value.ptr_eq(&value.clone()));
/// ```
#[derive(Clone)]
pub struct Value {
    key: TypeKey,
    inner: Arc<dyn Any + Send + Sync>,
}

impl Value {
    /// Wrap a concrete value, keyed by its own type.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            inner: Arc::new(value),
        }
    }

    /// Wrap a shared trait object, keyed by its capability set.
    pub fn from_interface<I: Capability + ?Sized>(value: Arc<I>) -> Self
    where
        Arc<I>: Send + Sync,
    {
        Self {
            key: TypeKey::interface::<I>(),
            inner: Arc::new(value),
        }
    }

    /// The key of the wrapped value.
    pub fn type_key(&self) -> &TypeKey {
        &self.key
    }

    /// Whether the wrapped value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.inner.is::<T>()
    }

    /// Borrow the wrapped value as a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.downcast_ref::<T>()
    }

    /// Share the wrapped value as a `T`.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.inner.clone().downcast::<T>().ok()
    }

    /// Whether both values share the same allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.key.name())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capability;
    use rstest::rstest;
    use std::collections::HashSet;

    trait Shape: Send + Sync {
        fn sides(&self) -> u8;
    }

    struct Square;

    impl Shape for Square {
        fn sides(&self) -> u8 {
            4
        }
    }

    capability!(Shape = [Square]);

    #[rstest]
    #[case(TypeKey::of::<u32>(), TypeKey::of::<u32>(), true)]
    #[case(TypeKey::of::<u32>(), TypeKey::of::<i32>(), false)]
    #[case(TypeKey::of::<String>(), TypeKey::of::<&'static str>(), false)]
    #[case(TypeKey::interface::<dyn Shape>(), TypeKey::of::<Arc<dyn Shape>>(), true)]
    #[case(TypeKey::interface::<dyn Shape>(), TypeKey::of::<Square>(), false)]
    fn type_key_equality(#[case] left: TypeKey, #[case] right: TypeKey, #[case] expected: bool) {
        assert_eq!(left == right, expected);

        let set = HashSet::from([left]);
        assert_eq!(set.contains(&right), expected);
    }

    #[test]
    fn type_key_kind() {
        assert!(!TypeKey::of::<Square>().is_interface());
        assert!(TypeKey::interface::<dyn Shape>().is_interface());
        // Equal keys may still be named differently.
        assert!(!TypeKey::of::<Arc<dyn Shape>>().is_interface());
    }

    #[test]
    fn type_key_display() {
        assert_eq!(TypeKey::of::<u32>().to_string(), "u32");
        assert_eq!(format!("{:?}", TypeKey::of::<u32>()), "TypeKey(u32)");
        assert!(TypeKey::interface::<dyn Shape>().name().contains("Shape"));
    }

    #[test]
    fn value_new() {
        // Setup
        let value = Value::new(5u32);

        // Verify
        assert_eq!(value.type_key(), &TypeKey::of::<u32>());
        assert!(value.is::<u32>());
        assert!(!value.is::<u64>());
        assert_eq!(value.downcast_ref::<u32>(), Some(&5));
        assert_eq!(value.downcast_ref::<u64>(), None);
        assert_eq!(*value.downcast_arc::<u32>().unwrap(), 5);
    }

    #[test]
    fn value_shared() {
        let value = Value::new("abc".to_string());
        let clone = value.clone();
        let other = Value::new("abc".to_string());

        assert!(value.ptr_eq(&clone));
        assert!(!value.ptr_eq(&other));
    }

    #[test]
    fn value_from_interface() {
        // Setup
        let shape: Arc<dyn Shape> = Arc::new(Square);

        // Execute
        let value = Value::from_interface(shape);

        // Verify
        assert_eq!(value.type_key(), &TypeKey::interface::<dyn Shape>());
        let shape = value.downcast_ref::<Arc<dyn Shape>>().unwrap();
        assert_eq!(shape.sides(), 4);
    }

    #[test]
    fn value_debug() {
        let value = Value::new(1u8);
        assert_eq!(format!("{value:?}"), "Value { type: \"u8\", .. }");
    }
}
