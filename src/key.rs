//! Type keys for the bean container.

use std::any::TypeId;
use std::fmt;

/// Identity of a resolvable type.
///
/// Keys index both the singleton cache and the provider registry. Equality
/// and hashing only look at the `TypeId`; the name is carried for
/// diagnostics (circular chains, conflict reports, error messages).
///
/// # Examples
///
/// ```rust
/// use bean_ioc::{key_of_type, TypeKey};
///
/// let a = key_of_type::<String>();
/// let b = TypeKey::of::<String>();
/// assert_eq!(a, b);
/// assert_eq!(a.display_name(), "alloc::string::String");
/// assert_ne!(a, key_of_type::<u32>());
/// ```
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Key for `T`.
    #[inline(always)]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying `TypeId`.
    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.id
    }

    /// Fully qualified type name, as reported by `std::any::type_name`.
    #[inline]
    pub fn display_name(&self) -> &'static str {
        self.name
    }

    /// Last path segment of the type name, without generic arguments.
    ///
    /// ```rust
    /// use bean_ioc::key_of_type;
    ///
    /// assert_eq!(key_of_type::<String>().short_name(), "String");
    /// assert_eq!(key_of_type::<Vec<u8>>().short_name(), "Vec");
    /// ```
    pub fn short_name(&self) -> &'static str {
        let base = self.name.split('<').next().unwrap_or(self.name);
        base.rsplit("::").next().unwrap_or(base)
    }
}

impl PartialEq for TypeKey {
    #[inline(always)]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    #[inline(always)]
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeKey({})", self.name)
    }
}

impl fmt::Display for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

// Helper function for creating type keys
#[inline(always)]
pub fn key_of_type<T: ?Sized + 'static>() -> TypeKey {
    TypeKey::of::<T>()
}
