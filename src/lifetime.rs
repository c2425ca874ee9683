//! Bean lifetime definitions.

/// Bean lifetimes controlling instance caching behavior
///
/// The lifetime is the singleton-scope marker of a bean: it is declared on
/// the type's [`BeanDescriptor`](crate::BeanDescriptor) and read by the
/// container after every successful construction.
///
/// # Examples
///
/// ```rust
/// use bean_ioc::{Bean, BeanDescriptor, Container, Lifetime};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Database;
/// impl Bean for Database {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new()
///             .lifetime(Lifetime::Singleton)
///             .constructor(Database::default)
///     }
/// }
///
/// #[derive(Default)]
/// struct Request;
/// impl Bean for Request {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new().constructor(Request::default)
///     }
/// }
///
/// let container = Container::new();
///
/// // Singleton: same instance on every resolution
/// let db1 = container.get_bean::<Database>().unwrap();
/// let db2 = container.get_bean::<Database>().unwrap();
/// assert!(Arc::ptr_eq(&db1, &db2));
///
/// // Transient: new instance every time
/// let r1 = container.get_bean::<Request>().unwrap();
/// let r2 = container.get_bean::<Request>().unwrap();
/// assert!(!Arc::ptr_eq(&r1, &r2));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifetime {
    /// Single instance per container, cached forever
    ///
    /// Created on first resolution and stored in the singleton cache. Later
    /// resolutions return the cached instance without constructing or
    /// injecting again.
    Singleton,
    /// New instance per resolution, never cached
    #[default]
    Transient,
}

impl Lifetime {
    /// Whether instances of this lifetime go into the singleton cache.
    #[inline]
    pub fn is_singleton(self) -> bool {
        self == Lifetime::Singleton
    }
}
