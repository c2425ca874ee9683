//! Bean descriptors: the capability tables the container reads instead of
//! reflecting over a type.

use std::any::Any;
use std::fmt;

use crate::args::Arg;
use crate::container::Container;
use crate::error::{BoxError, DiError, DiResult};
use crate::inject::Inject;
use crate::key::{key_of_type, TypeKey};
use crate::lifetime::Lifetime;

/// A type the container can resolve.
///
/// The descriptor plays the role of the type's declared members: which
/// constructors exist, which fields are injection points, and whether the
/// type is singleton-scoped. The default descriptor is empty (transient, no
/// constructors, no injection points); such a type can still be resolved
/// when a registered [`BeanConfig`](crate::BeanConfig) provides it.
///
/// # Examples
///
/// ```rust
/// use bean_ioc::{Bean, BeanDescriptor, Container, Inject, Lifetime};
/// use std::sync::Arc;
///
/// #[derive(Default)]
/// struct Pool {
///     size: usize,
/// }
/// impl Bean for Pool {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new()
///             .lifetime(Lifetime::Singleton)
///             .constructor(|| Pool { size: 4 })
///             .constructor1(|size: usize| Pool { size })
///     }
/// }
///
/// #[derive(Default)]
/// struct Repository {
///     pool: Inject<Pool>,
/// }
/// impl Bean for Repository {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new()
///             .constructor(Repository::default)
///             .inject("pool", |r: &mut Repository| &mut r.pool)
///     }
/// }
///
/// let container = Container::new();
/// let repo = container.get_bean::<Repository>().unwrap();
/// assert_eq!(repo.pool.size, 4);
/// assert!(Arc::ptr_eq(repo.pool.get().unwrap(), &container.get_bean::<Pool>().unwrap()));
/// ```
pub trait Bean: Any + Send + Sync + Sized {
    /// Declared members of the type.
    fn descriptor() -> BeanDescriptor<Self> {
        BeanDescriptor::new()
    }
}

/// Constructor visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Private,
}

/// Whether an injection point can be written after construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutability {
    Writable,
    Final,
}

type BuildFn<T> = Box<dyn Fn(Vec<Arg>) -> Result<T, BoxError> + Send + Sync>;
type InjectFn<T> = Box<dyn Fn(&Container, &mut T) -> DiResult<()> + Send + Sync>;

/// A declared constructor: parameter types, visibility and a build function.
pub struct Constructor<T> {
    params: Vec<TypeKey>,
    access: Access,
    build: BuildFn<T>,
}

impl<T: 'static> Constructor<T> {
    /// Raw constructor. `build` receives the arguments in `params` order.
    pub fn new<F>(params: Vec<TypeKey>, access: Access, build: F) -> Self
    where
        F: Fn(Vec<Arg>) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self { params, access, build: Box::new(build) }
    }
}

impl<T> Constructor<T> {
    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    pub fn access(&self) -> Access {
        self.access
    }

    pub fn is_accessible(&self) -> bool {
        self.access == Access::Public
    }

    /// Exact match on parameter types, in order.
    pub fn matches(&self, signature: &[TypeKey]) -> bool {
        self.params.as_slice() == signature
    }

    pub(crate) fn invoke(&self, args: Vec<Arg>) -> Result<T, BoxError> {
        (self.build)(args)
    }
}

impl<T> fmt::Debug for Constructor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<_> = self.params.iter().map(TypeKey::display_name).collect();
        f.debug_struct("Constructor")
            .field("params", &params)
            .field("access", &self.access)
            .finish()
    }
}

/// A declared injection point.
pub struct InjectionPoint<T> {
    field: &'static str,
    key: TypeKey,
    mutability: Mutability,
    inject: InjectFn<T>,
}

impl<T> InjectionPoint<T> {
    pub fn field(&self) -> &'static str {
        self.field
    }

    /// Declared type of the field.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub fn mutability(&self) -> Mutability {
        self.mutability
    }

    /// Resolves the declared type through `container` and writes it into `target`.
    pub(crate) fn inject(&self, container: &Container, target: &mut T) -> DiResult<()> {
        (self.inject)(container, target)
    }
}

impl<T> fmt::Debug for InjectionPoint<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectionPoint")
            .field("field", &self.field)
            .field("key", &self.key)
            .field("mutability", &self.mutability)
            .finish()
    }
}

/// Declared members of a bean type.
pub struct BeanDescriptor<T> {
    lifetime: Lifetime,
    constructors: Vec<Constructor<T>>,
    injection_points: Vec<InjectionPoint<T>>,
}

impl<T: Bean> BeanDescriptor<T> {
    /// Empty, transient descriptor.
    pub fn new() -> Self {
        Self {
            lifetime: Lifetime::Transient,
            constructors: Vec::new(),
            injection_points: Vec::new(),
        }
    }

    /// Sets the lifetime marker.
    pub fn lifetime(mut self, lifetime: Lifetime) -> Self {
        self.lifetime = lifetime;
        self
    }

    /// Shorthand for `.lifetime(Lifetime::Singleton)`.
    pub fn singleton(self) -> Self {
        self.lifetime(Lifetime::Singleton)
    }

    /// Adds a raw constructor.
    pub fn with_constructor(mut self, constructor: Constructor<T>) -> Self {
        self.constructors.push(constructor);
        self
    }

    /// Public no-argument constructor.
    pub fn constructor<F>(self, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.with_constructor(Constructor::new(Vec::new(), Access::Public, move |_| Ok(f())))
    }

    /// Fallible public no-argument constructor.
    pub fn try_constructor<F>(self, f: F) -> Self
    where
        F: Fn() -> Result<T, BoxError> + Send + Sync + 'static,
    {
        self.with_constructor(Constructor::new(Vec::new(), Access::Public, move |_| f()))
    }

    /// Private no-argument constructor; the container refuses to call it.
    pub fn private_constructor<F>(self, f: F) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        self.with_constructor(Constructor::new(Vec::new(), Access::Private, move |_| Ok(f())))
    }

    pub fn constructor1<A, F>(self, f: F) -> Self
    where
        A: Any + Send,
        F: Fn(A) -> T + Send + Sync + 'static,
    {
        self.with_constructor(Constructor::new(
            vec![key_of_type::<A>()],
            Access::Public,
            move |args| {
                let mut args = args.into_iter();
                Ok(f(next_arg(&mut args)?))
            },
        ))
    }

    pub fn constructor2<A, B, F>(self, f: F) -> Self
    where
        A: Any + Send,
        B: Any + Send,
        F: Fn(A, B) -> T + Send + Sync + 'static,
    {
        self.with_constructor(Constructor::new(
            vec![key_of_type::<A>(), key_of_type::<B>()],
            Access::Public,
            move |args| {
                let mut args = args.into_iter();
                let a = next_arg(&mut args)?;
                let b = next_arg(&mut args)?;
                Ok(f(a, b))
            },
        ))
    }

    pub fn constructor3<A, B, C, F>(self, f: F) -> Self
    where
        A: Any + Send,
        B: Any + Send,
        C: Any + Send,
        F: Fn(A, B, C) -> T + Send + Sync + 'static,
    {
        self.with_constructor(Constructor::new(
            vec![key_of_type::<A>(), key_of_type::<B>(), key_of_type::<C>()],
            Access::Public,
            move |args| {
                let mut args = args.into_iter();
                let a = next_arg(&mut args)?;
                let b = next_arg(&mut args)?;
                let c = next_arg(&mut args)?;
                Ok(f(a, b, c))
            },
        ))
    }

    /// Writable injection point of declared type `D`.
    pub fn inject<D, F>(mut self, field: &'static str, accessor: F) -> Self
    where
        D: Bean,
        F: Fn(&mut T) -> &mut Inject<D> + Send + Sync + 'static,
    {
        self.injection_points.push(InjectionPoint {
            field,
            key: key_of_type::<D>(),
            mutability: Mutability::Writable,
            inject: Box::new(move |container: &Container, target: &mut T| {
                let value = container.get_bean::<D>()?;
                accessor(target).set(value);
                Ok(())
            }),
        });
        self
    }

    /// Final injection point of declared type `D`.
    ///
    /// The dependency is still resolved, but the field cannot be written, so
    /// injecting it always fails with [`DiError::FinalField`].
    pub fn inject_final<D: Bean>(mut self, field: &'static str) -> Self {
        self.injection_points.push(InjectionPoint {
            field,
            key: key_of_type::<D>(),
            mutability: Mutability::Final,
            inject: Box::new(move |container: &Container, _: &mut T| {
                container.get_bean::<D>()?;
                Err(DiError::FinalField { bean: std::any::type_name::<T>(), field })
            }),
        });
        self
    }
}

impl<T> BeanDescriptor<T> {
    pub fn get_lifetime(&self) -> Lifetime {
        self.lifetime
    }

    pub fn constructors(&self) -> &[Constructor<T>] {
        &self.constructors
    }

    pub fn injection_points(&self) -> &[InjectionPoint<T>] {
        &self.injection_points
    }

    /// The declared no-argument constructor, accessible or not.
    pub fn no_arg_constructor(&self) -> Option<&Constructor<T>> {
        self.constructors.iter().find(|c| c.params.is_empty())
    }

    /// The public constructor whose parameters exactly equal `signature`.
    pub fn find_constructor(&self, signature: &[TypeKey]) -> Option<&Constructor<T>> {
        self.constructors
            .iter()
            .find(|c| c.is_accessible() && c.matches(signature))
    }
}

impl<T: Bean> Default for BeanDescriptor<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for BeanDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BeanDescriptor")
            .field("type", &std::any::type_name::<T>())
            .field("lifetime", &self.lifetime)
            .field("constructors", &self.constructors)
            .field("injection_points", &self.injection_points)
            .finish()
    }
}

fn next_arg<A: Any>(args: &mut std::vec::IntoIter<Arg>) -> Result<A, BoxError> {
    let arg = args.next().ok_or("missing constructor argument")?;
    let key = arg.key();
    arg.take::<A>().ok_or_else(|| {
        format!("argument of type {} does not match {}", key, std::any::type_name::<A>()).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point {
        x: i32,
        label: String,
    }

    impl Bean for Point {
        fn descriptor() -> BeanDescriptor<Self> {
            BeanDescriptor::new()
                .private_constructor(|| Point { x: 0, label: String::new() })
                .constructor2(|x: i32, label: String| Point { x, label })
                .constructor1(|x: i64| Point { x: x as i32, label: "wide".into() })
        }
    }

    #[test]
    fn find_constructor_requires_exact_signature() {
        let d = Point::descriptor();
        let sig = [key_of_type::<i32>(), key_of_type::<String>()];
        assert!(d.find_constructor(&sig).is_some());

        let swapped = [key_of_type::<String>(), key_of_type::<i32>()];
        assert!(d.find_constructor(&swapped).is_none());

        // i32 is not widened to i64
        assert!(d.find_constructor(&[key_of_type::<i32>()]).is_none());
    }

    // Read-only accessors work for any T, not only 'static ones
    fn public_arities<T>(descriptor: &BeanDescriptor<T>) -> Vec<usize> {
        descriptor
            .constructors()
            .iter()
            .filter(|c| c.is_accessible())
            .map(|c| c.params().len())
            .collect()
    }

    #[test]
    fn accessors_are_usable_without_static_bound() {
        let d = Point::descriptor();
        assert_eq!(public_arities(&d), vec![2, 1]);
        assert!(d.find_constructor(&[key_of_type::<i64>()]).unwrap().matches(&[key_of_type::<i64>()]));
    }

    #[test]
    fn private_no_arg_constructor_is_found_but_not_public() {
        let d = Point::descriptor();
        let ctor = d.no_arg_constructor().unwrap();
        assert_eq!(ctor.access(), Access::Private);
        assert!(d.find_constructor(&[]).is_none());
    }

    #[test]
    fn invoke_passes_arguments_in_order() {
        let d = Point::descriptor();
        let sig = [key_of_type::<i32>(), key_of_type::<String>()];
        let ctor = d.find_constructor(&sig).unwrap();
        let point = ctor
            .invoke(crate::args![3i32, "p".to_string()].into_vec())
            .unwrap();
        assert_eq!(point.x, 3);
        assert_eq!(point.label, "p");
    }

    #[test]
    fn default_descriptor_is_empty_and_transient() {
        struct Plain;
        impl Bean for Plain {}

        let d = Plain::descriptor();
        assert_eq!(d.get_lifetime(), Lifetime::Transient);
        assert!(d.constructors().is_empty());
        assert!(d.injection_points().is_empty());
    }
}
