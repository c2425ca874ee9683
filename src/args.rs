//! Constructor arguments.

use std::any::Any;

use crate::key::{key_of_type, TypeKey};

/// A single constructor argument tagged with its runtime type.
pub struct Arg {
    key: TypeKey,
    value: Box<dyn Any + Send>,
}

impl Arg {
    /// Wraps `value`; its key is exactly `T`, with no widening of any kind.
    pub fn new<T: Any + Send>(value: T) -> Self {
        Self {
            key: key_of_type::<T>(),
            value: Box::new(value),
        }
    }

    /// Runtime type of the argument.
    pub fn key(&self) -> TypeKey {
        self.key
    }

    pub(crate) fn take<T: Any>(self) -> Option<T> {
        self.value.downcast::<T>().ok().map(|b| *b)
    }
}

impl std::fmt::Debug for Arg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("Arg").field(&self.key.display_name()).finish()
    }
}

/// Ordered constructor arguments.
///
/// Build with the [`args!`](crate::args!) macro. The list of runtime keys is
/// the signature used to select a constructor.
///
/// ```rust
/// use bean_ioc::{args, key_of_type};
///
/// let args = args![7i32, String::from("seven")];
/// assert_eq!(args.len(), 2);
/// assert_eq!(args.signature(), vec![key_of_type::<i32>(), key_of_type::<String>()]);
/// ```
#[derive(Debug, Default)]
pub struct Args {
    items: Vec<Arg>,
}

impl Args {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Appends an argument.
    pub fn push<T: Any + Send>(&mut self, value: T) {
        self.items.push(Arg::new(value));
    }

    /// Builder form of [`push`](Self::push).
    pub fn with<T: Any + Send>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Runtime keys of all arguments, in order.
    pub fn signature(&self) -> Vec<TypeKey> {
        self.items.iter().map(Arg::key).collect()
    }

    pub(crate) fn into_vec(self) -> Vec<Arg> {
        self.items
    }
}

/// Builds [`Args`] from a list of values.
///
/// ```rust
/// use bean_ioc::args;
///
/// assert!(args![].is_empty());
/// assert_eq!(args![1u8, 2u16, "three"].len(), 3);
/// ```
#[macro_export]
macro_rules! args {
    () => { $crate::Args::new() };
    ($($value:expr),+ $(,)?) => {{
        let mut args = $crate::Args::new();
        $( args.push($value); )+
        args
    }};
}
