//! Injection point storage.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;

/// Field slot populated by the container.
///
/// A bean declares a field of type `Inject<D>` and lists it in its
/// [`BeanDescriptor`](crate::BeanDescriptor) with
/// [`inject`](crate::BeanDescriptor::inject). The slot starts empty and is
/// filled with the resolved `Arc<D>` right after construction.
///
/// # Examples
///
/// ```rust
/// use bean_ioc::{Bean, BeanDescriptor, Container, Inject};
///
/// #[derive(Default)]
/// struct Clock;
/// impl Bean for Clock {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new().constructor(Clock::default)
///     }
/// }
///
/// #[derive(Default)]
/// struct Scheduler {
///     clock: Inject<Clock>,
/// }
/// impl Bean for Scheduler {
///     fn descriptor() -> BeanDescriptor<Self> {
///         BeanDescriptor::new()
///             .constructor(Scheduler::default)
///             .inject("clock", |s: &mut Scheduler| &mut s.clock)
///     }
/// }
///
/// let scheduler = Container::new().get_bean::<Scheduler>().unwrap();
/// assert!(scheduler.clock.is_injected());
/// ```
pub struct Inject<T: ?Sized> {
    slot: Option<Arc<T>>,
}

impl<T: ?Sized> Inject<T> {
    /// An empty slot.
    pub const fn empty() -> Self {
        Self { slot: None }
    }

    /// Returns the injected value, if any.
    pub fn get(&self) -> Option<&Arc<T>> {
        self.slot.as_ref()
    }

    pub fn is_injected(&self) -> bool {
        self.slot.is_some()
    }

    /// Overwrites the slot.
    pub fn set(&mut self, value: Arc<T>) {
        self.slot = Some(value);
    }
}

impl<T: ?Sized> Default for Inject<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: ?Sized> Clone for Inject<T> {
    fn clone(&self) -> Self {
        Self { slot: self.slot.clone() }
    }
}

impl<T: ?Sized> From<Arc<T>> for Inject<T> {
    fn from(value: Arc<T>) -> Self {
        Self { slot: Some(value) }
    }
}

/// # Panics
///
/// Dereferencing an empty slot panics. Beans handed out by the container
/// always have every writable injection point filled.
impl<T: ?Sized> Deref for Inject<T> {
    type Target = T;

    fn deref(&self) -> &T {
        match &self.slot {
            Some(value) => value.as_ref(),
            None => panic!("injection point of type {} was never injected", std::any::type_name::<T>()),
        }
    }
}

impl<T: ?Sized> fmt::Debug for Inject<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Inject")
            .field("type", &std::any::type_name::<T>())
            .field("injected", &self.is_injected())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty_and_holds_shared_value() {
        let mut slot: Inject<u32> = Inject::default();
        assert!(!slot.is_injected());

        let value = Arc::new(7u32);
        slot.set(value.clone());
        assert!(Arc::ptr_eq(slot.get().unwrap(), &value));
        assert_eq!(*slot, 7);
    }

    #[test]
    #[should_panic(expected = "never injected")]
    fn deref_of_empty_slot_panics() {
        let slot: Inject<String> = Inject::empty();
        let _ = slot.len();
    }
}
