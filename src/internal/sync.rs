//! Lock and map types shared by the registry and the singleton cache.
//!
//! With `parking-lot` the locks never poison; the std fallback recovers the
//! guard from a poisoned lock, since every critical section here is a single
//! map operation that cannot leave the map half-updated.

use std::collections::HashMap;

#[cfg(feature = "ahash")]
pub(crate) type Map<K, V> = HashMap<K, V, ahash::RandomState>;
#[cfg(not(feature = "ahash"))]
pub(crate) type Map<K, V> = HashMap<K, V>;

pub(crate) fn new_map<K, V>() -> Map<K, V> {
    Map::default()
}

#[cfg(feature = "parking-lot")]
pub(crate) struct RwLock<T>(parking_lot::RwLock<T>);

#[cfg(feature = "parking-lot")]
impl<T> RwLock<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(parking_lot::RwLock::new(value))
    }

    pub(crate) fn read(&self) -> parking_lot::RwLockReadGuard<'_, T> {
        self.0.read()
    }

    pub(crate) fn write(&self) -> parking_lot::RwLockWriteGuard<'_, T> {
        self.0.write()
    }
}

#[cfg(not(feature = "parking-lot"))]
pub(crate) struct RwLock<T>(std::sync::RwLock<T>);

#[cfg(not(feature = "parking-lot"))]
impl<T> RwLock<T> {
    pub(crate) fn new(value: T) -> Self {
        Self(std::sync::RwLock::new(value))
    }

    pub(crate) fn read(&self) -> std::sync::RwLockReadGuard<'_, T> {
        self.0.read().unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    pub(crate) fn write(&self) -> std::sync::RwLockWriteGuard<'_, T> {
        self.0.write().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl<T: Default> Default for RwLock<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}
