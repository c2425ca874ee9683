//! Sharded singleton cache.
//!
//! Plain key-value storage for singleton-scoped beans. Every operation takes
//! one shard lock for one map access; construction never happens under a
//! lock, so two threads resolving the same cold singleton may both build an
//! instance. [`SingletonPolicy`] decides which of them the cache keeps.

use std::any::Any;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use crate::config::SingletonPolicy;
use crate::internal::sync::{new_map, Map, RwLock};
use crate::key::TypeKey;

/// Type-erased shared instance
pub type AnyArc = Arc<dyn Any + Send + Sync>;

/// Number of shards. Powers of 2 work best for hash distribution.
const SHARD_COUNT: usize = 16;

/// Thread-safe `TypeKey -> instance` map.
///
/// # Examples
///
/// ```
/// use bean_ioc::{key_of_type, AnyArc, SingletonCache, SingletonPolicy};
/// use std::sync::Arc;
///
/// let cache = SingletonCache::new();
/// let key = key_of_type::<u32>();
/// assert!(!cache.contains_key(&key));
///
/// let first: AnyArc = Arc::new(1u32);
/// cache.put(key, first.clone(), SingletonPolicy::LastWriteWins);
///
/// // Last write wins: the second value replaces the first
/// let second: AnyArc = Arc::new(2u32);
/// let stored = cache.put(key, second.clone(), SingletonPolicy::LastWriteWins);
/// assert!(Arc::ptr_eq(&stored, &second));
///
/// // First write wins: the cached value is kept and handed back
/// let third: AnyArc = Arc::new(3u32);
/// let stored = cache.put(key, third, SingletonPolicy::FirstWriteWins);
/// assert!(Arc::ptr_eq(&stored, &second));
/// ```
pub struct SingletonCache {
    shards: [RwLock<Map<TypeKey, AnyArc>>; SHARD_COUNT],
}

impl SingletonCache {
    pub fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| RwLock::new(new_map())),
        }
    }

    pub fn contains_key(&self, key: &TypeKey) -> bool {
        self.shard(key).read().contains_key(key)
    }

    pub fn get(&self, key: &TypeKey) -> Option<AnyArc> {
        self.shard(key).read().get(key).cloned()
    }

    /// Stores `value` under `key` and returns the instance the cache now holds.
    ///
    /// With [`SingletonPolicy::LastWriteWins`] that is always `value`; with
    /// [`SingletonPolicy::FirstWriteWins`] an existing entry is kept and
    /// returned instead.
    pub fn put(&self, key: TypeKey, value: AnyArc, policy: SingletonPolicy) -> AnyArc {
        let mut shard = self.shard(&key).write();
        match policy {
            SingletonPolicy::LastWriteWins => {
                let evicted = shard.insert(key, value.clone());
                // The evicted instance may run a Drop that reads the cache
                drop(shard);
                drop(evicted);
                value
            }
            SingletonPolicy::FirstWriteWins => shard.entry(key).or_insert(value).clone(),
        }
    }

    /// Number of cached singletons.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| shard.read().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every cached singleton.
    ///
    /// Intended for tests: beans still holding the old instances keep them,
    /// so a singleton resolved after `clear` is a different instance.
    pub fn clear(&self) {
        for shard in &self.shards {
            let evicted: Vec<AnyArc> = shard.write().drain().map(|(_, value)| value).collect();
            drop(evicted);
        }
    }

    fn shard(&self, key: &TypeKey) -> &RwLock<Map<TypeKey, AnyArc>> {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        &self.shards[(hasher.finish() as usize) % SHARD_COUNT]
    }
}

impl Default for SingletonCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SingletonCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SingletonCache")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::key_of_type;
    use std::thread;

    struct A;
    struct B;

    #[test]
    fn keys_are_independent() {
        let cache = SingletonCache::new();
        cache.put(key_of_type::<A>(), Arc::new(A), SingletonPolicy::LastWriteWins);
        assert!(cache.contains_key(&key_of_type::<A>()));
        assert!(!cache.contains_key(&key_of_type::<B>()));
        assert_eq!(cache.len(), 1);
        assert!(cache.get(&key_of_type::<A>()).unwrap().downcast::<A>().is_ok());
    }

    #[test]
    fn clear_empties_every_shard() {
        let cache = SingletonCache::new();
        cache.put(key_of_type::<A>(), Arc::new(A), SingletonPolicy::LastWriteWins);
        cache.put(key_of_type::<B>(), Arc::new(B), SingletonPolicy::LastWriteWins);
        cache.clear();
        assert!(cache.is_empty());
    }

    struct TouchesCacheOnDrop {
        cache: Arc<SingletonCache>,
    }

    impl Drop for TouchesCacheOnDrop {
        fn drop(&mut self) {
            let _ = self.cache.contains_key(&key_of_type::<A>());
        }
    }

    #[test]
    fn evicted_value_is_dropped_outside_the_shard_lock() {
        let cache = Arc::new(SingletonCache::new());
        let key = key_of_type::<A>();

        cache.put(key, Arc::new(TouchesCacheOnDrop { cache: cache.clone() }), SingletonPolicy::LastWriteWins);
        // Replacing the only reference runs its Drop, which reads the same shard
        cache.put(key, Arc::new(A), SingletonPolicy::LastWriteWins);
        assert!(cache.get(&key).unwrap().downcast::<A>().is_ok());

        cache.put(key, Arc::new(TouchesCacheOnDrop { cache: cache.clone() }), SingletonPolicy::LastWriteWins);
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn first_write_wins_under_contention() {
        let cache = Arc::new(SingletonCache::new());
        let handles: Vec<_> = (0..8u32)
            .map(|i| {
                let cache = cache.clone();
                thread::spawn(move || {
                    cache.put(key_of_type::<u32>(), Arc::new(i), SingletonPolicy::FirstWriteWins)
                })
            })
            .collect();

        let stored: Vec<AnyArc> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        let winner = cache.get(&key_of_type::<u32>()).unwrap();
        for value in &stored {
            assert!(Arc::ptr_eq(value, &winner));
        }
    }
}
