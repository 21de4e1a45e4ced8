//! Bounded lookup caches.
//!
//! Each cache is an LRU map behind its own mutex. The lock is taken for a
//! single map access only; it is never held while the image or a DAWG is
//! being traversed, so concurrent readers do not serialize on each other's
//! lookups. Cache contents are pure functions of the image, which makes the
//! caches observationally transparent.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::{Mutex, PoisonError};

use lru::LruCache;

pub(crate) struct LookupCache<K, V> {
    inner: Mutex<LruCache<K, V>>,
}

impl<K: Hash + Eq, V: Clone> LookupCache<K, V> {
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner: Mutex::new(LruCache::new(capacity)),
        }
    }

    pub(crate) fn get(&self, key: &K) -> Option<V> {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub(crate) fn put(&self, key: K, value: V) {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .put(key, value);
    }
}
