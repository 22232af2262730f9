use std::collections::hash_map::{self, Entry};
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use parking_lot::RwLock;

/// A hash map that can be shared between threads without external locking.
///
/// Readers proceed in parallel. Every mutation takes the write lock for its
/// whole duration, so no reader ever sees a half-applied change, and each
/// call returns only after its effect is visible. Operations issued by one
/// thread are therefore observed in the order they were issued.
///
/// Bulk reads ([`values`](Self::values), [`snapshot`](Self::snapshot) and
/// iteration) copy the map under a single read lock and hand back an owned
/// snapshot of one moment, so concurrent writers can never invalidate them.
///
/// # Example
///
/// ```
/// use lww_dict::ConcurrentMap;
///
/// let map = ConcurrentMap::new();
/// map.set("a", 1);
/// map.set("b", 2);
///
/// assert_eq!(map.get(&"a"), Some(1));
/// assert_eq!(map.len(), 2);
///
/// map.remove(&"a");
/// assert!(!map.contains_key(&"a"));
/// ```
pub struct ConcurrentMap<K, V> {
    inner: RwLock<HashMap<K, V>>,
}

impl<K: Eq + Hash, V> ConcurrentMap<K, V> {
    /// Create a new empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn set(&self, key: K, value: V) -> Option<V> {
        self.inner.write().insert(key, value)
    }

    /// Remove a key, returning its value if it was present.
    pub fn remove(&self, key: &K) -> Option<V> {
        self.inner.write().remove(key)
    }

    /// Check if a key is present.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner.read().contains_key(key)
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    /// Check if the map has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Remove every entry.
    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Atomically read, decide and write a single key.
    ///
    /// `decide` sees the current value (if any) while the write lock is held.
    /// Returning `Some(new)` stores `new`; returning `None` leaves the entry
    /// as it was. Returns `true` if a value was written.
    pub fn upsert<F>(&self, key: K, decide: F) -> bool
    where
        F: FnOnce(Option<&V>) -> Option<V>,
    {
        let mut map = self.inner.write();
        match map.entry(key) {
            Entry::Occupied(mut entry) => match decide(Some(entry.get())) {
                Some(value) => {
                    entry.insert(value);
                    true
                }
                None => false,
            },
            Entry::Vacant(entry) => match decide(None) {
                Some(value) => {
                    entry.insert(value);
                    true
                }
                None => false,
            },
        }
    }

    /// Apply a batch of candidate entries under a single write lock.
    ///
    /// Each candidate is stored only if `accept(existing, candidate)` returns
    /// `true`. Readers observe either none or all of the batch. Returns the
    /// number of entries written.
    pub fn extend_with<I, F>(&self, entries: I, mut accept: F) -> usize
    where
        I: IntoIterator<Item = (K, V)>,
        F: FnMut(Option<&V>, &V) -> bool,
    {
        let mut map = self.inner.write();
        let mut written = 0;
        for (key, value) in entries {
            match map.entry(key) {
                Entry::Occupied(mut entry) => {
                    if accept(Some(entry.get()), &value) {
                        entry.insert(value);
                        written += 1;
                    }
                }
                Entry::Vacant(entry) => {
                    if accept(None, &value) {
                        entry.insert(value);
                        written += 1;
                    }
                }
            }
        }
        written
    }

    /// Run `f` against the map under the read lock.
    ///
    /// Lets callers inspect entries without cloning them. Keep `f` short:
    /// writers wait until it returns.
    pub fn read_with<R>(&self, f: impl FnOnce(&HashMap<K, V>) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<K: Eq + Hash, V: Clone> ConcurrentMap<K, V> {
    /// Get a copy of the value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<V> {
        self.inner.read().get(key).cloned()
    }

    /// Copy out every value as of a single moment.
    #[must_use]
    pub fn values(&self) -> Vec<V> {
        self.inner.read().values().cloned().collect()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> ConcurrentMap<K, V> {
    /// Copy out the whole map as of a single moment.
    #[must_use]
    pub fn snapshot(&self) -> HashMap<K, V> {
        self.inner.read().clone()
    }
}

impl<K: Eq + Hash, V> Default for ConcurrentMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash + Clone, V: Clone> Clone for ConcurrentMap<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: RwLock::new(self.snapshot()),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for ConcurrentMap<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.inner.read().iter()).finish()
    }
}

impl<K: Eq + Hash, V> FromIterator<(K, V)> for ConcurrentMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            inner: RwLock::new(HashMap::from_iter(iter)),
        }
    }
}

impl<'a, K: Eq + Hash + Clone, V: Clone> IntoIterator for &'a ConcurrentMap<K, V> {
    type Item = (K, V);
    type IntoIter = hash_map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshot().into_iter()
    }
}
