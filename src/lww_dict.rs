use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::clock::{SystemClock, TimeSource};
use crate::concurrent_map::ConcurrentMap;
use crate::{Crdt, DeltaCrdt};

/// A value together with the time it was written.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Timestamped<V, T> {
    /// The written value.
    pub value: V,
    /// When it was written.
    pub timestamp: T,
}

impl<V, T> Timestamped<V, T> {
    /// Pair a value with its timestamp.
    pub fn new(value: V, timestamp: T) -> Self {
        Self { value, timestamp }
    }
}

/// An owned copy of a dictionary's add-set and remove-set.
///
/// This is what a transport or storage layer ships between replicas.
/// [`LwwDictionary::merge_state`] folds it into a replica exactly as
/// [`LwwDictionary::merge`] would fold in the dictionary it came from.
/// Entry order is unspecified.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ReplicaState<K, V, T> {
    /// Latest write per key.
    pub adds: Vec<(K, Timestamped<V, T>)>,
    /// Latest removal per key.
    pub removes: Vec<(K, T)>,
}

impl<K, V, T> ReplicaState<K, V, T> {
    /// Total number of add and remove entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adds.len() + self.removes.len()
    }

    /// Check if the state carries no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.adds.is_empty() && self.removes.is_empty()
    }
}

impl<K, V, T> Default for ReplicaState<K, V, T> {
    fn default() -> Self {
        Self {
            adds: Vec::new(),
            removes: Vec::new(),
        }
    }
}

/// A last-write-wins element dictionary (LWW-Element-Dictionary).
///
/// Keeps two stores: an add-set holding the latest write per key, and a
/// remove-set holding the latest removal per key. A key is present when its
/// add is strictly newer than its removal; an add and a removal with the
/// same timestamp resolve to "removed". Removals are tombstones and are
/// never discarded, so a key can be re-added with a newer timestamp.
///
/// Every method takes `&self`. Each store sits behind its own reader-writer
/// lock, so a dictionary can be shared across threads (for example in an
/// `Arc`) and mutated without external locking. Writes to one store are
/// atomic; a read that consults both stores sees each one consistently but
/// not necessarily at the same instant.
///
/// Timestamps for [`add`](Self::add) and [`remove`](Self::remove) come from
/// the dictionary's [`TimeSource`]. The `*_with_timestamp` variants take
/// them from the caller.
///
/// # Example
///
/// ```
/// use lww_dict::prelude::*;
///
/// let laptop = LwwDictionary::with_clock(ManualClock::new(0));
/// let phone = LwwDictionary::with_clock(ManualClock::new(0));
///
/// laptop.add_with_timestamp("title", "Draft", 1);
/// phone.add_with_timestamp("title", "Final", 2);
/// phone.remove_with_timestamp("notes", 3);
///
/// laptop.merge(&phone);
/// phone.merge(&laptop);
///
/// assert_eq!(laptop.lookup(&"title"), Some("Final"));
/// assert_eq!(laptop.get_all(), phone.get_all());
/// ```
pub struct LwwDictionary<K, V, C: TimeSource = SystemClock> {
    adds: ConcurrentMap<K, Timestamped<V, C::Timestamp>>,
    removes: ConcurrentMap<K, C::Timestamp>,
    clock: C,
}

impl<K: Eq + Hash + Clone, V: Clone> LwwDictionary<K, V, SystemClock> {
    /// Create an empty dictionary stamped by the system wall clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }
}

impl<K, V, C> LwwDictionary<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: TimeSource,
{
    /// Create an empty dictionary that reads default timestamps from `clock`.
    pub fn with_clock(clock: C) -> Self {
        Self {
            adds: ConcurrentMap::new(),
            removes: ConcurrentMap::new(),
            clock,
        }
    }

    /// The time source used for default timestamps.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Record a write stamped with the current time.
    ///
    /// Returns `true` if the write was recorded.
    pub fn add(&self, key: K, value: V) -> bool {
        let timestamp = self.clock.now();
        self.add_with_timestamp(key, value, timestamp)
    }

    /// Record a write with an explicit timestamp.
    ///
    /// The write is discarded if the key already holds a strictly newer
    /// write. On equal timestamps the new write replaces the old one.
    /// Returns `true` if the write was recorded.
    pub fn add_with_timestamp(&self, key: K, value: V, timestamp: C::Timestamp) -> bool {
        let accepted = self.adds.upsert(key, |existing| {
            if supersedes(existing.map(|e| &e.timestamp), &timestamp) {
                Some(Timestamped::new(value, timestamp))
            } else {
                None
            }
        });
        if !accepted {
            trace!("discarded add older than the recorded write");
        }
        accepted
    }

    /// Record a removal stamped with the current time.
    ///
    /// Returns `true` if the removal was recorded.
    pub fn remove(&self, key: &K) -> bool {
        let timestamp = self.clock.now();
        self.remove_with_timestamp(key.clone(), timestamp)
    }

    /// Record a removal with an explicit timestamp.
    ///
    /// Follows the same rule as [`add_with_timestamp`](Self::add_with_timestamp)
    /// against the remove-set. The key does not need to have been added.
    pub fn remove_with_timestamp(&self, key: K, timestamp: C::Timestamp) -> bool {
        let accepted = self.removes.upsert(key, |existing| {
            if supersedes(existing, &timestamp) {
                Some(timestamp)
            } else {
                None
            }
        });
        if !accepted {
            trace!("discarded remove older than the recorded tombstone");
        }
        accepted
    }

    /// Get the current value for `key`, if it is present.
    ///
    /// Absent when the key was never added, or its latest removal is at
    /// least as new as its latest write.
    #[must_use]
    pub fn lookup(&self, key: &K) -> Option<V> {
        let entry = self.adds.get(key)?;
        let removed_at = self.removes.get(key);
        is_live(&entry.timestamp, removed_at.as_ref()).then_some(entry.value)
    }

    /// Check if `key` is present, without copying its value.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        let Some(added_at) = self.add_timestamp(key) else {
            return false;
        };
        let removed_at = self.removes.get(key);
        is_live(&added_at, removed_at.as_ref())
    }

    /// Materialize every present key and its value.
    ///
    /// Agrees with [`lookup`](Self::lookup) for every key.
    #[must_use]
    pub fn get_all(&self) -> HashMap<K, V> {
        self.adds.read_with(|adds| {
            self.removes.read_with(|removes| {
                adds.iter()
                    .filter(|(key, entry)| is_live(&entry.timestamp, removes.get(*key)))
                    .map(|(key, entry)| (key.clone(), entry.value.clone()))
                    .collect()
            })
        })
    }

    /// Number of present keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.adds.read_with(|adds| {
            self.removes.read_with(|removes| {
                adds.iter()
                    .filter(|(key, entry)| is_live(&entry.timestamp, removes.get(*key)))
                    .count()
            })
        })
    }

    /// Check if no key is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Timestamp of the latest recorded write for `key`, present or not.
    #[must_use]
    pub fn add_timestamp(&self, key: &K) -> Option<C::Timestamp> {
        self.adds.read_with(|adds| adds.get(key).map(|e| e.timestamp.clone()))
    }

    /// Timestamp of the latest recorded removal for `key`.
    #[must_use]
    pub fn remove_timestamp(&self, key: &K) -> Option<C::Timestamp> {
        self.removes.get(key)
    }

    /// Number of entries in the add-set, including logically removed keys.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.adds.len()
    }

    /// Number of entries in the remove-set.
    #[must_use]
    pub fn tombstone_count(&self) -> usize {
        self.removes.len()
    }

    /// Pull another replica's state into this one.
    ///
    /// Each incoming entry is accepted under the same rule as a local
    /// write: skipped if the local timestamp is strictly newer, otherwise
    /// it replaces the local entry. `other` is not modified, so two
    /// replicas converge once each has merged the other.
    pub fn merge(&self, other: &Self) {
        // Copy first: `other` may be `self`.
        let adds = other.adds.snapshot();
        let removes = other.removes.snapshot();
        self.apply(adds, removes);
    }

    /// Fold an exported [`ReplicaState`] into this replica.
    pub fn merge_state(&self, state: &ReplicaState<K, V, C::Timestamp>) {
        self.apply(state.adds.iter().cloned(), state.removes.iter().cloned());
    }

    /// Export a copy of the add-set and remove-set.
    #[must_use]
    pub fn state(&self) -> ReplicaState<K, V, C::Timestamp> {
        ReplicaState {
            adds: self.adds.snapshot().into_iter().collect(),
            removes: self.removes.snapshot().into_iter().collect(),
        }
    }

    fn apply<A, R>(&self, adds: A, removes: R)
    where
        A: IntoIterator<Item = (K, Timestamped<V, C::Timestamp>)>,
        R: IntoIterator<Item = (K, C::Timestamp)>,
    {
        let added = self.adds.extend_with(adds, |existing, incoming| {
            supersedes(existing.map(|e| &e.timestamp), &incoming.timestamp)
        });
        let removed = self.removes.extend_with(removes, |existing, incoming| {
            supersedes(existing, incoming)
        });
        debug!(added, removed, "merged replica state");
    }
}

/// Acceptance rule shared by local writes and merges: an incoming timestamp
/// replaces the recorded one unless the recorded one is strictly newer.
fn supersedes<T: Ord>(existing: Option<&T>, incoming: &T) -> bool {
    existing.map_or(true, |current| current <= incoming)
}

/// A write is visible only if it is strictly newer than the latest removal.
fn is_live<T: Ord>(added_at: &T, removed_at: Option<&T>) -> bool {
    removed_at.map_or(true, |removed| added_at > removed)
}

impl<K, V> Default for LwwDictionary<K, V, SystemClock>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C> Clone for LwwDictionary<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: TimeSource + Clone,
{
    fn clone(&self) -> Self {
        Self {
            adds: self.adds.clone(),
            removes: self.removes.clone(),
            clock: self.clock.clone(),
        }
    }
}

/// Two replicas are equal when their add-sets and remove-sets match. The
/// clocks are not compared.
impl<K, V, C> PartialEq for LwwDictionary<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone + PartialEq,
    C: TimeSource,
{
    fn eq(&self, other: &Self) -> bool {
        self.adds.snapshot() == other.adds.snapshot()
            && self.removes.snapshot() == other.removes.snapshot()
    }
}

impl<K, V, C> fmt::Debug for LwwDictionary<K, V, C>
where
    K: fmt::Debug,
    V: fmt::Debug,
    C: TimeSource,
    C::Timestamp: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LwwDictionary")
            .field("adds", &self.adds)
            .field("removes", &self.removes)
            .finish_non_exhaustive()
    }
}

impl<K, V, C> Crdt for LwwDictionary<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone,
    C: TimeSource,
{
    fn merge(&mut self, other: &Self) {
        LwwDictionary::merge(self, other);
    }
}

impl<K, V, C> DeltaCrdt for LwwDictionary<K, V, C>
where
    K: Eq + Hash + Clone,
    V: Clone + PartialEq,
    C: TimeSource,
{
    type Delta = ReplicaState<K, V, C::Timestamp>;

    fn delta(&self, other: &Self) -> Self::Delta {
        let ours = self.state();
        let adds = other.adds.read_with(|theirs| {
            ours.adds
                .into_iter()
                .filter(|(key, entry)| match theirs.get(key) {
                    None => true,
                    Some(known) => {
                        known.timestamp < entry.timestamp
                            || (known.timestamp == entry.timestamp && known.value != entry.value)
                    }
                })
                .collect()
        });
        let removes = other.removes.read_with(|theirs| {
            ours.removes
                .into_iter()
                .filter(|(key, removed_at)| theirs.get(key).map_or(true, |t| t < removed_at))
                .collect()
        });
        ReplicaState { adds, removes }
    }

    fn apply_delta(&mut self, delta: &Self::Delta) {
        self.merge_state(delta);
    }
}
