//! # lww-dict
//!
//! A thread-safe Last-Write-Wins element dictionary CRDT.
//!
//! A CRDT (Conflict-free Replicated Data Type) is a data structure that can be
//! replicated across multiple devices and updated independently. When replicas
//! are merged, they are guaranteed to converge to the same state without
//! requiring coordination or consensus.
//!
//! [`LwwDictionary`] is a key-value map built from two sets: the latest write
//! per key and the latest removal per key. Which one a lookup honours is
//! decided purely by comparing their timestamps, so replicas that accepted
//! writes and removals independently reconcile by merging.
//!
//! ## Quick Start
//!
//! ```
//! use lww_dict::prelude::*;
//!
//! let alice = LwwDictionary::with_clock(ManualClock::new(0));
//! let bob = LwwDictionary::with_clock(ManualClock::new(0));
//!
//! alice.add_with_timestamp("color", "red", 1);
//! bob.add_with_timestamp("color", "blue", 2);
//! bob.remove_with_timestamp("size", 3);
//! alice.add_with_timestamp("size", "L", 4);
//!
//! alice.merge(&bob);
//! bob.merge(&alice);
//!
//! assert_eq!(alice.lookup(&"color"), Some("blue"));
//! assert_eq!(alice.lookup(&"size"), Some("L"));
//! assert_eq!(alice.get_all(), bob.get_all());
//! ```
//!
//! ## Conflict resolution
//!
//! - A write is dropped if the key already holds a strictly newer write;
//!   on equal timestamps the newer call (or the incoming replica) wins.
//! - Removals follow the same rule against the remove-set.
//! - A key is present only if its write is strictly newer than its removal:
//!   a write and a removal with the same timestamp resolve to "removed".
//!
//! ## Concurrency
//!
//! Every operation takes `&self`. Share a dictionary between threads with an
//! `Arc`; the add-set and the remove-set are each a [`ConcurrentMap`] behind
//! its own reader-writer lock.
//!
//! ## Timestamps
//!
//! Default timestamps come from an injected [`clock::TimeSource`]. Nothing
//! synchronizes clocks across replicas: if they can drift apart, pass your
//! own timestamps.
//!
//! ## The `Crdt` Trait
//!
//! [`LwwDictionary`] implements [`Crdt`] and [`DeltaCrdt`], so it can be
//! driven by generic replication code.

#![warn(missing_docs)]

mod concurrent_map;
mod crdt;
mod lww_dict;
#[cfg(feature = "wasm")]
mod wasm;

pub mod clock;
pub mod prelude;

pub use concurrent_map::ConcurrentMap;
pub use crdt::{Crdt, DeltaCrdt};
pub use lww_dict::{LwwDictionary, ReplicaState, Timestamped};
