/// A state-based replicated data type.
///
/// Replicas are updated independently and reconciled by merging their
/// states. Merging never fails and never needs coordination.
///
/// # Properties
///
/// All implementations must satisfy:
/// - **Commutativity:** `a.merge(b); b.merge(a)` leaves `a` and `b` observably equal
/// - **Associativity:** the grouping of a sequence of merges does not matter
/// - **Idempotency:** merging the same state twice changes nothing the second time
pub trait Crdt {
    /// Merge another replica's state into this one.
    ///
    /// This is a one-directional pull: `other` is only read. Two replicas
    /// converge once each has merged the other.
    fn merge(&mut self, other: &Self);
}

/// Extension trait for replicas that can ship only what a peer is missing.
///
/// # Example
///
/// ```
/// use lww_dict::prelude::*;
///
/// let a = LwwDictionary::with_clock(ManualClock::new(1));
/// a.add_with_timestamp("x", 1, 10);
/// a.add_with_timestamp("y", 2, 10);
///
/// let mut b = LwwDictionary::with_clock(ManualClock::new(1));
/// b.add_with_timestamp("x", 1, 10);
///
/// // Only "y" needs to travel
/// let delta = a.delta(&b);
/// assert_eq!(delta.len(), 1);
///
/// b.apply_delta(&delta);
/// assert_eq!(b.get_all(), a.get_all());
/// ```
pub trait DeltaCrdt: Crdt {
    /// The type of delta produced by this CRDT.
    type Delta;

    /// Generate a delta containing changes in `self` that `other` does not have.
    ///
    /// Applying the delta to `other` must have the same effect as merging
    /// all of `self` into it.
    fn delta(&self, other: &Self) -> Self::Delta;

    /// Apply a delta to this replica's state.
    fn apply_delta(&mut self, delta: &Self::Delta);
}
