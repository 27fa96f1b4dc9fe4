//! Lock-free primitives for idempotent, race-tolerant one-time initialization.
//!
//! Both halves of this crate share one structural problem: shared mutable state that is
//! expensive to produce, computed on first demand, and potentially initialized by several
//! worker threads at once. Neither half takes a lock for it. The two primitives here are the
//! whole mechanism:
//!
//! - [`FlagSet`] - an append-only atomic bitset. Racing writers merge with a bitwise OR, so
//!   the result is the same regardless of interleaving. Used by the memoized method-flag
//!   cache, where recomputing a tier twice yields identical bits.
//! - [`FixupSlot`] - an atomic optional pointer-sized value with an explicit present/absent
//!   state and a compare-exchange primitive. Used by the native fixup cells, where a library
//!   handle must be installed by exactly one of the racing threads.
//!
//! # Ordering Guarantees
//!
//! Both types are monotonic: once a bit or value is observed set by any thread, it is fully
//! computed and never reverts to unset. Fields never transition more than once from the
//! reader's point of view.

use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};

/// An append-only atomic bitset.
///
/// Bits are added with [`FlagSet::merge`] and never removed. Because metadata is immutable
/// for the process lifetime, racing threads that recompute the same derived bits store
/// identical values, and an OR-merge makes the interleaving irrelevant.
#[derive(Debug, Default)]
pub struct FlagSet(AtomicU32);

impl FlagSet {
    /// Creates an empty flag set.
    #[must_use]
    pub const fn new() -> Self {
        FlagSet(AtomicU32::new(0))
    }

    /// Returns the currently stored bits.
    #[must_use]
    pub fn load(&self) -> u32 {
        self.0.load(Ordering::Relaxed)
    }

    /// Merges `bits` into the stored value and returns the merged result.
    ///
    /// Add, never remove, never overwrite: concurrent merges commute, so every caller
    /// observes a superset of its own contribution.
    pub fn merge(&self, bits: u32) -> u32 {
        self.0.fetch_or(bits, Ordering::Relaxed) | bits
    }
}

/// An atomic, optional pointer-sized value that transitions at most once from absent to
/// present.
///
/// This replaces the raw "zero means unresolved" sentinel fields of emitted fixup cells with
/// an explicit present/absent state. The absent state is only ever left, never re-entered.
///
/// Two write primitives cover the two race disciplines resolution code needs:
///
/// - [`FixupSlot::install`] - compare-exchange; exactly one racing writer wins, and the
///   losers learn the winning value so they can release whatever they produced redundantly.
/// - [`FixupSlot::store`] - plain overwrite; only valid when every racing writer computes
///   the same value, as with a symbol address resolved twice from the same live library
///   handle. Redundant identical writes need no reconciliation.
#[derive(Debug, Default)]
pub struct FixupSlot(AtomicUsize);

impl FixupSlot {
    /// Creates an empty (unresolved) slot.
    #[must_use]
    pub const fn new() -> Self {
        FixupSlot(AtomicUsize::new(0))
    }

    /// Returns the stored value, or `None` while the slot is unresolved.
    #[must_use]
    pub fn get(&self) -> Option<NonZeroUsize> {
        NonZeroUsize::new(self.0.load(Ordering::Acquire))
    }

    /// Attempts to install `value` into an empty slot.
    ///
    /// Returns `Ok(value)` if this caller won the race, or `Err(existing)` with the value
    /// another thread installed first. A loser must release any resource backing its own
    /// redundant `value`.
    ///
    /// # Errors
    /// Returns the previously installed value when the slot was already resolved.
    pub fn install(&self, value: NonZeroUsize) -> Result<NonZeroUsize, NonZeroUsize> {
        match self
            .0
            .compare_exchange(0, value.get(), Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => Ok(value),
            Err(existing) => {
                // compare_exchange only fails against a non-zero published value
                Err(NonZeroUsize::new(existing).unwrap_or(value))
            }
        }
    }

    /// Stores `value`, overwriting any previous value.
    ///
    /// Only valid for fields where all racing writers produce an identical value; the slot
    /// still transitions from absent to one steady value, it just tolerates the transition
    /// being written more than once.
    pub fn store(&self, value: NonZeroUsize) {
        self.0.store(value.get(), Ordering::Release);
    }
}
