//! Per-bucket open-addressed sub-table.

use std::collections::TryReserveError;

use tracing::trace;

use crate::dispose::Dispose;
use crate::key::Key;

/// Capacity of a bucket on its first allocation. Later growth doubles.
pub const INITIAL_BUCKET_CAPACITY: usize = 8;

pub(crate) struct Slot<V> {
    key: Key,
    value: Option<V>, // None marks the slot empty
}

impl<V> Slot<V> {
    #[inline]
    const fn empty() -> Self {
        Slot {
            key: Key {
                primary: 0,
                secondary: 0,
            },
            value: None,
        }
    }

    #[inline]
    fn is_occupied(&self) -> bool {
        self.value.is_some()
    }

    #[inline]
    fn matches(&self, key: Key) -> bool {
        self.is_occupied() && self.key == key
    }

    #[inline]
    fn clear(&mut self) -> Option<V> {
        self.key = Key::default();
        self.value.take()
    }
}

/// Snapshot of one bucket's size.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BucketStats {
    pub capacity: usize,
    pub count: usize,
}

pub(crate) struct Bucket<V> {
    slots: Vec<Slot<V>>,
    count: usize,
}

impl<V> Bucket<V> {
    pub(crate) const fn new() -> Self {
        Bucket {
            slots: Vec::new(),
            count: 0,
        }
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub(crate) fn count(&self) -> usize {
        self.count
    }

    pub(crate) fn stats(&self) -> BucketStats {
        BucketStats {
            capacity: self.capacity(),
            count: self.count,
        }
    }

    /// One more insertion must still leave an empty slot behind.
    #[inline]
    pub(crate) fn needs_grow(&self) -> bool {
        self.count + 1 >= self.capacity()
    }

    #[inline]
    pub(crate) fn next_capacity(&self) -> usize {
        match self.capacity() {
            0 => INITIAL_BUCKET_CAPACITY,
            n => n.saturating_mul(2),
        }
    }

    /// Probe order for `key`: every slot once, starting at
    /// `secondary mod capacity` and wrapping.
    #[inline]
    fn probe(&self, key: Key) -> impl Iterator<Item = usize> {
        let cap = self.capacity();
        let start = if cap == 0 {
            0
        } else {
            key.secondary as usize % cap
        };
        (0..cap).map(move |i| (start + i) % cap)
    }

    /// Full scan. Empty slots do not end the search since deletes leave
    /// holes behind without tombstones.
    fn find(&self, key: Key) -> Option<usize> {
        self.probe(key).find(|&idx| self.slots[idx].matches(key))
    }

    pub(crate) fn get(&self, key: Key) -> Option<&V> {
        let idx = self.find(key)?;
        self.slots[idx].value.as_ref()
    }

    pub(crate) fn get_mut(&mut self, key: Key) -> Option<&mut V> {
        let idx = self.find(key)?;
        self.slots[idx].value.as_mut()
    }

    /// Store `value` under `key`, returning the value it replaced.
    ///
    /// The caller grows the bucket first, so a free slot always exists.
    pub(crate) fn insert(&mut self, key: Key, value: V) -> Option<V> {
        debug_assert!(!self.needs_grow());

        let mut free = None;
        let mut hit = None;
        for idx in self.probe(key) {
            let slot = &self.slots[idx];
            if slot.matches(key) {
                hit = Some(idx);
                break;
            }
            if free.is_none() && !slot.is_occupied() {
                free = Some(idx);
            }
        }

        let idx = match hit.or(free) {
            Some(idx) => idx,
            None => unreachable!("bucket grown before insert has a free slot"),
        };
        let slot = &mut self.slots[idx];
        let old = slot.value.replace(value);
        slot.key = key;
        if old.is_none() {
            self.count += 1;
        }
        old
    }

    pub(crate) fn remove(&mut self, key: Key) -> Option<V> {
        let idx = self.find(key)?;
        let old = self.slots[idx].clear();
        self.count -= 1;
        old
    }

    /// Reallocate to `new_capacity` slots and redistribute every entry by
    /// its secondary key.
    ///
    /// Both allocations happen before anything is moved, so on error the
    /// bucket is untouched. `scratch` is empty on entry and on return; only
    /// its capacity survives between calls.
    pub(crate) fn grow(
        &mut self,
        scratch: &mut Vec<Slot<V>>,
        new_capacity: usize,
    ) -> Result<(), TryReserveError> {
        let old_capacity = self.capacity();
        debug_assert!(scratch.is_empty());
        debug_assert!(new_capacity > self.count);

        if scratch.capacity() < old_capacity {
            scratch.try_reserve_exact(old_capacity)?;
            trace!(capacity = scratch.capacity(), "scratch buffer grown");
        }

        let mut slots = Vec::new();
        slots.try_reserve_exact(new_capacity)?;
        slots.resize_with(new_capacity, Slot::empty);

        scratch.extend(self.slots.drain(..).filter(|s| s.is_occupied()));
        for slot in scratch.drain(..) {
            place(&mut slots, slot);
        }
        self.slots = slots;
        Ok(())
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (Key, &V)> {
        self.slots
            .iter()
            .filter_map(|s| s.value.as_ref().map(|v| (s.key, v)))
    }

    /// Hand every resident value to `disposer` and release the slot array.
    pub(crate) fn dispose_all<D: Dispose<V>>(&mut self, disposer: &mut D) {
        for slot in self.slots.iter_mut() {
            if let Some(value) = slot.clear() {
                disposer.dispose(value);
            }
        }
        self.slots = Vec::new();
        self.count = 0;
    }
}

/// Linear probe from `secondary mod len` to the first empty slot. Keys being
/// reinserted are already distinct, so no equality check.
fn place<V>(slots: &mut [Slot<V>], slot: Slot<V>) {
    let len = slots.len();
    let mut idx = slot.key.secondary as usize % len;
    while slots[idx].is_occupied() {
        idx = (idx + 1) % len;
    }
    slots[idx] = slot;
}
