// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! Proxy records and collision filtering.
//!
//! A proxy is the broad-phase's handle for one client box. All proxies live
//! in a dense slot array owned by the facade; slot 0 is the sentinel. A
//! proxy stores its AABB, its filter, back-references into both endpoint
//! arrays, and a small fixed array of pair-table indices (its live overlap
//! set). Back-references are plain indices; there is no pointer graph.

use crate::types::aabb::{Aabb, NUM_AXES};

/// Number of simultaneous overlaps a single proxy can participate in.
pub const MAX_OVERLAPS_PER_ENTITY: usize = 10;

/// Marker stored in empty overlap slots.
pub const INVALID_PAIR_ID: i32 = -1;

/// Opaque handle for a registered proxy.
///
/// Minted by [`SweepPrune::add`](crate::broad::sweep::SweepPrune::add). The
/// value doubles as the proxy's slot index and as the id packed into
/// endpoint and pair words; a swap-with-last removal renames the moved
/// proxy, which [`remove`](crate::broad::sweep::SweepPrune::remove) reports
/// back to the caller.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ProxyId(u16);

impl ProxyId {
    pub(crate) fn from_value(value: u16) -> Self {
        Self(value)
    }

    /// Returns the raw id value (also the proxy-table slot index).
    #[inline]
    #[must_use]
    pub fn value(self) -> u16 {
        self.0
    }

    pub(crate) fn index(self) -> usize {
        usize::from(self.0)
    }
}

/// Collision-rule bitmasks deciding which proxy pairs may ever collide.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CollisionFilter {
    /// Category bits this proxy belongs to.
    pub group: u16,
    /// Category bits this proxy is willing to collide with.
    pub mask: u16,
}

impl Default for CollisionFilter {
    /// One category, colliding with everything.
    fn default() -> Self {
        Self {
            group: 0x0001,
            mask: 0xffff,
        }
    }
}

impl CollisionFilter {
    /// Constructs a filter from explicit group and mask bits.
    #[must_use]
    pub fn new(group: u16, mask: u16) -> Self {
        Self { group, mask }
    }

    /// Returns `true` if this filter can never produce a collision
    /// (`group == 0` or `mask == 0`); such proxies are rejected at `add`.
    #[must_use]
    pub fn is_inert(self) -> bool {
        self.group == 0 || self.mask == 0
    }

    /// Two-way filter rule: each side's group must intersect the other's
    /// mask.
    #[must_use]
    pub fn needs_collision(self, other: Self) -> bool {
        (self.group & other.mask) != 0 && (other.group & self.mask) != 0
    }
}

/// One live box as the broad-phase tracks it.
#[derive(Clone, Debug)]
pub struct Proxy {
    pub(crate) aabb: Aabb,
    pub(crate) filter: CollisionFilter,
    /// Index of this proxy's min endpoint in each axis array.
    pub(crate) min_ep: [usize; NUM_AXES],
    /// Index of this proxy's max endpoint in each axis array.
    pub(crate) max_ep: [usize; NUM_AXES],
    /// Pair-table indices of the overlaps containing this proxy;
    /// [`INVALID_PAIR_ID`] in empty slots.
    pub(crate) overlaps: [i32; MAX_OVERLAPS_PER_ENTITY],
}

impl Proxy {
    pub(crate) fn new(aabb: Aabb, filter: CollisionFilter) -> Self {
        Self {
            aabb,
            filter,
            min_ep: [0; NUM_AXES],
            max_ep: [0; NUM_AXES],
            overlaps: [INVALID_PAIR_ID; MAX_OVERLAPS_PER_ENTITY],
        }
    }

    /// The reserved slot-0 proxy whose endpoints guard both ends of each
    /// axis array. Its filter is inert so it can never pair with anything.
    pub(crate) fn sentinel() -> Self {
        Self {
            aabb: Aabb::new(0, 0, 0, 0),
            filter: CollisionFilter::new(0, 0),
            min_ep: [0; NUM_AXES],
            max_ep: [1; NUM_AXES],
            overlaps: [INVALID_PAIR_ID; MAX_OVERLAPS_PER_ENTITY],
        }
    }

    /// Returns the proxy's current AABB.
    #[must_use]
    pub fn aabb(&self) -> Aabb {
        self.aabb
    }

    /// Returns the proxy's collision filter.
    #[must_use]
    pub fn filter(&self) -> CollisionFilter {
        self.filter
    }

    /// Raw overlap slots: pair-table indices, [`INVALID_PAIR_ID`] when empty.
    #[must_use]
    pub fn overlap_slots(&self) -> &[i32; MAX_OVERLAPS_PER_ENTITY] {
        &self.overlaps
    }

    /// Indices of this proxy's (min, max) endpoint words in the given axis
    /// array. Diagnostic surface; the sort kernels keep these current.
    #[must_use]
    pub fn endpoint_indices(&self, axis: usize) -> (usize, usize) {
        (self.min_ep[axis], self.max_ep[axis])
    }

    /// Number of live overlaps this proxy currently participates in.
    #[must_use]
    pub fn overlap_count(&self) -> usize {
        self.overlaps
            .iter()
            .filter(|&&s| s != INVALID_PAIR_ID)
            .count()
    }

    pub(crate) fn has_free_overlap_slot(&self) -> bool {
        self.overlaps.contains(&INVALID_PAIR_ID)
    }

    /// Records `pair` into the first free slot. Callers check
    /// [`Self::has_free_overlap_slot`] first.
    pub(crate) fn record_overlap(&mut self, pair: i32) {
        debug_assert!(pair >= 0);
        for slot in &mut self.overlaps {
            if *slot == INVALID_PAIR_ID {
                *slot = pair;
                return;
            }
        }
        debug_assert!(false, "overlap slots full; caller did not check");
    }

    /// Clears the slot holding `pair`.
    pub(crate) fn clear_overlap(&mut self, pair: i32) {
        for slot in &mut self.overlaps {
            if *slot == pair {
                *slot = INVALID_PAIR_ID;
                return;
            }
        }
        debug_assert!(false, "pair reference not found");
    }

    /// Rewrites the slot holding `from` to `to` (pair table swap-remove
    /// relocated the pair).
    pub(crate) fn repoint_overlap(&mut self, from: i32, to: i32) {
        for slot in &mut self.overlaps {
            if *slot == from {
                *slot = to;
                return;
            }
        }
        debug_assert!(false, "relocated pair reference not found");
    }
}

#[cfg(test)]
mod tests {
    use super::{CollisionFilter, Proxy, INVALID_PAIR_ID, MAX_OVERLAPS_PER_ENTITY};
    use crate::types::aabb::Aabb;

    #[test]
    fn default_filter_collides_with_itself() {
        let f = CollisionFilter::default();
        assert!(f.needs_collision(f));
        assert!(!f.is_inert());
    }

    #[test]
    fn filter_rule_is_two_way() {
        let a = CollisionFilter::new(0x0001, 0x0002);
        let b = CollisionFilter::new(0x0004, 0x0001);
        // b accepts a's group, but a does not accept b's group.
        assert!(!a.needs_collision(b));
        assert!(!b.needs_collision(a));
    }

    #[test]
    fn overlap_slot_bookkeeping() {
        let mut p = Proxy::new(Aabb::new(0, 0, 1, 1), CollisionFilter::default());
        assert_eq!(p.overlap_count(), 0);
        p.record_overlap(3);
        p.record_overlap(7);
        assert_eq!(p.overlap_count(), 2);
        p.repoint_overlap(7, 0);
        assert!(p.overlap_slots().contains(&0));
        p.clear_overlap(3);
        assert_eq!(p.overlap_count(), 1);
        assert!(p.has_free_overlap_slot());
    }

    #[test]
    fn slots_saturate_at_the_per_entity_cap() {
        let mut p = Proxy::new(Aabb::new(0, 0, 1, 1), CollisionFilter::default());
        for i in 0..MAX_OVERLAPS_PER_ENTITY {
            assert!(p.has_free_overlap_slot());
            // Slot values are pair-table indices; any distinct values do.
            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            p.record_overlap(i as i32);
        }
        assert!(!p.has_free_overlap_slot());
        assert!(!p.overlap_slots().contains(&INVALID_PAIR_ID));
    }
}
