// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

//! The persistent sweep-and-prune structure.
//!
//! Two sorted endpoint arrays (one per axis, sentinel-bounded), a dense
//! proxy table, and a dense pair table stay mutually consistent across
//! `add` / `update` / `remove`. Work is proportional to how far endpoints
//! actually move, not to the population: each mutation runs a handful of
//! insertion-sort shuffles that swap one endpoint with its neighbor until
//! order is restored, and every min/max crossing emits the matching
//! pair-set event.
//!
//! All storage is sized once at construction; no public operation
//! allocates.

use super::endpoint;
use super::pair::{self, PairTable};
use super::proxy::{CollisionFilter, Proxy, ProxyId, MAX_OVERLAPS_PER_ENTITY};
use super::SweepError;
use crate::types::aabb::{Aabb, NUM_AXES};

/// Default proxy capacity of [`SweepPrune::new`].
pub const DEFAULT_MAX_ENTITIES: usize = 1024;

/// Default pair capacity of [`SweepPrune::new`].
pub const DEFAULT_MAX_PAIRS: usize = 4096;

/// Pair ids are stored as non-negative `i32` in proxy overlap slots.
const MAX_PAIR_CAPACITY: usize = 0x7fff_ffff;

/// Journal bound for one `update`: per axis, the expansion kernels insert
/// at most a slot-array's worth of pairs and the contraction kernels
/// remove at most as many.
const JOURNAL_CAPACITY: usize = 4 * MAX_OVERLAPS_PER_ENTITY;

/// One pair-table mutation, journaled during `update` so a capacity
/// overflow can be undone.
#[derive(Clone, Copy, Debug)]
enum PairEvent {
    Added(u32),
    Removed(u32),
}

/// Mutation counters, cumulative since construction or the last
/// [`SweepPrune::reset_stats`].
///
/// `endpoint_swaps` is the structure's true cost model: a coherent tick
/// (small displacements) swaps O(population), not O(population²).
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct SweepStats {
    /// Neighbor swaps performed by the sort kernels.
    pub endpoint_swaps: u64,
    /// Pairs inserted into the pair table.
    pub pairs_added: u64,
    /// Pairs removed from the pair table.
    pub pairs_removed: u64,
}

/// Reports that a swap-with-last removal renamed the moved proxy.
///
/// The proxy previously addressed by `was` is now addressed by `now`;
/// clients keying their own state by proxy id apply the rename before the
/// next call.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct ProxyRename {
    /// The moved proxy's id before the removal.
    pub was: ProxyId,
    /// The moved proxy's id after the removal.
    pub now: ProxyId,
}

/// Persistent 2D sweep-and-prune broad-phase.
///
/// Maintains the exact set of overlapping AABB pairs for a dynamic
/// population of boxes. Overlap is inclusive on edges and gated by the
/// two-way [`CollisionFilter`] rule.
///
/// Determinism contract:
/// - Pair identity is canonical: one 32-bit word with the lower id in the
///   low half ([`pair_word`](crate::broad::pair::pair_word)).
/// - Within a tick, the pair *set* after updating every proxy depends only
///   on the final AABBs, not on the order of `update` calls.
/// - No ambient randomness, no time dependence, no float arithmetic.
#[derive(Debug)]
pub struct SweepPrune {
    /// Dense slot array; slot 0 is the sentinel, slots `1..len` are live.
    proxies: Vec<Proxy>,
    /// Per-axis sorted endpoint words, sentinel words at both ends.
    endpoints: [Vec<u64>; NUM_AXES],
    pairs: PairTable,
    max_entities: usize,
    max_pairs: usize,
    stats: SweepStats,
    /// Scratch for swap-with-last removals (saved pair words).
    moved_pairs: Vec<u32>,
    /// First capacity overflow hit by a kernel event; the pair is skipped
    /// so the walk can finish sorted, and the public operation rolls
    /// itself back before reporting it.
    overflow: Option<SweepError>,
    /// Pair mutations of the in-flight `update`, undone on overflow.
    journal: Vec<PairEvent>,
    journal_on: bool,
}

impl Default for SweepPrune {
    fn default() -> Self {
        Self::new()
    }
}

impl SweepPrune {
    /// Creates a structure with the default capacities.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTITIES, DEFAULT_MAX_PAIRS)
    }

    /// Creates a structure sized for `max_entities` proxies and `max_pairs`
    /// simultaneous overlaps. All storage is allocated here; no later call
    /// allocates.
    ///
    /// # Panics
    /// Panics if `max_entities` is zero or exceeds the 15-bit id domain, or
    /// if `max_pairs` is zero or exceeds the pair-id domain.
    #[must_use]
    pub fn with_capacity(max_entities: usize, max_pairs: usize) -> Self {
        assert!(
            max_entities >= 1 && max_entities <= usize::from(endpoint::MAX_OWNER_ID),
            "entity capacity must fit the 15-bit owner-id field"
        );
        assert!(
            max_pairs >= 1 && max_pairs <= MAX_PAIR_CAPACITY,
            "pair capacity must fit the pair-id domain"
        );
        let mut proxies = Vec::with_capacity(max_entities + 1);
        proxies.push(Proxy::sentinel());
        let axis_array = || {
            let mut eps = Vec::with_capacity(2 * (max_entities + 1));
            eps.push(endpoint::MIN_SENTINEL);
            eps.push(endpoint::MAX_SENTINEL);
            eps
        };
        Self {
            proxies,
            endpoints: [axis_array(), axis_array()],
            pairs: PairTable::with_capacity(max_pairs),
            max_entities,
            max_pairs,
            stats: SweepStats::default(),
            moved_pairs: Vec::with_capacity(MAX_OVERLAPS_PER_ENTITY),
            overflow: None,
            journal: Vec::with_capacity(JOURNAL_CAPACITY),
            journal_on: false,
        }
    }

    // =========================================================================
    // Read surface
    // =========================================================================

    /// Number of registered proxies (the sentinel does not count).
    #[must_use]
    pub fn len(&self) -> usize {
        self.proxies.len() - 1
    }

    /// Returns `true` if no proxies are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of currently overlapping pairs.
    #[must_use]
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// The live pair words, dense and hole-free. Decode with
    /// [`pair_lo`](crate::broad::pair::pair_lo) /
    /// [`pair_hi`](crate::broad::pair::pair_hi).
    #[must_use]
    pub fn pair_words(&self) -> &[u32] {
        self.pairs.words()
    }

    /// Iterates the live pairs as `(lo, hi)` proxy ids.
    ///
    /// Order is the dense-array order: deterministic for a fixed operation
    /// sequence, but not sorted.
    pub fn pairs(&self) -> impl Iterator<Item = (ProxyId, ProxyId)> + '_ {
        self.pairs
            .words()
            .iter()
            .map(|&w| (pair::pair_lo(w), pair::pair_hi(w)))
    }

    /// Read access to a registered proxy (AABB, filter, overlap slots).
    pub fn proxy(&self, id: ProxyId) -> Result<&Proxy, SweepError> {
        let slot = self.slot_of(id)?;
        Ok(&self.proxies[slot])
    }

    /// The sorted endpoint words of one axis (0 = X, 1 = Y), sentinels
    /// included. Diagnostic surface; decode with the
    /// [`endpoint`](crate::broad::endpoint) codec.
    #[must_use]
    pub fn endpoints(&self, axis: usize) -> &[u64] {
        &self.endpoints[axis]
    }

    /// Returns the mutation counters.
    #[must_use]
    pub fn stats(&self) -> SweepStats {
        self.stats
    }

    /// Zeroes the mutation counters.
    pub fn reset_stats(&mut self) {
        self.stats = SweepStats::default();
    }

    /// Returns `true` iff the two proxies' AABBs overlap on both axes
    /// (inclusive on edges).
    pub fn test_entities_overlap(&self, a: ProxyId, b: ProxyId) -> Result<bool, SweepError> {
        let sa = self.slot_of(a)?;
        let sb = self.slot_of(b)?;
        Ok(self.proxies[sa].aabb.overlaps(&self.proxies[sb].aabb))
    }

    /// Applies the two-way filter rule to two registered proxies.
    pub fn needs_collision(&self, a: ProxyId, b: ProxyId) -> Result<bool, SweepError> {
        let sa = self.slot_of(a)?;
        let sb = self.slot_of(b)?;
        Ok(self.proxies[sa].filter.needs_collision(self.proxies[sb].filter))
    }

    // =========================================================================
    // Mutation surface
    // =========================================================================

    /// Registers a box and returns its handle.
    ///
    /// Returns `Ok(None)` without registering when the filter is inert
    /// (`group == 0` or `mask == 0`). With `update_overlaps` false the
    /// initial overlap set of the new proxy is *not* emitted; pass true
    /// unless the caller seeds pairs by other means.
    ///
    /// # Errors
    /// [`SweepError::OverCapacity`] when the proxy table is full, or when
    /// the initial overlap set does not fit the pair table or a
    /// participant's overlap slots. A failed `add` rolls the registration
    /// back; the structure is left exactly as it was.
    pub fn add(
        &mut self,
        aabb: Aabb,
        filter: CollisionFilter,
        update_overlaps: bool,
    ) -> Result<Option<ProxyId>, SweepError> {
        if filter.is_inert() {
            return Ok(None);
        }
        if self.len() == self.max_entities {
            return Err(SweepError::OverCapacity {
                resource: "proxy table",
            });
        }
        debug_assert!(self.overflow.is_none());
        let slot = self.proxies.len();
        let id = Self::id_at(slot);
        self.proxies.push(Proxy::new(aabb, filter));

        // Grow each axis by two slots: the new endpoints start just inside
        // the upper sentinel, then sort down into place.
        for axis in 0..NUM_AXES {
            let eps = &mut self.endpoints[axis];
            let len = eps.len();
            let sentinel = eps[len - 1];
            eps[len - 1] = endpoint::pack(false, id.value(), aabb.min(axis));
            eps.push(endpoint::pack(true, id.value(), aabb.max(axis)));
            eps.push(sentinel);
            let p = &mut self.proxies[slot];
            p.min_ep[axis] = len - 1;
            p.max_ep[axis] = len;
            self.proxies[0].max_ep[axis] = len + 1;
        }

        // X stays silent: overlaps can only be decided once both axes are
        // ordered, so only the second axis emits events (against the
        // already-sorted X).
        self.sort_min_down(0, self.proxies[slot].min_ep[0], false);
        self.sort_max_down(0, self.proxies[slot].max_ep[0], false);
        self.sort_min_down(1, self.proxies[slot].min_ep[1], update_overlaps);
        self.sort_max_down(1, self.proxies[slot].max_ep[1], update_overlaps);

        if let Some(err) = self.overflow.take() {
            // Roll the registration back: the new proxy is the last slot,
            // so this is the non-renaming removal path.
            self.drop_pairs_of(slot);
            self.extract_endpoints(slot);
            self.proxies.pop();
            return Err(err);
        }
        Ok(Some(id))
    }

    /// Moves or resizes a registered box, incrementally repairing the
    /// structure and the pair set.
    ///
    /// Cost is proportional to how far the four endpoints travel in sort
    /// order. Updating with an unchanged AABB is a no-op.
    ///
    /// # Errors
    /// [`SweepError::NotRegistered`] for a stale handle;
    /// [`SweepError::OverCapacity`] when a new overlap does not fit. A
    /// failed update rolls itself back — geometry and pair set are
    /// restored — so the caller observes no change beyond the error (a
    /// configuration error, not a recoverable one).
    pub fn update(&mut self, id: ProxyId, aabb: Aabb) -> Result<(), SweepError> {
        let slot = self.slot_of(id)?;
        debug_assert!(self.overflow.is_none());
        let old = self.proxies[slot].aabb;
        // Written first: event checks consult the other axis's final extents.
        self.proxies[slot].aabb = aabb;
        self.journal.clear();
        self.journal_on = true;
        for axis in 0..NUM_AXES {
            self.shift_endpoints(slot, axis, true);
        }
        self.journal_on = false;

        if let Some(err) = self.overflow.take() {
            // Walk the geometry back silently, then reverse the journaled
            // pair mutations; the replay retraces states that fit on the
            // way in, so re-inserting cannot overflow.
            self.proxies[slot].aabb = old;
            for axis in 0..NUM_AXES {
                self.shift_endpoints(slot, axis, false);
            }
            while let Some(event) = self.journal.pop() {
                match event {
                    PairEvent::Added(word) => {
                        self.remove_overlapping_pair(
                            pair::pair_lo(word).index(),
                            pair::pair_hi(word).index(),
                        );
                    }
                    PairEvent::Removed(word) => {
                        let _ = self.add_overlapping_pair(
                            pair::pair_lo(word).index(),
                            pair::pair_hi(word).index(),
                        );
                    }
                }
            }
            return Err(err);
        }
        Ok(())
    }

    /// Deregisters a proxy, dropping every pair containing it.
    ///
    /// Keeps the proxy table dense by moving the highest-id proxy into the
    /// freed slot; when that happens the rename is returned and the moved
    /// proxy's endpoint words and pairs are rebuilt under its new id.
    ///
    /// # Errors
    /// [`SweepError::NotRegistered`] for a stale handle.
    pub fn remove(&mut self, id: ProxyId) -> Result<Option<ProxyRename>, SweepError> {
        let slot = self.slot_of(id)?;
        self.drop_pairs_of(slot);
        self.extract_endpoints(slot);

        let last_slot = self.proxies.len() - 1;
        if slot == last_slot {
            self.proxies.pop();
            return Ok(None);
        }

        // Swap-with-last. Pair words encode ids, so the moved proxy's pairs
        // are torn down and rebuilt under its new id; a bare rename would
        // corrupt the canonical encoding.
        self.moved_pairs.clear();
        for &s in &self.proxies[last_slot].overlaps {
            if let Ok(k) = usize::try_from(s) {
                self.moved_pairs.push(self.pairs.words()[k]);
            }
        }
        self.drop_pairs_of(last_slot);
        self.proxies.swap_remove(slot);

        let new_id = Self::id_at(slot);
        for axis in 0..NUM_AXES {
            let min_idx = self.proxies[slot].min_ep[axis];
            let max_idx = self.proxies[slot].max_ep[axis];
            let eps = &mut self.endpoints[axis];
            eps[min_idx] = endpoint::with_owner(eps[min_idx], new_id.value());
            eps[max_idx] = endpoint::with_owner(eps[max_idx], new_id.value());
        }

        let moved_old = Self::id_at(last_slot);
        while let Some(word) = self.moved_pairs.pop() {
            let lo = pair::pair_lo(word);
            let hi = pair::pair_hi(word);
            let other = if lo == moved_old { hi } else { lo };
            // Cannot overflow: the slots this pair held were just freed.
            self.add_overlapping_pair(slot, other.index())?;
        }
        Ok(Some(ProxyRename {
            was: moved_old,
            now: new_id,
        }))
    }

    /// Deregisters every proxy. Capacities and counters are kept.
    pub fn clear(&mut self) {
        while !self.is_empty() {
            let last = Self::id_at(self.proxies.len() - 1);
            // Highest id first: never takes the swap path, cannot fail.
            let _ = self.remove(last);
        }
    }

    // =========================================================================
    // Pair bookkeeping
    // =========================================================================

    /// Lookup only: scans `a`'s overlap slots for the canonical word of
    /// `(a, b)` and returns its pair id.
    fn find_pair(&self, a: usize, b: usize) -> Option<usize> {
        let word = pair::pair_word(Self::id_at(a), Self::id_at(b));
        let live = self.pairs.words();
        self.proxies[a].overlaps.iter().find_map(|&s| {
            let k = usize::try_from(s).ok()?;
            (live[k] == word).then_some(k)
        })
    }

    /// Inserts the pair `(a, b)` unless the filter rejects it or it is
    /// already present (the same crossing can be reported once per axis).
    fn add_overlapping_pair(&mut self, a: usize, b: usize) -> Result<(), SweepError> {
        if !self.proxies[a].filter.needs_collision(self.proxies[b].filter) {
            return Ok(());
        }
        if self.find_pair(a, b).is_some() {
            return Ok(());
        }
        if self.pairs.len() == self.max_pairs {
            return Err(SweepError::OverCapacity {
                resource: "pair table",
            });
        }
        if !self.proxies[a].has_free_overlap_slot() || !self.proxies[b].has_free_overlap_slot() {
            return Err(SweepError::OverCapacity {
                resource: "per-proxy overlap slots",
            });
        }
        let word = pair::pair_word(Self::id_at(a), Self::id_at(b));
        let id = Self::pair_ref(self.pairs.push(word));
        self.proxies[a].record_overlap(id);
        self.proxies[b].record_overlap(id);
        self.stats.pairs_added += 1;
        self.journal_event(PairEvent::Added(word));
        Ok(())
    }

    /// Removes the pair `(a, b)` if present: clears both proxies' slots,
    /// swap-removes the word, and repoints the two proxies whose pair id
    /// just changed.
    fn remove_overlapping_pair(&mut self, a: usize, b: usize) {
        let Some(k) = self.find_pair(a, b) else {
            return;
        };
        let word = self.pairs.words()[k];
        let id = Self::pair_ref(k);
        self.proxies[a].clear_overlap(id);
        self.proxies[b].clear_overlap(id);
        if let Some(moved) = self.pairs.swap_remove(k) {
            let from = Self::pair_ref(self.pairs.len());
            self.proxies[pair::pair_lo(moved).index()].repoint_overlap(from, id);
            self.proxies[pair::pair_hi(moved).index()].repoint_overlap(from, id);
        }
        self.stats.pairs_removed += 1;
        self.journal_event(PairEvent::Removed(word));
    }

    /// Rewrites one axis's endpoints toward the proxy's current AABB and
    /// runs the direction-appropriate kernels.
    ///
    /// Expansion before contraction: the proxy's own endpoints never
    /// cross, which keeps the per-axis event stream exact.
    fn shift_endpoints(&mut self, slot: usize, axis: usize, update_overlaps: bool) {
        let id = Self::id_at(slot);
        let aabb = self.proxies[slot].aabb;
        let min_idx = self.proxies[slot].min_ep[axis];
        let max_idx = self.proxies[slot].max_ep[axis];
        let old_min = endpoint::coord(self.endpoints[axis][min_idx]);
        let old_max = endpoint::coord(self.endpoints[axis][max_idx]);
        let new_min = aabb.min(axis);
        let new_max = aabb.max(axis);
        if new_min < old_min {
            self.endpoints[axis][min_idx] = endpoint::pack(false, id.value(), new_min);
            self.sort_min_down(axis, min_idx, update_overlaps);
        }
        if new_max > old_max {
            self.endpoints[axis][max_idx] = endpoint::pack(true, id.value(), new_max);
            self.sort_max_up(axis, max_idx, update_overlaps);
        }
        if new_min > old_min {
            self.endpoints[axis][min_idx] = endpoint::pack(false, id.value(), new_min);
            self.sort_min_up(axis, min_idx, update_overlaps);
        }
        if new_max < old_max {
            self.endpoints[axis][max_idx] = endpoint::pack(true, id.value(), new_max);
            self.sort_max_down(axis, max_idx, update_overlaps);
        }
    }

    /// Floats `slot`'s endpoints to the sentinel ceiling (silent "up"
    /// kernels), then shrinks each axis by two and re-seats the sentinel
    /// max just above the remaining population.
    fn extract_endpoints(&mut self, slot: usize) {
        let id = Self::id_at(slot);
        for axis in 0..NUM_AXES {
            let min_idx = self.proxies[slot].min_ep[axis];
            self.endpoints[axis][min_idx] = endpoint::pack(false, id.value(), i32::MAX);
            self.sort_min_up(axis, min_idx, false);
            let max_idx = self.proxies[slot].max_ep[axis];
            self.endpoints[axis][max_idx] = endpoint::pack(true, id.value(), i32::MAX);
            self.sort_max_up(axis, max_idx, false);
            let eps = &mut self.endpoints[axis];
            debug_assert_eq!(endpoint::owner(eps[eps.len() - 2]), id.value());
            debug_assert_eq!(endpoint::owner(eps[eps.len() - 3]), id.value());
            let sentinel = eps[eps.len() - 1];
            eps.truncate(eps.len() - 2);
            let last = eps.len() - 1;
            eps[last] = sentinel;
            self.proxies[0].max_ep[axis] = last;
        }
    }

    /// Drops every pair containing `slot`.
    fn drop_pairs_of(&mut self, slot: usize) {
        while let Some(k) = self.proxies[slot]
            .overlaps
            .iter()
            .find_map(|&s| usize::try_from(s).ok())
        {
            let word = self.pairs.words()[k];
            let lo = pair::pair_lo(word).index();
            let hi = pair::pair_hi(word).index();
            let other = if lo == slot { hi } else { lo };
            self.remove_overlapping_pair(slot, other);
        }
    }

    /// Kernel-site pair insertion. On capacity exhaustion the pair is
    /// skipped and the first overflow recorded, so the sort walk always
    /// finishes with the arrays ordered; the public operation rolls itself
    /// back and reports the error afterwards.
    fn add_pair_event(&mut self, a: usize, b: usize) {
        if let Err(err) = self.add_overlapping_pair(a, b) {
            self.overflow.get_or_insert(err);
        }
    }

    /// Appends to the in-flight update's undo journal.
    fn journal_event(&mut self, event: PairEvent) {
        if self.journal_on {
            debug_assert!(self.journal.len() < JOURNAL_CAPACITY);
            self.journal.push(event);
        }
    }

    // =========================================================================
    // Sort kernels
    // =========================================================================
    //
    // Four mutually symmetric insertion-sort shuffles. Each walks one
    // endpoint toward its place by swapping with the designated neighbor
    // while the (coordinate, is_max) key is out of order, repairing the
    // back-references of both owners on every swap. The sentinels bound
    // every walk. Crossing an opposite-kind endpoint emits the pair event
    // for the two owners:
    //
    //   min ↓ over max   add (if the other axis overlaps)
    //   min ↑ over max   remove
    //   max ↑ over min   add (if the other axis overlaps)
    //   max ↓ over min   remove
    //
    // Same-kind crossings are silent.

    fn sort_min_down(&mut self, axis: usize, start: usize, update_overlaps: bool) {
        let word = self.endpoints[axis][start];
        let key = endpoint::sort_key(word);
        let owner = usize::from(endpoint::owner(word));
        let mut pos = start;
        loop {
            let prev = self.endpoints[axis][pos - 1];
            if endpoint::sort_key(prev) <= key {
                break;
            }
            let neighbor = usize::from(endpoint::owner(prev));
            if endpoint::is_max(prev) {
                if update_overlaps
                    && neighbor != owner
                    && self.overlap_on_other_axis(axis, owner, neighbor)
                {
                    self.add_pair_event(owner, neighbor);
                }
                self.proxies[neighbor].max_ep[axis] = pos;
            } else {
                self.proxies[neighbor].min_ep[axis] = pos;
            }
            self.endpoints[axis][pos] = prev;
            self.endpoints[axis][pos - 1] = word;
            self.proxies[owner].min_ep[axis] = pos - 1;
            self.stats.endpoint_swaps += 1;
            pos -= 1;
        }
    }

    fn sort_min_up(&mut self, axis: usize, start: usize, update_overlaps: bool) {
        let word = self.endpoints[axis][start];
        let key = endpoint::sort_key(word);
        let owner = usize::from(endpoint::owner(word));
        let mut pos = start;
        loop {
            let next = self.endpoints[axis][pos + 1];
            if key <= endpoint::sort_key(next) {
                break;
            }
            let neighbor = usize::from(endpoint::owner(next));
            if endpoint::is_max(next) {
                if update_overlaps && neighbor != owner {
                    self.remove_overlapping_pair(owner, neighbor);
                }
                self.proxies[neighbor].max_ep[axis] = pos;
            } else {
                self.proxies[neighbor].min_ep[axis] = pos;
            }
            self.endpoints[axis][pos] = next;
            self.endpoints[axis][pos + 1] = word;
            self.proxies[owner].min_ep[axis] = pos + 1;
            self.stats.endpoint_swaps += 1;
            pos += 1;
        }
    }

    fn sort_max_up(&mut self, axis: usize, start: usize, update_overlaps: bool) {
        let word = self.endpoints[axis][start];
        let key = endpoint::sort_key(word);
        let owner = usize::from(endpoint::owner(word));
        let mut pos = start;
        loop {
            let next = self.endpoints[axis][pos + 1];
            if key <= endpoint::sort_key(next) {
                break;
            }
            let neighbor = usize::from(endpoint::owner(next));
            if endpoint::is_max(next) {
                self.proxies[neighbor].max_ep[axis] = pos;
            } else {
                if update_overlaps
                    && neighbor != owner
                    && self.overlap_on_other_axis(axis, owner, neighbor)
                {
                    self.add_pair_event(owner, neighbor);
                }
                self.proxies[neighbor].min_ep[axis] = pos;
            }
            self.endpoints[axis][pos] = next;
            self.endpoints[axis][pos + 1] = word;
            self.proxies[owner].max_ep[axis] = pos + 1;
            self.stats.endpoint_swaps += 1;
            pos += 1;
        }
    }

    fn sort_max_down(&mut self, axis: usize, start: usize, update_overlaps: bool) {
        let word = self.endpoints[axis][start];
        let key = endpoint::sort_key(word);
        let owner = usize::from(endpoint::owner(word));
        let mut pos = start;
        loop {
            let prev = self.endpoints[axis][pos - 1];
            if endpoint::sort_key(prev) <= key {
                break;
            }
            let neighbor = usize::from(endpoint::owner(prev));
            if endpoint::is_max(prev) {
                self.proxies[neighbor].max_ep[axis] = pos;
            } else {
                if update_overlaps && neighbor != owner {
                    self.remove_overlapping_pair(owner, neighbor);
                }
                self.proxies[neighbor].min_ep[axis] = pos;
            }
            self.endpoints[axis][pos] = prev;
            self.endpoints[axis][pos - 1] = word;
            self.proxies[owner].max_ep[axis] = pos - 1;
            self.stats.endpoint_swaps += 1;
            pos -= 1;
        }
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    /// Overlap test on every axis except `axis` (one axis in 2D),
    /// inclusive on edges.
    fn overlap_on_other_axis(&self, axis: usize, a: usize, b: usize) -> bool {
        let other = axis ^ 1;
        let pa = self.proxies[a].aabb;
        let pb = self.proxies[b].aabb;
        pa.min(other) <= pb.max(other) && pb.min(other) <= pa.max(other)
    }

    fn slot_of(&self, id: ProxyId) -> Result<usize, SweepError> {
        let slot = id.index();
        if slot == 0 || slot >= self.proxies.len() {
            return Err(SweepError::NotRegistered(id));
        }
        Ok(slot)
    }

    // Slot indices are bounded by the entity capacity, which fits the
    // 15-bit id field.
    #[allow(clippy::cast_possible_truncation)]
    fn id_at(slot: usize) -> ProxyId {
        ProxyId::from_value(slot as u16)
    }

    // Pair ids are bounded by the pair capacity, which fits i32.
    #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
    fn pair_ref(pair_id: usize) -> i32 {
        pair_id as i32
    }
}
