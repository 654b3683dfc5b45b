// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observer slots, per-pair observation state, and the target watcher index.
//!
//! The registry is two maps, per the two access patterns it serves:
//! observer → ordered per-target states (iterated at flush), and
//! target → watching observers (iterated on mutation). Keeping them separate
//! makes `unobserve` and `disconnect` proportional to one observer's
//! targets, not to all pairs.

use alloc::vec::Vec;

use hashbrown::HashMap;
use smallvec::SmallVec;

use crate::host::HostTree;
use crate::observatory::ObserverCallback;
use crate::threshold::ResolvedThresholds;

/// Identifier for a live observer.
///
/// A small, copyable handle consisting of a slot index and a generation
/// counter. Removing an observer frees its slot; a handle pointing at a
/// freed or reused slot is stale and never aliases a different live
/// observer, because the generation must match.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ObserverId(pub(crate) u32, pub(crate) u32);

impl ObserverId {
    pub(crate) const fn new(idx: u32, generation: u32) -> Self {
        Self(idx, generation)
    }

    pub(crate) const fn idx(self) -> usize {
        self.0 as usize
    }
}

/// Last-reported values for one (observer, target) pair.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct ObservationState {
    pub(crate) target_ratio: f64,
    pub(crate) root_ratio: f64,
    pub(crate) intersecting: bool,
    /// Still true while no report for this pair has ever been enqueued.
    pub(crate) initial_pending: bool,
}

impl ObservationState {
    pub(crate) fn new() -> Self {
        Self {
            target_ratio: 0.0,
            root_ratio: 0.0,
            intersecting: false,
            initial_pending: true,
        }
    }
}

/// One live observer: callback, configuration, and per-target states in
/// original `observe` order.
pub(crate) struct ObserverSlot<H: HostTree> {
    pub(crate) callback: Option<ObserverCallback<H>>,
    pub(crate) root: Option<H::Region>,
    pub(crate) thresholds: ResolvedThresholds,
    /// Insertion order here is the delivery order within a flush.
    pub(crate) states: Vec<(H::Region, ObservationState)>,
}

impl<H: HostTree> ObserverSlot<H> {
    pub(crate) fn has_state(&self, target: H::Region) -> bool {
        self.states.iter().any(|(region, _)| *region == target)
    }

    pub(crate) fn state(&self, target: H::Region) -> Option<&ObservationState> {
        self.states
            .iter()
            .find(|(region, _)| *region == target)
            .map(|(_, state)| state)
    }

    pub(crate) fn state_mut(&mut self, target: H::Region) -> Option<&mut ObservationState> {
        self.states
            .iter_mut()
            .find(|(region, _)| *region == target)
            .map(|(_, state)| state)
    }

    pub(crate) fn push_state(&mut self, target: H::Region) {
        self.states.push((target, ObservationState::new()));
    }

    /// Removes the pair state, returning `true` if it existed.
    pub(crate) fn remove_state(&mut self, target: H::Region) -> bool {
        match self.states.iter().position(|(region, _)| *region == target) {
            Some(idx) => {
                self.states.remove(idx);
                true
            }
            None => false,
        }
    }
}

struct Slot<H: HostTree> {
    generation: u32,
    data: Option<ObserverSlot<H>>,
}

/// The two-map observer registry.
pub(crate) struct Registry<H: HostTree> {
    slots: Vec<Slot<H>>,
    free: Vec<u32>,
    watchers: HashMap<H::Region, SmallVec<[ObserverId; 2]>>,
}

impl<H: HostTree> Registry<H> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            watchers: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, observer: ObserverSlot<H>) -> ObserverId {
        match self.free.pop() {
            Some(idx) => {
                let slot = &mut self.slots[idx as usize];
                slot.generation = slot.generation.wrapping_add(1);
                slot.data = Some(observer);
                ObserverId::new(idx, slot.generation)
            }
            None => {
                let idx = u32::try_from(self.slots.len()).unwrap_or(u32::MAX);
                self.slots.push(Slot {
                    generation: 1,
                    data: Some(observer),
                });
                ObserverId::new(idx, 1)
            }
        }
    }

    /// Frees the slot, invalidating the id. The caller is responsible for
    /// releasing targets and cancelling pending entries first.
    pub(crate) fn remove(&mut self, id: ObserverId) -> Option<ObserverSlot<H>> {
        if !self.is_live(id) {
            return None;
        }
        let data = self.slots[id.idx()].data.take();
        self.free.push(id.0);
        data
    }

    pub(crate) fn is_live(&self, id: ObserverId) -> bool {
        self.slots
            .get(id.idx())
            .is_some_and(|slot| slot.generation == id.1 && slot.data.is_some())
    }

    pub(crate) fn get(&self, id: ObserverId) -> Option<&ObserverSlot<H>> {
        let slot = self.slots.get(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.data.as_ref()
    }

    pub(crate) fn get_mut(&mut self, id: ObserverId) -> Option<&mut ObserverSlot<H>> {
        let slot = self.slots.get_mut(id.idx())?;
        if slot.generation != id.1 {
            return None;
        }
        slot.data.as_mut()
    }

    /// The observers currently watching `target`, copied out so callers can
    /// mutate the registry while iterating.
    pub(crate) fn watchers_of(&self, target: H::Region) -> SmallVec<[ObserverId; 4]> {
        self.watchers
            .get(&target)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub(crate) fn add_watcher(&mut self, target: H::Region, id: ObserverId) {
        self.watchers.entry(target).or_default().push(id);
    }

    pub(crate) fn remove_watcher(&mut self, target: H::Region, id: ObserverId) {
        if let Some(ids) = self.watchers.get_mut(&target) {
            ids.retain(|watcher| *watcher != id);
            if ids.is_empty() {
                self.watchers.remove(&target);
            }
        }
    }

    /// Number of distinct targets with at least one watcher.
    pub(crate) fn watched_targets(&self) -> usize {
        self.watchers.len()
    }

    /// Number of live observers.
    pub(crate) fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.data.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use crate::mock_host::MockHost;
    use crate::threshold::{ResolvedThresholds, ThresholdInput};

    fn slot() -> ObserverSlot<MockHost> {
        ObserverSlot {
            callback: None,
            root: None,
            thresholds: ResolvedThresholds::resolve(
                &ThresholdInput::Unset,
                &ThresholdInput::Unset,
            )
            .unwrap(),
            states: Vec::new(),
        }
    }

    #[test]
    fn insert_and_lookup() {
        let mut registry = Registry::<MockHost>::new();
        let id = registry.insert(slot());

        assert!(registry.is_live(id));
        assert!(registry.get(id).is_some());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn removal_invalidates_id() {
        let mut registry = Registry::<MockHost>::new();
        let id = registry.insert(slot());

        assert!(registry.remove(id).is_some());
        assert!(!registry.is_live(id));
        assert!(registry.get(id).is_none());
        assert!(registry.remove(id).is_none());
    }

    #[test]
    fn slot_reuse_bumps_generation() {
        let mut registry = Registry::<MockHost>::new();
        let first = registry.insert(slot());
        registry.remove(first);

        let second = registry.insert(slot());
        assert_eq!(first.0, second.0);
        assert_ne!(first.1, second.1);
        assert!(!registry.is_live(first));
        assert!(registry.is_live(second));
    }

    #[test]
    fn states_preserve_observe_order() {
        let mut registry = Registry::<MockHost>::new();
        let id = registry.insert(slot());

        let observer = registry.get_mut(id).unwrap();
        observer.push_state(3);
        observer.push_state(1);
        observer.push_state(2);

        let order: Vec<u32> = observer.states.iter().map(|(region, _)| *region).collect();
        assert_eq!(order, vec![3, 1, 2]);

        assert!(observer.remove_state(1));
        assert!(!observer.remove_state(1));
        let order: Vec<u32> = observer.states.iter().map(|(region, _)| *region).collect();
        assert_eq!(order, vec![3, 2]);
    }

    #[test]
    fn watcher_index_tracks_targets() {
        let mut registry = Registry::<MockHost>::new();
        let a = registry.insert(slot());
        let b = registry.insert(slot());

        registry.add_watcher(7, a);
        registry.add_watcher(7, b);
        registry.add_watcher(9, a);

        assert_eq!(registry.watchers_of(7).as_slice(), &[a, b]);
        assert_eq!(registry.watched_targets(), 2);

        registry.remove_watcher(7, a);
        assert_eq!(registry.watchers_of(7).as_slice(), &[b]);

        registry.remove_watcher(7, b);
        assert!(registry.watchers_of(7).is_empty());
        assert_eq!(registry.watched_targets(), 1);
    }
}
