// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deferred, coalesced dispatch scheduling.
//!
//! All recomputations triggered within one task accumulate here, per
//! observer and keyed by target: a second recomputation of the same target
//! within a task replaces its entry, so a flush carries at most one entry
//! per (observer, target) pair. Observers drain in first-pending order.

use alloc::vec::Vec;
use core::hash::Hash;

use hashbrown::HashMap;

use crate::entry::IntersectionEntry;
use crate::registry::ObserverId;

/// Outcome of enqueueing an entry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Enqueue {
    /// First entry for this pair in the current task.
    New,
    /// Replaced an entry already queued for this pair.
    Replaced,
}

/// Pending entries per observer, keyed by target.
#[derive(Debug)]
pub(crate) struct DispatchScheduler<R: Copy + Eq + Hash> {
    pending: HashMap<ObserverId, HashMap<R, IntersectionEntry<R>>>,
    /// Observers in first-pending order; drives flush order.
    order: Vec<ObserverId>,
}

impl<R: Copy + Eq + Hash> DispatchScheduler<R> {
    pub(crate) fn new() -> Self {
        Self {
            pending: HashMap::new(),
            order: Vec::new(),
        }
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub(crate) fn enqueue(&mut self, observer: ObserverId, entry: IntersectionEntry<R>) -> Enqueue {
        let entries = self.pending.entry(observer).or_insert_with(|| {
            self.order.push(observer);
            HashMap::new()
        });
        match entries.insert(entry.target, entry) {
            Some(_) => Enqueue::Replaced,
            None => Enqueue::New,
        }
    }

    /// Drops the queued entry for one pair, if any.
    pub(crate) fn cancel(&mut self, observer: ObserverId, target: R) -> bool {
        let Some(entries) = self.pending.get_mut(&observer) else {
            return false;
        };
        let cancelled = entries.remove(&target).is_some();
        if entries.is_empty() {
            self.pending.remove(&observer);
            self.order.retain(|id| *id != observer);
        }
        cancelled
    }

    /// Drops all queued entries for an observer, returning the affected
    /// targets.
    pub(crate) fn cancel_observer(&mut self, observer: ObserverId) -> Vec<R> {
        let Some(entries) = self.pending.remove(&observer) else {
            return Vec::new();
        };
        self.order.retain(|id| *id != observer);
        entries.into_keys().collect()
    }

    /// Takes every pending batch, in first-pending order, leaving the
    /// scheduler empty. Entry ordering within a batch is the caller's
    /// concern (delivery follows observe order, not enqueue order).
    pub(crate) fn take(&mut self) -> Vec<(ObserverId, HashMap<R, IntersectionEntry<R>>)> {
        let order = core::mem::take(&mut self.order);
        order
            .into_iter()
            .filter_map(|observer| {
                self.pending
                    .remove(&observer)
                    .map(|entries| (observer, entries))
            })
            .collect()
    }
}
