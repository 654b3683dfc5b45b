// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The observer engine: registration, recomputation, and deferred dispatch.

use alloc::boxed::Box;
use alloc::vec::Vec;
use core::fmt;

use treeline_geometry::intersect_region;

use crate::entry::IntersectionEntry;
use crate::error::ObserverError;
use crate::host::HostTree;
use crate::registry::{ObserverId, ObserverSlot, Registry};
use crate::schedule::{DispatchScheduler, Enqueue};
use crate::threshold::{ResolvedThresholds, ThresholdInput};
use crate::trace::DispatchTrace;

/// The callback invoked with an observer's batched entries at flush time.
///
/// Callbacks receive the engine and the host mutably and may call back into
/// both; work queued from inside a callback lands in the next flush.
pub type ObserverCallback<H> = Box<
    dyn FnMut(
        &[IntersectionEntry<<H as HostTree>::Region>],
        ObserverId,
        &mut Observatory<H>,
        &mut H,
    ),
>;

/// Configuration for a new observer.
#[derive(Clone, Debug, PartialEq)]
pub struct ObserverOptions<R> {
    /// The root region intersection is computed against; the implicit
    /// viewport when `None`.
    pub root: Option<R>,
    /// Breakpoints over the target-coverage ratio. Unset or empty defaults
    /// to `[0]`, unless a root-relative set shifts classification to full
    /// containment.
    pub threshold: ThresholdInput,
    /// Breakpoints over the root-coverage ratio. Unset or empty means
    /// root-relative reporting is not configured.
    pub root_threshold: ThresholdInput,
}

impl<R> Default for ObserverOptions<R> {
    fn default() -> Self {
        Self {
            root: None,
            threshold: ThresholdInput::Unset,
            root_threshold: ThresholdInput::Unset,
        }
    }
}

/// Tracks intersection state for (observer, target) pairs over a host tree
/// and dispatches batched reports at task boundaries.
///
/// The engine is driven by the host's scheduler: the host reports geometry
/// changes with [`region_mutated`](Self::region_mutated) and drains queued
/// reports with [`flush`](Self::flush). Between those two calls the engine
/// coalesces recomputations so each (observer, target) pair delivers at most
/// one entry per flush.
pub struct Observatory<H: HostTree> {
    registry: Registry<H>,
    scheduler: DispatchScheduler<H::Region>,
    trace: Option<Box<dyn DispatchTrace<H::Region>>>,
}

impl<H: HostTree> Default for Observatory<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: HostTree> fmt::Debug for Observatory<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Observatory")
            .field("observers", &self.registry.len())
            .field("watched_targets", &self.registry.watched_targets())
            .field("has_pending", &self.has_pending())
            .finish_non_exhaustive()
    }
}

impl<H: HostTree> Observatory<H> {
    /// Creates an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Registry::new(),
            scheduler: DispatchScheduler::new(),
            trace: None,
        }
    }

    /// Installs a sink for dispatch scheduling decisions, replacing any
    /// previous one.
    pub fn set_trace(&mut self, trace: Box<dyn DispatchTrace<H::Region>>) {
        self.trace = Some(trace);
    }

    /// Removes and returns the installed trace sink, if any.
    pub fn take_trace(&mut self) -> Option<Box<dyn DispatchTrace<H::Region>>> {
        self.trace.take()
    }

    /// Registers a new observer and returns its id.
    ///
    /// Thresholds are validated and normalized here; the root, when
    /// supplied, must be a valid region handle. The observer starts with no
    /// observed targets.
    ///
    /// # Errors
    ///
    /// [`ObserverError::InvalidThreshold`] if any breakpoint in either set
    /// is non-finite or outside `[0, 1]`; [`ObserverError::InvalidRoot`] if
    /// the configured root is not a valid handle.
    pub fn create_observer(
        &mut self,
        host: &H,
        options: ObserverOptions<H::Region>,
        callback: ObserverCallback<H>,
    ) -> Result<ObserverId, ObserverError> {
        let thresholds = ResolvedThresholds::resolve(&options.threshold, &options.root_threshold)?;
        if let Some(root) = options.root {
            if !host.is_valid(root) {
                return Err(ObserverError::InvalidRoot);
            }
        }
        Ok(self.registry.insert(ObserverSlot {
            callback: Some(callback),
            root: options.root,
            thresholds,
            states: Vec::new(),
        }))
    }

    /// Whether `observer` refers to a live observer.
    #[must_use]
    pub fn is_live(&self, observer: ObserverId) -> bool {
        self.registry.is_live(observer)
    }

    /// Number of live observers.
    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.registry.len()
    }

    /// The observer's configured root, `None` for the implicit viewport (or
    /// if the observer is not live).
    #[must_use]
    pub fn root(&self, observer: ObserverId) -> Option<H::Region> {
        self.registry.get(observer).and_then(|slot| slot.root)
    }

    /// The observer's normalized primary threshold list.
    ///
    /// Empty only when the primary field was unset and a root-relative set
    /// is configured. `None` if the observer is not live.
    #[must_use]
    pub fn thresholds(&self, observer: ObserverId) -> Option<&[f64]> {
        self.registry
            .get(observer)
            .map(|slot| slot.thresholds.primary())
    }

    /// The observer's normalized root-relative threshold list, `None` when
    /// not configured or the observer is not live.
    #[must_use]
    pub fn root_thresholds(&self, observer: ObserverId) -> Option<&[f64]> {
        self.registry
            .get(observer)
            .and_then(|slot| slot.thresholds.root_relative())
    }

    /// Whether any entries are queued for the next flush.
    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.scheduler.is_empty()
    }

    /// Starts observing `target`, retaining it in the host and queueing the
    /// pair's initial report.
    ///
    /// Observing a target the observer already observes is a no-op. A target
    /// that is valid but not connected to the tree produces no report until
    /// it connects and a mutation arrives for it.
    ///
    /// # Errors
    ///
    /// [`ObserverError::InvalidTarget`] if `target` is not a valid handle;
    /// [`ObserverError::UnknownObserver`] if `observer` is not live.
    pub fn observe(
        &mut self,
        host: &mut H,
        observer: ObserverId,
        target: H::Region,
    ) -> Result<(), ObserverError> {
        if !host.is_valid(target) {
            return Err(ObserverError::InvalidTarget);
        }
        let slot = self
            .registry
            .get_mut(observer)
            .ok_or(ObserverError::UnknownObserver)?;
        if slot.has_state(target) {
            return Ok(());
        }
        slot.push_state(target);
        self.registry.add_watcher(target, observer);
        host.retain(target);
        self.recompute(host, observer, target);
        Ok(())
    }

    /// Stops observing `target`, releasing it in the host and dropping any
    /// entry queued for the pair.
    ///
    /// Unobserving a target the observer does not observe is a no-op.
    ///
    /// # Errors
    ///
    /// [`ObserverError::InvalidTarget`] if `target` is not a valid handle;
    /// [`ObserverError::UnknownObserver`] if `observer` is not live.
    pub fn unobserve(
        &mut self,
        host: &mut H,
        observer: ObserverId,
        target: H::Region,
    ) -> Result<(), ObserverError> {
        if !host.is_valid(target) {
            return Err(ObserverError::InvalidTarget);
        }
        let slot = self
            .registry
            .get_mut(observer)
            .ok_or(ObserverError::UnknownObserver)?;
        if !slot.remove_state(target) {
            return Ok(());
        }
        self.registry.remove_watcher(target, observer);
        host.release(target);
        if self.scheduler.cancel(observer, target) {
            if let Some(trace) = self.trace.as_deref_mut() {
                trace.cancelled(observer, target);
            }
        }
        Ok(())
    }

    /// Stops observing every target of `observer`, releasing them and
    /// dropping all of the observer's queued entries.
    ///
    /// The observer itself stays live and can observe again. Not-live
    /// observers are ignored.
    pub fn disconnect(&mut self, host: &mut H, observer: ObserverId) {
        let Some(slot) = self.registry.get_mut(observer) else {
            return;
        };
        let states = core::mem::take(&mut slot.states);
        for (target, _) in states {
            self.registry.remove_watcher(target, observer);
            host.release(target);
        }
        for target in self.scheduler.cancel_observer(observer) {
            if let Some(trace) = self.trace.as_deref_mut() {
                trace.cancelled(observer, target);
            }
        }
    }

    /// Disconnects `observer` and frees its slot, invalidating the id and
    /// dropping its callback. Not-live observers are ignored.
    pub fn remove_observer(&mut self, host: &mut H, observer: ObserverId) {
        self.disconnect(host, observer);
        self.registry.remove(observer);
    }

    /// Recomputes intersection for every observer watching `target`.
    ///
    /// The host calls this for each region whose geometry, connectivity, or
    /// clipping changed within the current task. Regions nobody watches are
    /// ignored.
    pub fn region_mutated(&mut self, host: &H, target: H::Region) {
        for observer in self.registry.watchers_of(target) {
            self.recompute(host, observer, target);
        }
    }

    /// Delivers every queued batch to its observer's callback.
    ///
    /// Batches drain in first-pending observer order; within a batch,
    /// entries follow the observer's original `observe` order. The queue is
    /// taken up front, so callbacks that observe, unobserve, or mutate only
    /// affect the next flush. An observer removed by an earlier callback in
    /// the same flush is skipped.
    pub fn flush(&mut self, host: &mut H) {
        for (observer, mut batch) in self.scheduler.take() {
            let Some(slot) = self.registry.get_mut(observer) else {
                continue;
            };
            let mut entries = Vec::with_capacity(batch.len());
            for (target, state) in &slot.states {
                // A pair re-created after its entry was queued starts over.
                if state.initial_pending {
                    continue;
                }
                if let Some(entry) = batch.remove(target) {
                    entries.push(entry);
                }
            }
            if entries.is_empty() {
                continue;
            }
            let Some(mut callback) = slot.callback.take() else {
                continue;
            };
            if let Some(trace) = self.trace.as_deref_mut() {
                trace.flushed(observer, entries.len());
            }
            callback(&entries, observer, &mut *self, host);
            if let Some(slot) = self.registry.get_mut(observer) {
                if slot.callback.is_none() {
                    slot.callback = Some(callback);
                }
            }
        }
    }

    /// Recomputes one pair and queues, replaces, or suppresses its report.
    fn recompute(&mut self, host: &H, observer: ObserverId, target: H::Region) {
        let Some(slot) = self.registry.get(observer) else {
            return;
        };
        let Some(state) = slot.state(target) else {
            return;
        };
        let stored = *state;

        let entry = if host.is_connected(target) {
            let bounding_rect = host.bounding_rect(target);
            let root_bounds = host.root_bounds(slot.root);
            let clips = host.clip_chain(target, slot.root);
            let region = intersect_region(bounding_rect, root_bounds, &clips);
            IntersectionEntry {
                target,
                bounding_rect,
                root_bounds,
                intersection_rect: region.rect,
                target_ratio: region.target_ratio,
                root_ratio: region.root_ratio,
                is_intersecting: slot.thresholds.classify(region.target_ratio),
            }
        } else {
            // A pair that has never reported stays silent until it connects.
            if stored.initial_pending {
                return;
            }
            IntersectionEntry::degenerate(target)
        };

        // Drop non-initial reports that would repeat the last reported
        // values exactly.
        if !stored.initial_pending
            && entry.target_ratio == stored.target_ratio
            && entry.root_ratio == stored.root_ratio
            && entry.is_intersecting == stored.intersecting
        {
            if let Some(trace) = self.trace.as_deref_mut() {
                trace.suppressed(observer, target);
            }
            return;
        }

        if let Some(state) = self
            .registry
            .get_mut(observer)
            .and_then(|slot| slot.state_mut(target))
        {
            state.target_ratio = entry.target_ratio;
            state.root_ratio = entry.root_ratio;
            state.intersecting = entry.is_intersecting;
            state.initial_pending = false;
        }

        match self.scheduler.enqueue(observer, entry) {
            Enqueue::New => {
                if let Some(trace) = self.trace.as_deref_mut() {
                    trace.enqueued(observer, target, stored.initial_pending);
                }
            }
            Enqueue::Replaced => {
                if let Some(trace) = self.trace.as_deref_mut() {
                    trace.replaced(observer, target);
                }
            }
        }
    }
}
