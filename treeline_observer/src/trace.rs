// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Explainability hooks for dispatch scheduling.
//!
//! The scheduler intentionally does not store provenance for why an entry
//! was or was not delivered. For many embedders it is useful to answer
//! questions like: "why did this callback not fire?". This module provides
//! a minimal sink, [`DispatchTrace`], that the engine reports every
//! scheduling decision to, plus [`RecordingTrace`], which stores the
//! decisions in order.

use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::RefCell;

use crate::registry::ObserverId;

/// A callback sink for dispatch scheduling decisions.
///
/// Install one with
/// [`Observatory::set_trace`](crate::Observatory::set_trace).
pub trait DispatchTrace<R> {
    /// An entry was queued for a pair with no entry in the current task.
    /// `initial` marks the pair's first-ever report.
    fn enqueued(&mut self, observer: ObserverId, target: R, initial: bool);

    /// A queued entry for the pair was replaced within the same task.
    fn replaced(&mut self, observer: ObserverId, target: R);

    /// A recomputation produced values identical to the pair's last report
    /// and was dropped.
    fn suppressed(&mut self, observer: ObserverId, target: R);

    /// A queued entry was dropped by `unobserve` or `disconnect` before
    /// delivery.
    fn cancelled(&mut self, observer: ObserverId, target: R);

    /// A batch of `delivered` entries was handed to the observer's callback.
    fn flushed(&mut self, observer: ObserverId, delivered: usize);
}

/// One recorded scheduling decision.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DispatchEvent<R> {
    /// See [`DispatchTrace::enqueued`].
    Enqueued {
        /// The observer the entry was queued against.
        observer: ObserverId,
        /// The observed target.
        target: R,
        /// Whether this was the pair's first-ever report.
        initial: bool,
    },
    /// See [`DispatchTrace::replaced`].
    Replaced {
        /// The observer the entry was queued against.
        observer: ObserverId,
        /// The observed target.
        target: R,
    },
    /// See [`DispatchTrace::suppressed`].
    Suppressed {
        /// The observer the report belonged to.
        observer: ObserverId,
        /// The observed target.
        target: R,
    },
    /// See [`DispatchTrace::cancelled`].
    Cancelled {
        /// The observer the entry was queued against.
        observer: ObserverId,
        /// The observed target.
        target: R,
    },
    /// See [`DispatchTrace::flushed`].
    Flushed {
        /// The observer whose callback was invoked.
        observer: ObserverId,
        /// How many entries the batch carried.
        delivered: usize,
    },
}

/// Records scheduling decisions in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingTrace<R> {
    events: Vec<DispatchEvent<R>>,
}

impl<R> RecordingTrace<R> {
    /// Creates an empty recorder.
    #[must_use]
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// The recorded decisions, oldest first.
    #[must_use]
    pub fn events(&self) -> &[DispatchEvent<R>] {
        &self.events
    }

    /// Clears all recorded decisions.
    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl<R: Copy> DispatchTrace<R> for RecordingTrace<R> {
    fn enqueued(&mut self, observer: ObserverId, target: R, initial: bool) {
        self.events.push(DispatchEvent::Enqueued {
            observer,
            target,
            initial,
        });
    }

    fn replaced(&mut self, observer: ObserverId, target: R) {
        self.events.push(DispatchEvent::Replaced { observer, target });
    }

    fn suppressed(&mut self, observer: ObserverId, target: R) {
        self.events.push(DispatchEvent::Suppressed { observer, target });
    }

    fn cancelled(&mut self, observer: ObserverId, target: R) {
        self.events.push(DispatchEvent::Cancelled { observer, target });
    }

    fn flushed(&mut self, observer: ObserverId, delivered: usize) {
        self.events.push(DispatchEvent::Flushed {
            observer,
            delivered,
        });
    }
}

/// A shared recorder, so tests and inspectors can keep a handle to the
/// recording while the engine owns the installed sink.
impl<R: Copy> DispatchTrace<R> for Rc<RefCell<RecordingTrace<R>>> {
    fn enqueued(&mut self, observer: ObserverId, target: R, initial: bool) {
        self.borrow_mut().enqueued(observer, target, initial);
    }

    fn replaced(&mut self, observer: ObserverId, target: R) {
        self.borrow_mut().replaced(observer, target);
    }

    fn suppressed(&mut self, observer: ObserverId, target: R) {
        self.borrow_mut().suppressed(observer, target);
    }

    fn cancelled(&mut self, observer: ObserverId, target: R) {
        self.borrow_mut().cancelled(observer, target);
    }

    fn flushed(&mut self, observer: ObserverId, delivered: usize) {
        self.borrow_mut().flushed(observer, delivered);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let mut trace = RecordingTrace::new();
        let observer = ObserverId::new(0, 1);

        trace.enqueued(observer, 7_u32, true);
        trace.replaced(observer, 7);
        trace.suppressed(observer, 7);
        trace.cancelled(observer, 7);
        trace.flushed(observer, 0);

        assert_eq!(
            trace.events(),
            &[
                DispatchEvent::Enqueued {
                    observer,
                    target: 7,
                    initial: true
                },
                DispatchEvent::Replaced {
                    observer,
                    target: 7
                },
                DispatchEvent::Suppressed {
                    observer,
                    target: 7
                },
                DispatchEvent::Cancelled {
                    observer,
                    target: 7
                },
                DispatchEvent::Flushed {
                    observer,
                    delivered: 0
                },
            ]
        );

        trace.clear();
        assert!(trace.events().is_empty());
    }

    #[test]
    fn shared_recorder_forwards() {
        let recorder = Rc::new(RefCell::new(RecordingTrace::new()));
        let mut sink = Rc::clone(&recorder);
        let observer = ObserverId::new(0, 1);

        sink.enqueued(observer, 1_u32, false);
        assert_eq!(recorder.borrow().events().len(), 1);
    }
}
