// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Treeline Observer: intersection tracking and observer dispatch over a host
//! region tree.
//!
//! This crate tracks how much of each observed target region is visible
//! within a root region (an explicit region or the implicit viewport) after
//! ancestor clipping, and delivers batched reports to observer callbacks at
//! task boundaries. The model follows the familiar intersection-observer
//! shape: observers carry threshold breakpoints, targets report coverage
//! ratios, and every report says whether the target currently counts as
//! intersecting.
//!
//! ## Division of labor
//!
//! The engine computes no layout and applies no transforms. The embedding
//! host implements [`HostTree`] to supply already-computed rectangles, all
//! expressed in one shared coordinate space, plus region validity,
//! connectivity, and keep-alive reference counting. The host's scheduler
//! drives the engine:
//!
//! - call [`Observatory::region_mutated`] for each region whose geometry,
//!   connectivity, or clipping changed within a task, and
//! - call [`Observatory::flush`] at the task boundary to deliver reports.
//!
//! Recomputations coalesce between flushes, so each (observer, target) pair
//! delivers at most one entry per flush, carrying the latest values.
//!
//! ## Quick start
//!
//! ```rust
//! use kurbo::Rect;
//! use smallvec::SmallVec;
//! use treeline_observer::{HostTree, Observatory, ObserverOptions};
//!
//! // A miniature host: a fixed viewport and regions indexed by position.
//! struct Host {
//!     rects: Vec<Rect>,
//!     refs: Vec<u32>,
//! }
//!
//! impl HostTree for Host {
//!     type Region = usize;
//!
//!     fn is_valid(&self, region: usize) -> bool {
//!         region < self.rects.len()
//!     }
//!     fn is_connected(&self, region: usize) -> bool {
//!         self.is_valid(region)
//!     }
//!     fn bounding_rect(&self, region: usize) -> Rect {
//!         self.rects[region]
//!     }
//!     fn clip_chain(&self, _region: usize, _root: Option<usize>) -> SmallVec<[Rect; 8]> {
//!         SmallVec::new()
//!     }
//!     fn viewport_rect(&self) -> Rect {
//!         Rect::new(0.0, 0.0, 1000.0, 1000.0)
//!     }
//!     fn retain(&mut self, region: usize) {
//!         self.refs[region] += 1;
//!     }
//!     fn release(&mut self, region: usize) {
//!         self.refs[region] -= 1;
//!     }
//! }
//!
//! let mut host = Host {
//!     rects: vec![Rect::new(0.0, 0.0, 100.0, 100.0)],
//!     refs: vec![0],
//! };
//! let mut observatory = Observatory::new();
//!
//! let observer = observatory
//!     .create_observer(
//!         &host,
//!         ObserverOptions::default(),
//!         Box::new(|entries, _, _, _| {
//!             assert_eq!(entries.len(), 1);
//!             assert!(entries[0].is_intersecting);
//!         }),
//!     )
//!     .unwrap();
//!
//! observatory.observe(&mut host, observer, 0).unwrap();
//! observatory.flush(&mut host);
//! ```
//!
//! ## API overview
//!
//! - [`Observatory`]: the engine; owns observers, per-pair state, and the
//!   dispatch queue.
//! - [`HostTree`]: the seam the embedding host implements.
//! - [`ObserverOptions`] and [`ThresholdInput`]: observer configuration.
//! - [`IntersectionEntry`]: the report payload delivered to callbacks.
//! - [`DispatchTrace`]: optional explainability sink for scheduling
//!   decisions ([`RecordingTrace`] records them in order).
//! - [`ObserverError`]: synchronous contract-violation errors.
//!
//! ## `no_std` Support
//!
//! This crate is `no_std` and uses `alloc`. The `std` feature (on by
//! default) only forwards to the geometry dependencies.

#![no_std]

extern crate alloc;

mod entry;
mod error;
mod host;
#[cfg(test)]
mod mock_host;
mod observatory;
mod registry;
mod schedule;
mod threshold;
mod trace;

pub use entry::IntersectionEntry;
pub use error::ObserverError;
pub use host::HostTree;
pub use observatory::{Observatory, ObserverCallback, ObserverOptions};
pub use registry::ObserverId;
pub use threshold::{
    ResolvedThresholds, ThresholdInput, normalize_primary, normalize_root_relative,
};
pub use trace::{DispatchEvent, DispatchTrace, RecordingTrace};
