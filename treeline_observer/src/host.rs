// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The seam between the observer engine and the host tree.

use core::fmt::Debug;
use core::hash::Hash;

use kurbo::Rect;
use smallvec::SmallVec;

/// Geometry and lifecycle services the engine consumes from the host tree.
///
/// The engine never computes layout: the host supplies already-computed
/// rectangles, all expressed in one shared coordinate space, and owns the
/// keep-alive reference count of its regions. The host's scheduler is also
/// expected to drive the engine: call
/// [`Observatory::region_mutated`](crate::Observatory::region_mutated) for
/// every region whose geometry changed within a task, then
/// [`Observatory::flush`](crate::Observatory::flush) at the task boundary.
pub trait HostTree {
    /// Opaque handle identifying a region of the host tree.
    type Region: Copy + Eq + Hash + Debug;

    /// Whether `region` is a live region handle at all. Operations on
    /// handles failing this check are rejected, not ignored.
    fn is_valid(&self, region: Self::Region) -> bool;

    /// Whether `region` is currently connected to the host tree.
    fn is_connected(&self, region: Self::Region) -> bool;

    /// The region's unclipped bounding rectangle in the shared space.
    fn bounding_rect(&self, region: Self::Region) -> Rect;

    /// The ordered clip rectangles of overflow-hiding ancestors strictly
    /// between `region` and `root` (the implicit viewport when `None`),
    /// nearest ancestor first. Ancestors above the root never contribute.
    fn clip_chain(&self, region: Self::Region, root: Option<Self::Region>)
    -> SmallVec<[Rect; 8]>;

    /// The implicit top-level viewport rectangle.
    fn viewport_rect(&self) -> Rect;

    /// The reference rectangle for an observer's root: the region's own
    /// unclipped bounds for a custom root, the viewport otherwise.
    fn root_bounds(&self, root: Option<Self::Region>) -> Rect {
        match root {
            Some(region) => self.bounding_rect(region),
            None => self.viewport_rect(),
        }
    }

    /// Increments the shared keep-alive count of `region`. Called exactly
    /// once per (observer, target) observation created.
    fn retain(&mut self, region: Self::Region);

    /// Decrements the shared keep-alive count of `region`. Called exactly
    /// once per observation destroyed; the host may release the region once
    /// the count reaches zero.
    fn release(&mut self, region: Self::Region);
}
