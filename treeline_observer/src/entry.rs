// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The entry payload delivered to observer callbacks.

use kurbo::Rect;

/// One intersection report for one observed target.
///
/// Entries are batched per observer and delivered once per flush, ordered by
/// the original `observe` call order for that observer.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IntersectionEntry<R> {
    /// The observed target region.
    pub target: R,
    /// The target's unclipped bounding rectangle in the shared space.
    pub bounding_rect: Rect,
    /// The root's unclipped bounding rectangle (the viewport rectangle for
    /// the implicit root).
    pub root_bounds: Rect,
    /// The visible intersection of target and root after ancestor clipping.
    pub intersection_rect: Rect,
    /// Intersection area divided by target area.
    pub target_ratio: f64,
    /// Intersection area divided by root area.
    pub root_ratio: f64,
    /// Whether the target ratio reaches the observer's effective threshold.
    pub is_intersecting: bool,
}

impl<R> IntersectionEntry<R> {
    /// The degenerate report for a pair whose target is not currently
    /// connected to the host tree: zero rectangles, zero ratios, not
    /// intersecting.
    pub(crate) fn degenerate(target: R) -> Self {
        Self {
            target,
            bounding_rect: Rect::ZERO,
            root_bounds: Rect::ZERO,
            intersection_rect: Rect::ZERO,
            target_ratio: 0.0,
            root_ratio: 0.0,
            is_intersecting: false,
        }
    }
}
