// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Treeline Geometry: clipped-rectangle intersection for visibility tracking.
//!
//! This crate is the pure geometric core of Treeline's intersection tracking:
//! given a target rectangle, a root rectangle, and the ordered clip rectangles
//! of overflow-hiding ancestors between them, it computes the visible
//! intersection and the two coverage ratios that drive reporting.
//!
//! All rectangles are consumed in one shared coordinate space supplied by the
//! caller; no coordinate transformation happens here. Degenerate overlaps
//! normalize to a zero-area rectangle anchored at the overlap's would-be
//! origin (the clamping behavior of [`Rect::intersect`]), never to a
//! sentinel value.
//!
//! # Example
//!
//! ```rust
//! use kurbo::Rect;
//! use treeline_geometry::intersect_region;
//!
//! // A 50x50 target scrolled 25px out of a clipping container.
//! let target = Rect::new(0.0, -25.0, 50.0, 25.0);
//! let clip = Rect::new(0.0, 0.0, 1000.0, 1000.0);
//! let root = Rect::new(0.0, 0.0, 1000.0, 1000.0);
//!
//! let region = intersect_region(target, root, &[clip]);
//! assert_eq!(region.rect, Rect::new(0.0, 0.0, 50.0, 25.0));
//! assert_eq!(region.target_ratio, 0.5);
//! ```
//!
//! This crate is `no_std` and does not allocate.

#![no_std]

use kurbo::Rect;

/// The visible intersection of a target with its root, plus coverage ratios.
///
/// Produced by [`intersect_region`]. The ratios are always finite and in
/// `[0, 1]` for well-formed (non-inverted) inputs.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RegionIntersection {
    /// The intersection rectangle. Zero-area when the target is not visible
    /// within the root, anchored at the would-be overlap origin.
    pub rect: Rect,
    /// Intersection area divided by target area; `0.0` for a zero-area target.
    pub target_ratio: f64,
    /// Intersection area divided by root area; `0.0` for a zero-area root.
    pub root_ratio: f64,
}

/// Folds a target rectangle through an ordered ancestor clip chain.
///
/// `clips` holds the clip rectangles of overflow-hiding ancestors between the
/// target and its root, nearest ancestor first. The fold is a plain rectangle
/// intersection at each step; once a step produces an empty rectangle the
/// result stays empty (though its anchor may still move with later clips).
#[must_use]
pub fn visible_rect(target: Rect, clips: &[Rect]) -> Rect {
    clips.iter().fold(target, |acc, clip| acc.intersect(*clip))
}

/// Computes the visible intersection of `target` with `root`.
///
/// The target is first folded through `clips` (see [`visible_rect`]), then
/// intersected with the root rectangle. Ratios are measured against the
/// *unclipped* target and root areas.
///
/// # Example
///
/// ```rust
/// use kurbo::Rect;
/// use treeline_geometry::intersect_region;
///
/// let target = Rect::new(0.0, 0.0, 100.0, 100.0);
/// let root = Rect::new(0.0, 0.0, 1000.0, 1000.0);
///
/// let region = intersect_region(target, root, &[]);
/// assert_eq!(region.target_ratio, 1.0);
/// assert_eq!(region.root_ratio, 0.01);
/// ```
#[must_use]
pub fn intersect_region(target: Rect, root: Rect, clips: &[Rect]) -> RegionIntersection {
    let rect = visible_rect(target, clips).intersect(root);
    RegionIntersection {
        rect,
        target_ratio: ratio(rect.area(), target.area()),
        root_ratio: ratio(rect.area(), root.area()),
    }
}

/// Area quotient with a zero denominator normalizing to zero.
fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}
