// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Contract-violation errors raised by observer operations.

use core::fmt;

/// An error raised synchronously by an observer operation.
///
/// These are programming-contract violations, not transient failures: they
/// are raised at the violating call, never deferred into a flush, and the
/// failing call leaves no partial state behind. Geometric degeneracy (empty
/// rectangles, disconnected targets) is *not* an error and normalizes to
/// zero ratios instead.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ObserverError {
    /// A threshold breakpoint was non-finite or outside `[0, 1]`.
    InvalidThreshold {
        /// The offending breakpoint value.
        value: f64,
    },
    /// The configured root is not a live region handle in the host tree.
    InvalidRoot,
    /// The target passed to `observe`/`unobserve` is not a live region handle.
    InvalidTarget,
    /// The observer id does not refer to a live observer (it was removed, or
    /// its slot has been reused).
    UnknownObserver,
}

impl fmt::Display for ObserverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidThreshold { value } => {
                write!(f, "threshold values must be numbers between 0 and 1, got {value}")
            }
            Self::InvalidRoot => write!(f, "root is not a valid region handle"),
            Self::InvalidTarget => write!(f, "target is not a valid region handle"),
            Self::UnknownObserver => write!(f, "observer id does not refer to a live observer"),
        }
    }
}

impl core::error::Error for ObserverError {}
