// Copyright 2026 the Treeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Threshold normalization and the intersecting-classification decision table.

use alloc::vec;
use alloc::vec::Vec;

use crate::error::ObserverError;

/// A threshold configuration value, before normalization.
///
/// Mirrors the host-language configuration shape: absent, a single
/// breakpoint, or a sequence of breakpoints.
#[derive(Clone, Debug, PartialEq, Default)]
pub enum ThresholdInput {
    /// No value supplied; the field-specific default applies.
    #[default]
    Unset,
    /// A single breakpoint.
    Single(f64),
    /// A sequence of breakpoints, in any order.
    List(Vec<f64>),
}

impl From<f64> for ThresholdInput {
    fn from(value: f64) -> Self {
        Self::Single(value)
    }
}

impl From<Vec<f64>> for ThresholdInput {
    fn from(values: Vec<f64>) -> Self {
        Self::List(values)
    }
}

/// Validates breakpoints and sorts them ascending, preserving duplicates.
fn normalize_list(values: &[f64]) -> Result<Vec<f64>, ObserverError> {
    for &value in values {
        if !value.is_finite() || !(0.0..=1.0).contains(&value) {
            return Err(ObserverError::InvalidThreshold { value });
        }
    }
    let mut sorted = values.to_vec();
    sorted.sort_unstable_by(f64::total_cmp);
    Ok(sorted)
}

/// Normalizes a primary threshold configuration.
///
/// `Unset` and the empty sequence both yield the default `[0]`. Any
/// breakpoint that is non-finite or outside `[0, 1]` fails with
/// [`ObserverError::InvalidThreshold`] and nothing is produced.
pub fn normalize_primary(input: &ThresholdInput) -> Result<Vec<f64>, ObserverError> {
    match input {
        ThresholdInput::Unset => Ok(vec![0.0]),
        ThresholdInput::Single(value) => normalize_list(&[*value]),
        ThresholdInput::List(values) if values.is_empty() => Ok(vec![0.0]),
        ThresholdInput::List(values) => normalize_list(values),
    }
}

/// Normalizes a root-relative threshold configuration.
///
/// Unlike the primary set there is no default: `Unset` and the empty
/// sequence both yield `None`, meaning root-relative reporting is not
/// configured. Validation is identical to [`normalize_primary`].
pub fn normalize_root_relative(
    input: &ThresholdInput,
) -> Result<Option<Vec<f64>>, ObserverError> {
    match input {
        ThresholdInput::Unset => Ok(None),
        ThresholdInput::Single(value) => normalize_list(&[*value]).map(Some),
        ThresholdInput::List(values) if values.is_empty() => Ok(None),
        ThresholdInput::List(values) => normalize_list(values).map(Some),
    }
}

/// The normalized threshold sets of one observer.
///
/// Holds the sorted primary breakpoint list and the optional sorted
/// root-relative list, and owns the decision table that classifies a target
/// ratio as intersecting or not.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedThresholds {
    primary: Vec<f64>,
    root_relative: Option<Vec<f64>>,
}

impl ResolvedThresholds {
    /// Resolves the two configuration fields into normalized sets.
    ///
    /// When the root-relative field is supplied and valid while the primary
    /// field is unset, the primary set degrades to the empty list and
    /// classification shifts to full-containment semantics (see
    /// [`classify`](Self::classify)). A primary field that is explicitly
    /// supplied always wins, including an explicit empty sequence (which
    /// normalizes to `[0]`).
    pub fn resolve(
        primary: &ThresholdInput,
        root_relative: &ThresholdInput,
    ) -> Result<Self, ObserverError> {
        let root_relative = normalize_root_relative(root_relative)?;
        let primary = if matches!(primary, ThresholdInput::Unset) && root_relative.is_some() {
            Vec::new()
        } else {
            normalize_primary(primary)?
        };
        Ok(Self {
            primary,
            root_relative,
        })
    }

    /// The normalized primary breakpoint list. Empty only when the primary
    /// field was unset and a root-relative set is configured.
    #[must_use]
    pub fn primary(&self) -> &[f64] {
        &self.primary
    }

    /// The normalized root-relative breakpoint list, `None` when not
    /// configured.
    #[must_use]
    pub fn root_relative(&self) -> Option<&[f64]> {
        self.root_relative.as_deref()
    }

    /// The highest breakpoint of the effective primary set.
    ///
    /// The decision table, kept literal so it can be audited in isolation:
    /// a non-empty primary set is authoritative; otherwise a configured
    /// root-relative set implies full containment (`1`); otherwise the
    /// any-overlap default (`0`).
    #[must_use]
    pub fn effective_max(&self) -> f64 {
        match self.primary.last() {
            Some(max) => *max,
            None if self.root_relative.is_some() => 1.0,
            None => 0.0,
        }
    }

    /// Classifies a target-coverage ratio as intersecting.
    ///
    /// `true` iff the ratio is positive and reaches the highest effective
    /// primary breakpoint.
    #[must_use]
    pub fn classify(&self, target_ratio: f64) -> bool {
        target_ratio > 0.0 && target_ratio >= self.effective_max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_defaults_to_zero() {
        assert_eq!(normalize_primary(&ThresholdInput::Unset).unwrap(), vec![0.0]);
    }

    #[test]
    fn empty_list_defaults_to_zero() {
        assert_eq!(
            normalize_primary(&ThresholdInput::List(vec![])).unwrap(),
            vec![0.0]
        );
    }

    #[test]
    fn single_value_becomes_one_element_list() {
        assert_eq!(
            normalize_primary(&ThresholdInput::Single(0.5)).unwrap(),
            vec![0.5]
        );
    }

    #[test]
    fn sorts_ascending() {
        assert_eq!(
            normalize_primary(&ThresholdInput::List(vec![0.5, 0.0, 1.0])).unwrap(),
            vec![0.0, 0.5, 1.0]
        );
    }

    #[test]
    fn preserves_duplicates() {
        assert_eq!(
            normalize_primary(&ThresholdInput::List(vec![0.5, 0.5, 0.5])).unwrap(),
            vec![0.5, 0.5, 0.5]
        );
    }

    #[test]
    fn rejects_out_of_range() {
        assert_eq!(
            normalize_primary(&ThresholdInput::List(vec![1.01])),
            Err(ObserverError::InvalidThreshold { value: 1.01 })
        );
        assert_eq!(
            normalize_primary(&ThresholdInput::Single(-0.01)),
            Err(ObserverError::InvalidThreshold { value: -0.01 })
        );
    }

    #[test]
    fn rejects_non_finite() {
        assert!(normalize_primary(&ThresholdInput::Single(f64::NAN)).is_err());
        assert!(normalize_primary(&ThresholdInput::List(vec![0.5, f64::INFINITY])).is_err());
    }

    #[test]
    fn root_relative_unset_and_empty_are_unconfigured() {
        assert_eq!(normalize_root_relative(&ThresholdInput::Unset).unwrap(), None);
        assert_eq!(
            normalize_root_relative(&ThresholdInput::List(vec![])).unwrap(),
            None
        );
    }

    #[test]
    fn root_relative_normalizes_like_primary() {
        assert_eq!(
            normalize_root_relative(&ThresholdInput::List(vec![0.5, 0.0, 1.0])).unwrap(),
            Some(vec![0.0, 0.5, 1.0])
        );
        assert!(normalize_root_relative(&ThresholdInput::Single(2.0)).is_err());
    }

    #[test]
    fn primary_degrades_when_root_relative_configured() {
        let resolved =
            ResolvedThresholds::resolve(&ThresholdInput::Unset, &ThresholdInput::Single(0.5))
                .unwrap();
        assert_eq!(resolved.primary(), &[] as &[f64]);
        assert_eq!(resolved.root_relative(), Some(&[0.5][..]));
    }

    #[test]
    fn primary_survives_when_explicitly_supplied() {
        let resolved = ResolvedThresholds::resolve(
            &ThresholdInput::List(vec![0.25]),
            &ThresholdInput::Single(0.5),
        )
        .unwrap();
        assert_eq!(resolved.primary(), &[0.25]);
        assert_eq!(resolved.root_relative(), Some(&[0.5][..]));
    }

    #[test]
    fn invalid_root_relative_is_rejected_not_ignored() {
        assert!(
            ResolvedThresholds::resolve(&ThresholdInput::Unset, &ThresholdInput::Single(2.0))
                .is_err()
        );
    }

    #[test]
    fn unconfigured_root_relative_keeps_primary_default() {
        let resolved =
            ResolvedThresholds::resolve(&ThresholdInput::Unset, &ThresholdInput::List(vec![]))
                .unwrap();
        assert_eq!(resolved.primary(), &[0.0]);
        assert_eq!(resolved.root_relative(), None);
    }

    #[test]
    fn effective_max_decision_table() {
        let primary_only =
            ResolvedThresholds::resolve(&ThresholdInput::List(vec![0.0, 0.5, 1.0]), &ThresholdInput::Unset)
                .unwrap();
        assert_eq!(primary_only.effective_max(), 1.0);

        let defaulted =
            ResolvedThresholds::resolve(&ThresholdInput::Unset, &ThresholdInput::Unset).unwrap();
        assert_eq!(defaulted.effective_max(), 0.0);

        let degraded =
            ResolvedThresholds::resolve(&ThresholdInput::Unset, &ThresholdInput::Single(0.5))
                .unwrap();
        assert_eq!(degraded.effective_max(), 1.0);
    }

    #[test]
    fn classify_gates_on_effective_max() {
        let default =
            ResolvedThresholds::resolve(&ThresholdInput::Unset, &ThresholdInput::Unset).unwrap();
        assert!(default.classify(0.5));
        assert!(!default.classify(0.0));

        let full = ResolvedThresholds::resolve(
            &ThresholdInput::List(vec![1.0]),
            &ThresholdInput::Unset,
        )
        .unwrap();
        assert!(!full.classify(0.5));
        assert!(full.classify(1.0));

        // Root-relative configured, primary degraded: full-containment fallback.
        let degraded =
            ResolvedThresholds::resolve(&ThresholdInput::Unset, &ThresholdInput::Single(0.5))
                .unwrap();
        assert!(!degraded.classify(0.5));
        assert!(degraded.classify(1.0));
    }
}
