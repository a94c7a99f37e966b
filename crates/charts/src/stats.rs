// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! Aggregate statistics over measurement sequences.
//!
//! The standard deviation is the population form (divide by `n`), the
//! convention the benchmark program uses when it precomputes `stddev_ms`.

use crate::error::EmptyInputError;

/// Absolute tolerance used when comparing recomputed aggregates.
pub const ABSOLUTE_TOLERANCE: f64 = 1e-6;

/// Relative tolerance used when comparing recomputed aggregates.
pub const RELATIVE_TOLERANCE: f64 = 1e-6;

/// Aggregate statistics of a non-empty sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    /// Number of values.
    pub count: usize,
    /// Arithmetic mean.
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    /// Smallest value.
    pub min: f64,
    /// Largest value.
    pub max: f64,
}

/// Summarize a sequence of finite values.
///
/// Works on raw per-trial durations as well as on per-item means.
///
/// # Errors
///
/// Returns [`EmptyInputError`] when `values` is empty.
pub fn summarize(values: &[f64]) -> Result<Summary, EmptyInputError> {
    let (&first, rest) = values.split_first().ok_or(EmptyInputError)?;

    let n = values.len() as f64;
    let (min, max) = rest
        .iter()
        .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    // Rounding can push the mean of identical values one ulp outside [min, max].
    let mean = (values.iter().sum::<f64>() / n).clamp(min, max);

    let variance = values
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;

    Ok(Summary {
        count: values.len(),
        mean,
        std_dev: variance.sqrt(),
        min,
        max,
    })
}

/// Mean of a sequence, failing on empty input.
pub fn mean(values: &[f64]) -> Result<f64, EmptyInputError> {
    summarize(values).map(|s| s.mean)
}

impl Summary {
    /// Whether precomputed aggregates match this summary within tolerance.
    pub fn agrees_with(&self, mean: f64, std_dev: f64) -> bool {
        approx_eq(self.mean, mean) && approx_eq(self.std_dev, std_dev)
    }
}

fn approx_eq(a: f64, b: f64) -> bool {
    let diff = (a - b).abs();
    diff <= ABSOLUTE_TOLERANCE || diff <= RELATIVE_TOLERANCE * a.abs().max(b.abs())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_input_fails() {
        assert_eq!(summarize(&[]), Err(EmptyInputError));
        assert_eq!(mean(&[]), Err(EmptyInputError));
    }

    #[test]
    fn test_population_standard_deviation() {
        let summary = summarize(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_eq!(summary.count, 8);
        assert_eq!(summary.mean, 5.0);
        assert_eq!(summary.std_dev, 2.0);
        assert_eq!(summary.min, 2.0);
        assert_eq!(summary.max, 9.0);
    }

    #[test]
    fn test_single_value() {
        let summary = summarize(&[3.2]).unwrap();
        assert_eq!(summary.mean, 3.2);
        assert_eq!(summary.std_dev, 0.0);
        assert_eq!(summary.min, summary.max);
    }

    #[test]
    fn test_agrees_with_tolerates_rounding() {
        let summary = summarize(&[1.0, 2.0, 3.0]).unwrap();
        assert!(summary.agrees_with(2.0, (2.0f64 / 3.0).sqrt() + 1e-9));
        assert!(!summary.agrees_with(2.1, 0.816));
    }

    proptest! {
        #[test]
        fn summary_is_ordered(values in prop::collection::vec(0.0f64..10_000.0, 1..200)) {
            let summary = summarize(&values).unwrap();
            prop_assert!(summary.min <= summary.mean);
            prop_assert!(summary.mean <= summary.max);
            prop_assert!(summary.std_dev >= 0.0);
            prop_assert_eq!(summary.count, values.len());
        }

        #[test]
        fn constant_sequence_has_no_spread(value in 0.0f64..1_000.0, len in 1usize..50) {
            let summary = summarize(&vec![value; len]).unwrap();
            prop_assert_eq!(summary.mean, value);
            prop_assert!(summary.std_dev < 1e-9);
        }
    }
}
