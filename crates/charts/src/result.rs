// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! Benchmark results record types.
//!
//! This module provides the typed view of the `benchmark_results.json`
//! record written by the search engine's benchmark program. The record is
//! immutable once loaded: renderers and the summary reporter only borrow it.

use serde::Deserialize;

/// Root of a benchmark results record.
///
/// A group missing from the document is read as empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ResultsRecord {
    /// Plain keyword search measurements.
    #[serde(default)]
    pub search_simple: Vec<SimpleQueryMeasurement>,
    /// Regular expression search measurements.
    #[serde(default)]
    pub search_regex: Vec<RegexQueryMeasurement>,
    /// Book recommendation measurements.
    #[serde(default)]
    pub recommendations: Vec<RecommendationMeasurement>,
}

/// Timings for one search query, repeated over several trials.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QueryMeasurement {
    /// Literal query text.
    pub query: String,
    /// Raw per-trial durations in milliseconds.
    pub times_ms: Vec<f64>,
    /// Precomputed mean of `times_ms`.
    pub mean_ms: f64,
    /// Precomputed population standard deviation of `times_ms`.
    pub stddev_ms: f64,
    /// Number of books the query matched.
    pub result_count: u64,
}

/// A keyword search measurement.
pub type SimpleQueryMeasurement = QueryMeasurement;

/// A regular expression search measurement.
pub type RegexQueryMeasurement = QueryMeasurement;

/// Timings for the recommendations computed from one book.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecommendationMeasurement {
    /// Identity of the source book. The producer writes it as `query`.
    #[serde(alias = "query")]
    pub book: String,
    /// Raw per-trial durations in milliseconds.
    pub times_ms: Vec<f64>,
    /// Precomputed mean of `times_ms`.
    pub mean_ms: f64,
    /// Precomputed standard deviation, when the producer emitted one.
    #[serde(default)]
    pub stddev_ms: Option<f64>,
}

/// A violated record invariant, located by group, index and field.
#[derive(Debug, Clone, PartialEq)]
pub struct InvalidField {
    /// Group the offending entry belongs to.
    pub group: &'static str,
    /// Position of the entry in its group.
    pub index: usize,
    /// Offending field.
    pub field: &'static str,
    /// What is wrong with it.
    pub problem: &'static str,
}

impl std::fmt::Display for InvalidField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}[{}].{} {}",
            self.group, self.index, self.field, self.problem
        )
    }
}

impl ResultsRecord {
    /// Check the numeric invariants of every measurement.
    ///
    /// Durations must be finite and non-negative, aggregates finite, and
    /// standard deviations non-negative. Returns the first violation found.
    pub fn validate(&self) -> Result<(), InvalidField> {
        for (index, m) in self.search_simple.iter().enumerate() {
            m.validate("search_simple", index)?;
        }
        for (index, m) in self.search_regex.iter().enumerate() {
            m.validate("search_regex", index)?;
        }
        for (index, m) in self.recommendations.iter().enumerate() {
            m.validate(index)?;
        }
        Ok(())
    }

    /// Whether every group is empty.
    pub fn is_empty(&self) -> bool {
        self.search_simple.is_empty()
            && self.search_regex.is_empty()
            && self.recommendations.is_empty()
    }
}

impl QueryMeasurement {
    fn validate(&self, group: &'static str, index: usize) -> Result<(), InvalidField> {
        let invalid = |field, problem| InvalidField {
            group,
            index,
            field,
            problem,
        };
        check_durations(&self.times_ms).map_err(|p| invalid("times_ms", p))?;
        check_aggregate(self.mean_ms).map_err(|p| invalid("mean_ms", p))?;
        check_aggregate(self.stddev_ms).map_err(|p| invalid("stddev_ms", p))?;
        Ok(())
    }
}

impl RecommendationMeasurement {
    fn validate(&self, index: usize) -> Result<(), InvalidField> {
        let invalid = |field, problem| InvalidField {
            group: "recommendations",
            index,
            field,
            problem,
        };
        check_durations(&self.times_ms).map_err(|p| invalid("times_ms", p))?;
        check_aggregate(self.mean_ms).map_err(|p| invalid("mean_ms", p))?;
        if let Some(stddev) = self.stddev_ms {
            check_aggregate(stddev).map_err(|p| invalid("stddev_ms", p))?;
        }
        Ok(())
    }
}

fn check_durations(times: &[f64]) -> Result<(), &'static str> {
    times.iter().try_for_each(|t| check_aggregate(*t))
}

fn check_aggregate(value: f64) -> Result<(), &'static str> {
    if !value.is_finite() {
        Err("must be finite")
    } else if value < 0.0 {
        Err("must not be negative")
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRODUCER_OUTPUT: &str = r#"{
      "search_simple": [
        {"query_type": "simple", "query": "love", "times_ms": [1.5, 2.5],
         "mean_ms": 2.0, "stddev_ms": 0.5, "result_count": 812}
      ],
      "search_regex": [],
      "recommendations": [
        {"query_type": "recommendation", "query": "book_42", "times_ms": [0.1],
         "mean_ms": 0.1, "stddev_ms": 0.0, "result_count": 10}
      ]
    }"#;

    #[test]
    fn test_parses_producer_output() {
        let record: ResultsRecord = serde_json::from_str(PRODUCER_OUTPUT).unwrap();
        assert_eq!(record.search_simple.len(), 1);
        assert_eq!(record.search_simple[0].query, "love");
        assert_eq!(record.search_simple[0].result_count, 812);
        assert!(record.search_regex.is_empty());
        assert_eq!(record.recommendations[0].book, "book_42");
        assert_eq!(record.recommendations[0].stddev_ms, Some(0.0));
        assert!(record.validate().is_ok());
    }

    #[test]
    fn test_missing_group_reads_as_empty() {
        let record: ResultsRecord =
            serde_json::from_str(r#"{"search_simple": [], "search_regex": []}"#).unwrap();
        assert!(record.recommendations.is_empty());
        assert!(record.is_empty());
    }

    #[test]
    fn test_book_field_accepted_directly() {
        let item: RecommendationMeasurement =
            serde_json::from_str(r#"{"book": "Moby Dick", "times_ms": [], "mean_ms": 0.0}"#)
                .unwrap();
        assert_eq!(item.book, "Moby Dick");
        assert_eq!(item.stddev_ms, None);
    }

    #[test]
    fn test_negative_result_count_rejected_by_type() {
        let parsed: Result<QueryMeasurement, _> = serde_json::from_str(
            r#"{"query": "q", "times_ms": [], "mean_ms": 1.0, "stddev_ms": 0.0,
                "result_count": -1}"#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_validate_rejects_negative_stddev() {
        let mut record: ResultsRecord = serde_json::from_str(PRODUCER_OUTPUT).unwrap();
        record.search_simple[0].stddev_ms = -0.1;

        let err = record.validate().unwrap_err();
        assert_eq!(err.group, "search_simple");
        assert_eq!(err.field, "stddev_ms");
        assert_eq!(err.to_string(), "search_simple[0].stddev_ms must not be negative");
    }

    #[test]
    fn test_validate_rejects_non_finite_duration() {
        let mut record: ResultsRecord = serde_json::from_str(PRODUCER_OUTPUT).unwrap();
        record.recommendations[0].times_ms.push(f64::INFINITY);

        let err = record.validate().unwrap_err();
        assert_eq!(err.group, "recommendations");
        assert_eq!(err.field, "times_ms");
        assert_eq!(err.problem, "must be finite");
    }
}
