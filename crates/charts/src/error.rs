// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for loading, summarizing and rendering.
//!
//! Errors fall into two classes. [`LoadError`] is fatal to a whole run and
//! is raised before any chart is attempted. [`EmptyInputError`] and
//! [`RenderError`] are fatal to one template only and reach the caller
//! wrapped in a [`TemplateError`] that names the template.

use crate::templates::Template;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Producer step that writes the results record.
pub const PRODUCER_COMMAND: &str = "go run ./cmd/benchmark";

/// Errors that can occur while loading the results record.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The results file does not exist.
    #[error("results file not found: {}", path.display())]
    NotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    /// The results file exists but is not a valid record.
    #[error("results file {} is malformed: {reason}", path.display())]
    Malformed {
        /// Path of the offending file.
        path: PathBuf,
        /// Parser or validation message.
        reason: String,
    },

    /// The results file could not be read.
    #[error("failed to read results file {}: {source}", path.display())]
    Io {
        /// Path of the unreadable file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl LoadError {
    /// Actionable advice for the operator.
    pub fn hint(&self) -> String {
        match self {
            Self::NotFound { .. } => format!(
                "Run the benchmark first to produce it: {}",
                PRODUCER_COMMAND
            ),
            Self::Malformed { .. } => format!(
                "Regenerate the file with the benchmark program: {}",
                PRODUCER_COMMAND
            ),
            Self::Io { .. } => "Check that the file is readable by the current user".to_string(),
        }
    }

    /// Path the loader was pointed at.
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound { path } | Self::Malformed { path, .. } | Self::Io { path, .. } => path,
        }
    }
}

/// Raised when statistics are requested over an empty sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot summarize an empty measurement sequence")]
pub struct EmptyInputError;

/// Errors raised while drawing or saving a figure.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The drawing backend rejected an operation.
    #[error("drawing failed: {0}")]
    Draw(String),

    /// The drawn figure could not be converted to an output format.
    #[error("{format} encoding failed: {reason}")]
    Encode {
        /// Output format being produced.
        format: &'static str,
        /// Encoder message.
        reason: String,
    },

    /// An artifact could not be written to disk.
    #[error("write failed: {source}")]
    Write {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

impl RenderError {
    /// Destination path involved in the failure, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Write { path, .. } => Some(path),
            _ => None,
        }
    }
}

/// A failure confined to a single chart template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Statistics could not be derived for the template's input.
    #[error("{template}: {source}")]
    Empty {
        /// Failing template.
        template: Template,
        /// Underlying error.
        #[source]
        source: EmptyInputError,
    },

    /// The template's figure could not be drawn or saved.
    #[error("{template} ({}): {source}", path.display())]
    Render {
        /// Failing template.
        template: Template,
        /// Artifact the template was producing.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: RenderError,
    },
}

impl TemplateError {
    /// Template the failure belongs to.
    pub fn template(&self) -> Template {
        match self {
            Self::Empty { template, .. } | Self::Render { template, .. } => *template,
        }
    }
}

/// Errors that abort a whole pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The results record could not be loaded.
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Console output could not be written.
    #[error("failed to write console output: {0}")]
    Console(#[from] io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_hint_names_producer() {
        let err = LoadError::NotFound {
            path: PathBuf::from("benchmark_results.json"),
        };
        assert_eq!(err.to_string(), "results file not found: benchmark_results.json");
        assert!(err.hint().contains(PRODUCER_COMMAND));
        assert_eq!(err.path(), Path::new("benchmark_results.json"));
    }

    #[test]
    fn test_template_error_names_path_once() {
        let err = TemplateError::Render {
            template: Template::Comparison,
            path: PathBuf::from("out/chart_comparison.pdf"),
            source: RenderError::Write {
                path: PathBuf::from("out/chart_comparison.pdf"),
                source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
            },
        };
        assert_eq!(
            err.to_string(),
            "comparison (out/chart_comparison.pdf): write failed: denied"
        );
        assert_eq!(err.template(), Template::Comparison);
    }
}
