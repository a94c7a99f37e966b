// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! The chart generation run.
//!
//! A [`Pipeline`] loads the results record once, renders every template in
//! [`Template::ALL`] order, prints the summary table and closes with the
//! manifest of expected files:
//!
//! ```text
//! load ──(fails)──> diagnostic, no rendering
//!   │
//!   ├─ simple-search ─┐
//!   ├─ regex-search   │  each template isolated:
//!   ├─ comparison     │  a failure is reported
//!   ├─ recommendations│  and the next one runs
//!   ├─ result-counts ─┘
//!   ├─ summary table
//!   └─ manifest
//! ```

use crate::error::{PipelineError, TemplateError};
use crate::io::load_results;
use crate::render::FigureSink;
use crate::result::ResultsRecord;
use crate::stats;
use crate::style::ChartStyle;
use crate::summary::{render_markdown, write_summary};
use crate::templates::{ArtifactPaths, Plan, Template, RASTER_EXTENSION, VECTOR_EXTENSION};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// What happened to one template.
#[derive(Debug, Clone, PartialEq)]
pub enum TemplateOutcome {
    /// Both artifacts were written.
    Rendered(ArtifactPaths),
    /// The input had nothing to draw.
    Skipped {
        /// Why the template had nothing to draw.
        reason: String,
    },
}

/// Per-template outcomes of a run, in rendering order.
#[derive(Debug, Default)]
pub struct RunReport {
    /// One entry per attempted template.
    pub outcomes: Vec<(Template, Result<TemplateOutcome, TemplateError>)>,
}

impl RunReport {
    /// Number of templates whose artifacts were written.
    pub fn rendered(&self) -> usize {
        self.count(|o| matches!(o, Ok(TemplateOutcome::Rendered(_))))
    }

    /// Number of templates skipped for lack of data.
    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Ok(TemplateOutcome::Skipped { .. })))
    }

    /// Number of templates that failed.
    pub fn failed(&self) -> usize {
        self.count(|o| o.is_err())
    }

    /// Errors of the failed templates.
    pub fn failures(&self) -> impl Iterator<Item = &TemplateError> {
        self.outcomes.iter().filter_map(|(_, o)| o.as_ref().err())
    }

    /// Whether every template produced its artifacts.
    pub fn is_complete(&self) -> bool {
        self.rendered() == Template::ALL.len()
    }

    fn count(&self, pred: impl Fn(&Result<TemplateOutcome, TemplateError>) -> bool) -> usize {
        self.outcomes.iter().filter(|(_, o)| pred(o)).count()
    }
}

/// Orchestrates loading, rendering and reporting.
#[derive(Debug)]
pub struct Pipeline<S> {
    sink: S,
    style: ChartStyle,
    output_dir: PathBuf,
    markdown: Option<PathBuf>,
}

impl<S: FigureSink> Pipeline<S> {
    /// Pipeline drawing through `sink` into the working directory.
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            style: ChartStyle::default(),
            output_dir: PathBuf::from("."),
            markdown: None,
        }
    }

    /// Use `style` when building figures.
    pub fn with_style(mut self, style: ChartStyle) -> Self {
        self.style = style;
        self
    }

    /// Write artifacts into `dir`.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Also write the markdown summary to `path`.
    pub fn with_markdown_summary(mut self, path: impl Into<PathBuf>) -> Self {
        self.markdown = Some(path.into());
        self
    }

    /// Directory receiving the artifacts.
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// The sink the pipeline draws through.
    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Run the whole pipeline, writing console output to `out`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Load`] after printing a diagnostic when the
    /// record cannot be loaded; no template is attempted in that case.
    /// Template failures are not errors: they are reported in the returned
    /// [`RunReport`].
    pub fn run(&mut self, input: &Path, out: &mut dyn Write) -> Result<RunReport, PipelineError> {
        info!(
            input = %input.display(),
            output_dir = %self.output_dir.display(),
            "Starting chart generation"
        );

        let record = match load_results(input) {
            Ok(record) => record,
            Err(err) => {
                debug!(error = %err, "Cannot load benchmark results, aborting");
                writeln!(out, "Error: {err}")?;
                writeln!(out, "{}", err.hint())?;
                return Err(err.into());
            }
        };

        let drifting = audit_aggregates(&record);
        if drifting > 0 {
            warn!(
                count = drifting,
                "Stored aggregates disagree with raw samples; charts use stored values"
            );
        }

        writeln!(out, "Generating charts...")?;
        writeln!(out)?;
        let report = self.render_all(&record, out)?;

        writeln!(out)?;
        write_summary(&record, out)?;

        if let Some(path) = &self.markdown {
            write_markdown(path, &record, out)?;
        }

        writeln!(out)?;
        write_status(out, &report)?;
        writeln!(out)?;
        write_manifest(out, &self.output_dir)?;

        info!(
            rendered = report.rendered(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Chart generation finished"
        );
        Ok(report)
    }

    /// Render every template in order, one progress line each.
    pub fn render_all(
        &mut self,
        record: &ResultsRecord,
        out: &mut dyn Write,
    ) -> io::Result<RunReport> {
        let mut report = RunReport::default();

        for template in Template::ALL {
            let outcome = self.render_template(template, record);
            let name = artifact_name(&self.output_dir, template);
            match &outcome {
                Ok(TemplateOutcome::Rendered(_)) => {
                    info!(template = %template, "Chart generated");
                    writeln!(out, "✓ Generated: {name}.{VECTOR_EXTENSION}/{RASTER_EXTENSION}")?;
                }
                Ok(TemplateOutcome::Skipped { reason }) => {
                    warn!(template = %template, reason = %reason, "Chart skipped");
                    writeln!(out, "- Skipped: {name} ({reason})")?;
                }
                Err(err) => {
                    error!(template = %template, error = %err, "Chart failed");
                    writeln!(out, "✗ Failed: {err}")?;
                }
            }
            report.outcomes.push((template, outcome));
        }

        Ok(report)
    }

    /// Build and save one template's figure.
    pub fn render_template(
        &mut self,
        template: Template,
        record: &ResultsRecord,
    ) -> Result<TemplateOutcome, TemplateError> {
        let artifacts = template.artifacts(&self.output_dir);

        let plan = template
            .plan(record, &self.style)
            .map_err(|source| TemplateError::Empty { template, source })?;
        let figure = match plan {
            Plan::Draw(figure) => figure,
            Plan::Skip(reason) => return Ok(TemplateOutcome::Skipped { reason }),
        };

        self.sink
            .save(&figure, &artifacts)
            .map_err(|source| TemplateError::Render {
                template,
                path: source
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| artifacts.vector.clone()),
                source,
            })?;

        Ok(TemplateOutcome::Rendered(artifacts))
    }
}

/// Count measurements whose stored mean or deviation drifts from the raw
/// samples, logging each one.
pub fn audit_aggregates(record: &ResultsRecord) -> usize {
    let queries = record
        .search_simple
        .iter()
        .map(|m| ("search_simple", m))
        .chain(record.search_regex.iter().map(|m| ("search_regex", m)));

    let mut drifting = 0;
    for (group, m) in queries {
        if let Ok(summary) = stats::summarize(&m.times_ms) {
            if !summary.agrees_with(m.mean_ms, m.stddev_ms) {
                warn!(
                    group,
                    query = %m.query,
                    stored_mean = m.mean_ms,
                    computed_mean = summary.mean,
                    stored_stddev = m.stddev_ms,
                    computed_stddev = summary.std_dev,
                    "Aggregate drift"
                );
                drifting += 1;
            }
        }
    }

    for m in &record.recommendations {
        if let Ok(summary) = stats::summarize(&m.times_ms) {
            let stddev = m.stddev_ms.unwrap_or(summary.std_dev);
            if !summary.agrees_with(m.mean_ms, stddev) {
                warn!(
                    group = "recommendations",
                    book = %m.book,
                    stored_mean = m.mean_ms,
                    computed_mean = summary.mean,
                    "Aggregate drift"
                );
                drifting += 1;
            }
        }
    }

    drifting
}

fn write_markdown(path: &Path, record: &ResultsRecord, out: &mut dyn Write) -> io::Result<()> {
    match fs::write(path, render_markdown(record)) {
        Ok(()) => {
            info!(path = %path.display(), "Markdown summary written");
            writeln!(out)?;
            writeln!(out, "✓ Markdown summary: {}", path.display())
        }
        Err(err) => {
            error!(path = %path.display(), error = %err, "Markdown summary failed");
            writeln!(out)?;
            writeln!(out, "✗ Failed to write markdown summary {}: {err}", path.display())
        }
    }
}

fn write_status(out: &mut dyn Write, report: &RunReport) -> io::Result<()> {
    if report.is_complete() {
        writeln!(out, "✓ All charts generated successfully!")
    } else {
        writeln!(
            out,
            "⚠ {} of {} charts generated ({} skipped, {} failed)",
            report.rendered(),
            Template::ALL.len(),
            report.skipped(),
            report.failed()
        )
    }
}

/// Artifact path without extension, relative names kept short.
fn artifact_name(dir: &Path, template: Template) -> String {
    if dir == Path::new(".") || dir.as_os_str().is_empty() {
        template.file_stem().to_string()
    } else {
        dir.join(template.file_stem()).display().to_string()
    }
}

/// Write the list of expected artifacts and the LaTeX usage hint.
pub fn write_manifest(out: &mut dyn Write, output_dir: &Path) -> io::Result<()> {
    writeln!(out, "Generated files:")?;
    for template in Template::ALL {
        writeln!(
            out,
            "  - {}.{VECTOR_EXTENSION}/{RASTER_EXTENSION}",
            artifact_name(output_dir, template)
        )?;
    }
    writeln!(out)?;
    writeln!(out, "Copy PDF files to your LaTeX project and include them with:")?;
    writeln!(
        out,
        "  \\includegraphics[width=\\textwidth]{{{}.{VECTOR_EXTENSION}}}",
        Template::SimpleSearch.file_stem()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::QueryMeasurement;

    fn measurement(times: Vec<f64>, mean: f64, stddev: f64) -> QueryMeasurement {
        QueryMeasurement {
            query: "q".to_string(),
            times_ms: times,
            mean_ms: mean,
            stddev_ms: stddev,
            result_count: 0,
        }
    }

    #[test]
    fn test_audit_flags_only_drifting_measurements() {
        let record = ResultsRecord {
            search_simple: vec![
                measurement(vec![1.0, 3.0], 2.0, 1.0),
                measurement(vec![1.0, 3.0], 2.5, 1.0),
                measurement(Vec::new(), 9.0, 9.0),
            ],
            ..Default::default()
        };
        assert_eq!(audit_aggregates(&record), 1);
    }

    #[test]
    fn test_manifest_lists_all_artifacts() {
        let mut out = Vec::new();
        write_manifest(&mut out, Path::new(".")).unwrap();
        let text = String::from_utf8(out).unwrap();

        for template in Template::ALL {
            assert!(text.contains(&format!("  - {}.pdf/png\n", template.file_stem())));
        }
        assert!(text.ends_with("\\includegraphics[width=\\textwidth]{chart_simple_search.pdf}\n"));
    }

    #[test]
    fn test_manifest_prefixes_output_dir() {
        let mut out = Vec::new();
        write_manifest(&mut out, Path::new("figures")).unwrap();
        let text = String::from_utf8(out).unwrap();
        let stem = Path::new("figures").join("chart_comparison");
        let expected = format!("  - {}.pdf/png", stem.display());
        assert!(text.contains(&expected));
    }

    #[test]
    fn test_report_counts() {
        let report = RunReport {
            outcomes: vec![
                (
                    Template::SimpleSearch,
                    Ok(TemplateOutcome::Skipped {
                        reason: "empty".to_string(),
                    }),
                ),
                (
                    Template::Comparison,
                    Err(TemplateError::Empty {
                        template: Template::Comparison,
                        source: crate::error::EmptyInputError,
                    }),
                ),
            ],
        };
        assert_eq!(report.rendered(), 0);
        assert_eq!(report.skipped(), 1);
        assert_eq!(report.failed(), 1);
        assert!(!report.is_complete());
        assert_eq!(report.failures().count(), 1);
    }
}
