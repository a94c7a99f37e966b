// Copyright 2025 Benchcharts Contributors
// SPDX-License-Identifier: Apache-2.0

//! The five chart templates.
//!
//! Each [`Template`] maps to a fixed pair of output files and knows how to
//! turn the results record into a [`Figure`]. Building a figure is pure; the
//! drawing itself happens in [`crate::render`].
//!
//! | Template | Input | Output |
//! |---|---|---|
//! | [`Template::SimpleSearch`] | `search_simple` | `chart_simple_search.{pdf,png}` |
//! | [`Template::RegexSearch`] | `search_regex` | `chart_regex_search.{pdf,png}` |
//! | [`Template::Comparison`] | both searches | `chart_comparison.{pdf,png}` |
//! | [`Template::Recommendations`] | `recommendations` | `chart_recommendations.{pdf,png}` |
//! | [`Template::ResultCounts`] | both searches | `chart_result_counts.{pdf,png}` |

use crate::error::EmptyInputError;
use crate::figure::{
    Bar, BarSeries, Callout, Figure, HistogramSeries, Panel, PanelContent, ReferenceLine,
};
use crate::result::{QueryMeasurement, RecommendationMeasurement, ResultsRecord};
use crate::stats;
use crate::style::{ChartStyle, Palette, Rgb};
use std::fmt;
use std::path::{Path, PathBuf};

/// Number of recommendation items whose samples feed the histogram.
pub const RECOMMENDATION_SAMPLE_ITEMS: usize = 10;

/// Bin count of the recommendation histogram.
pub const HISTOGRAM_BINS: usize = 30;

/// Gap between a result-count bar and its label, in books.
pub const COUNT_LABEL_OFFSET: f64 = 5.0;

/// Vector output extension.
pub const VECTOR_EXTENSION: &str = "pdf";

/// Raster output extension.
pub const RASTER_EXTENSION: &str = "png";

/// A fixed chart layout with its fixed output filenames.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Template {
    /// Per-query bars for keyword search.
    SimpleSearch,
    /// Per-query bars for regex search.
    RegexSearch,
    /// Aggregate keyword vs regex bars with a slowdown callout.
    Comparison,
    /// Histogram of recommendation timings.
    Recommendations,
    /// Side-by-side result counts for both searches.
    ResultCounts,
}

/// The two files a template writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    /// PDF output.
    pub vector: PathBuf,
    /// PNG output.
    pub raster: PathBuf,
}

/// What a template decided to do with the record.
#[derive(Debug, Clone, PartialEq)]
pub enum Plan {
    /// Draw this figure.
    Draw(Figure),
    /// Nothing to draw; the reason is reported to the operator.
    Skip(String),
}

impl Template {
    /// All templates in rendering order.
    pub const ALL: [Template; 5] = [
        Template::SimpleSearch,
        Template::RegexSearch,
        Template::Comparison,
        Template::Recommendations,
        Template::ResultCounts,
    ];

    /// Short name used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Self::SimpleSearch => "simple-search",
            Self::RegexSearch => "regex-search",
            Self::Comparison => "comparison",
            Self::Recommendations => "recommendations",
            Self::ResultCounts => "result-counts",
        }
    }

    /// Output filename without extension.
    pub fn file_stem(self) -> &'static str {
        match self {
            Self::SimpleSearch => "chart_simple_search",
            Self::RegexSearch => "chart_regex_search",
            Self::Comparison => "chart_comparison",
            Self::Recommendations => "chart_recommendations",
            Self::ResultCounts => "chart_result_counts",
        }
    }

    /// Output paths inside `dir`.
    pub fn artifacts(self, dir: &Path) -> ArtifactPaths {
        let stem = self.file_stem();
        ArtifactPaths {
            vector: dir.join(format!("{stem}.{VECTOR_EXTENSION}")),
            raster: dir.join(format!("{stem}.{RASTER_EXTENSION}")),
        }
    }

    /// Build the figure for this template.
    ///
    /// Empty input groups yield [`Plan::Skip`].
    pub fn plan(self, record: &ResultsRecord, style: &ChartStyle) -> Result<Plan, EmptyInputError> {
        match self {
            Self::SimpleSearch => {
                BarTemplate::simple_search(&style.palette).plan(&record.search_simple, style)
            }
            Self::RegexSearch => {
                BarTemplate::regex_search(&style.palette).plan(&record.search_regex, style)
            }
            Self::Comparison => comparison_plan(&record.search_simple, &record.search_regex, style),
            Self::Recommendations => recommendations_plan(&record.recommendations, style),
            Self::ResultCounts => {
                Ok(result_counts_plan(&record.search_simple, &record.search_regex, style))
            }
        }
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of a per-query bar chart with error bars.
#[derive(Debug, Clone, PartialEq)]
pub struct BarTemplate {
    /// Panel title, before the trial count note.
    pub title: &'static str,
    /// Horizontal axis description.
    pub x_label: &'static str,
    /// Vertical axis description.
    pub y_label: &'static str,
    /// Bar fill.
    pub color: Rgb,
    /// Decimal places of the value labels.
    pub precision: usize,
    /// Whether query names are drawn rotated.
    pub rotate_categories: bool,
    /// Gap between the error cap and the value label, in milliseconds.
    pub label_offset: f64,
    /// Figure size in inches.
    pub size: (f64, f64),
}

impl BarTemplate {
    /// Keyword search layout.
    pub fn simple_search(palette: &Palette) -> Self {
        Self {
            title: "Simple search performance",
            x_label: "Search query",
            y_label: "Time (ms)",
            color: palette.simple,
            precision: 2,
            rotate_categories: false,
            label_offset: 0.1,
            size: (10.0, 6.0),
        }
    }

    /// Regex search layout.
    pub fn regex_search(palette: &Palette) -> Self {
        Self {
            title: "Regex search performance",
            x_label: "Regular expression",
            y_label: "Time (ms)",
            color: palette.regex,
            precision: 1,
            rotate_categories: true,
            label_offset: 1.0,
            size: (12.0, 6.0),
        }
    }

    /// Value label for one bar.
    pub fn label(&self, mean: f64, std_dev: f64) -> String {
        format!("{mean:.prec$}±{std_dev:.prec$}", prec = self.precision)
    }

    /// One bar per measurement, in input order.
    pub fn bars(&self, group: &[QueryMeasurement]) -> Vec<Bar> {
        group
            .iter()
            .map(|m| Bar {
                category: m.query.clone(),
                value: m.mean_ms,
                error: Some(m.stddev_ms),
                label: self.label(m.mean_ms, m.stddev_ms),
                label_y: m.mean_ms + m.stddev_ms + self.label_offset,
                fill: self.color,
            })
            .collect()
    }

    /// Build the figure, or skip an empty group.
    pub fn plan(
        &self,
        group: &[QueryMeasurement],
        style: &ChartStyle,
    ) -> Result<Plan, EmptyInputError> {
        if group.is_empty() {
            return Ok(Plan::Skip("no measurements in group".to_string()));
        }

        let (width, height) = style.inches(self.size.0, self.size.1);
        Ok(Plan::Draw(Figure {
            width,
            height,
            panels: vec![Panel {
                title: format!("{} {}", self.title, spread_note(group)),
                x_label: self.x_label.to_string(),
                y_label: self.y_label.to_string(),
                content: PanelContent::Bars(BarSeries {
                    bars: self.bars(group),
                    rotate_categories: self.rotate_categories,
                }),
                callouts: Vec::new(),
            }],
        }))
    }
}

/// "(mean ± std. dev., n=100)" when every query ran the same number of trials.
fn spread_note(group: &[QueryMeasurement]) -> String {
    let trials = group.first().map(|m| m.times_ms.len()).unwrap_or(0);
    if trials > 0 && group.iter().all(|m| m.times_ms.len() == trials) {
        format!("(mean ± std. dev., n={trials})")
    } else {
        "(mean ± std. dev.)".to_string()
    }
}

/// A search group collapsed to a single point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroupAggregate {
    /// Mean of the per-query means.
    pub mean: f64,
    /// Mean of the per-query standard deviations.
    pub std_dev: f64,
}

impl GroupAggregate {
    /// Collapse a search group.
    ///
    /// # Errors
    ///
    /// Returns [`EmptyInputError`] for an empty group.
    pub fn of(group: &[QueryMeasurement]) -> Result<Self, EmptyInputError> {
        let means: Vec<f64> = group.iter().map(|m| m.mean_ms).collect();
        let std_devs: Vec<f64> = group.iter().map(|m| m.stddev_ms).collect();
        Ok(Self {
            mean: stats::mean(&means)?,
            std_dev: stats::mean(&std_devs)?,
        })
    }
}

/// How many times slower regex search is, when it can be computed.
pub fn slowdown(simple: &GroupAggregate, regex: &GroupAggregate) -> Option<f64> {
    (simple.mean > 0.0).then(|| regex.mean / simple.mean)
}

/// Callout text for a slowdown ratio.
pub fn slowdown_callout(ratio: f64) -> String {
    format!("RegEx is {ratio:.1}× slower")
}

fn comparison_plan(
    simple: &[QueryMeasurement],
    regex: &[QueryMeasurement],
    style: &ChartStyle,
) -> Result<Plan, EmptyInputError> {
    if simple.is_empty() || regex.is_empty() {
        return Ok(Plan::Skip(
            "comparison needs both simple and regex measurements".to_string(),
        ));
    }

    let simple_agg = GroupAggregate::of(simple)?;
    let regex_agg = GroupAggregate::of(regex)?;

    let bar = |category: &str, agg: GroupAggregate, fill: Rgb| Bar {
        category: category.to_string(),
        value: agg.mean,
        error: Some(agg.std_dev),
        label: format!("{:.1}±{:.1} ms", agg.mean, agg.std_dev),
        label_y: agg.mean + agg.std_dev + 1.0,
        fill,
    };

    let mut callouts = Vec::new();
    match slowdown(&simple_agg, &regex_agg) {
        Some(ratio) => callouts.push(Callout {
            text: slowdown_callout(ratio),
            x: 0.5,
            y: simple_agg.mean.max(regex_agg.mean) * 0.8,
        }),
        None => tracing::warn!(
            simple_mean = simple_agg.mean,
            "Simple search mean is not positive, omitting slowdown callout"
        ),
    }

    let (width, height) = style.inches(8.0, 6.0);
    Ok(Plan::Draw(Figure {
        width,
        height,
        panels: vec![Panel {
            title: "Search time comparison (overall mean ± std. dev.)".to_string(),
            x_label: String::new(),
            y_label: "Mean time (ms)".to_string(),
            content: PanelContent::Bars(BarSeries {
                bars: vec![
                    bar("Simple search", simple_agg, style.palette.simple),
                    bar("Regex search", regex_agg, style.palette.regex),
                ],
                rotate_categories: false,
            }),
            callouts,
        }],
    }))
}

/// Samples of the first [`RECOMMENDATION_SAMPLE_ITEMS`] items, in input order.
pub fn recommendation_samples(group: &[RecommendationMeasurement]) -> (usize, Vec<f64>) {
    let items = &group[..group.len().min(RECOMMENDATION_SAMPLE_ITEMS)];
    let samples = items
        .iter()
        .flat_map(|m| m.times_ms.iter().copied())
        .collect();
    (items.len(), samples)
}

fn recommendations_plan(
    group: &[RecommendationMeasurement],
    style: &ChartStyle,
) -> Result<Plan, EmptyInputError> {
    let (items, samples) = recommendation_samples(group);
    let Some(mut histogram) =
        HistogramSeries::from_samples(&samples, HISTOGRAM_BINS, &style.palette)
    else {
        return Ok(Plan::Skip("no recommendation samples".to_string()));
    };

    let mean = stats::mean(&samples)?;
    histogram.reference = Some(ReferenceLine {
        x: mean,
        label: format!("Mean: {mean:.2} ms"),
        color: style.palette.reference,
    });

    let (width, height) = style.inches(10.0, 6.0);
    Ok(Plan::Draw(Figure {
        width,
        height,
        panels: vec![Panel {
            title: format!(
                "Distribution of recommendation times ({} measurements over {} books)",
                samples.len(),
                items
            ),
            x_label: "Recommendation time (ms)".to_string(),
            y_label: "Frequency".to_string(),
            content: PanelContent::Histogram(histogram),
            callouts: Vec::new(),
        }],
    }))
}

fn count_panel(
    title: &str,
    x_label: &str,
    group: &[QueryMeasurement],
    fill: Rgb,
    rotate: bool,
) -> Panel {
    Panel {
        title: title.to_string(),
        x_label: x_label.to_string(),
        y_label: "Books found".to_string(),
        content: PanelContent::Bars(BarSeries {
            bars: group
                .iter()
                .map(|m| Bar {
                    category: m.query.clone(),
                    value: m.result_count as f64,
                    error: None,
                    label: m.result_count.to_string(),
                    label_y: m.result_count as f64 + COUNT_LABEL_OFFSET,
                    fill,
                })
                .collect(),
            rotate_categories: rotate,
        }),
        callouts: Vec::new(),
    }
}

fn result_counts_plan(
    simple: &[QueryMeasurement],
    regex: &[QueryMeasurement],
    style: &ChartStyle,
) -> Plan {
    if simple.is_empty() && regex.is_empty() {
        return Plan::Skip("no search measurements".to_string());
    }

    let (width, height) = style.inches(14.0, 6.0);
    Plan::Draw(Figure {
        width,
        height,
        panels: vec![
            count_panel("Results: simple search", "Query", simple, style.palette.simple, false),
            count_panel(
                "Results: regex search",
                "Regular expression",
                regex,
                style.palette.regex,
                true,
            ),
        ],
    })
}
