//! Textual summaries of a results record.
//!
//! [`SummaryTable`] is the fixed-width console table printed after the
//! charts. It holds no timestamps, so identical records always produce
//! identical text. [`MarkdownSummary`] carries the same numbers as a
//! markdown document for inclusion next to the charts.

use crate::result::{QueryMeasurement, RecommendationMeasurement, ResultsRecord};
use crate::stats::{self, Summary};
use chrono::{DateTime, Utc};
use std::fmt;
use std::io::{self, Write};

/// Width of the numeric columns' headings.
const HEADING_WIDTH: usize = 12;

/// Rule length beyond the label column.
const RULE_EXTRA: usize = 65;

/// Label column width of the keyword search table.
pub const SIMPLE_LABEL_WIDTH: usize = 15;

/// Label column width of the regex search table.
pub const REGEX_LABEL_WIDTH: usize = 20;

/// Label column width of the recommendation table.
pub const BOOK_LABEL_WIDTH: usize = 15;

/// Fixed-width console summary of a record.
#[derive(Debug, Clone, Copy)]
pub struct SummaryTable<'a>(pub &'a ResultsRecord);

/// Render the console summary to a string.
pub fn render_summary(record: &ResultsRecord) -> String {
    SummaryTable(record).to_string()
}

/// Write the console summary to `out`.
pub fn write_summary(record: &ResultsRecord, out: &mut dyn Write) -> io::Result<()> {
    write!(out, "{}", SummaryTable(record))
}

/// Render the markdown summary, stamped with the current time.
pub fn render_markdown(record: &ResultsRecord) -> String {
    MarkdownSummary::new(record).to_string()
}

impl fmt::Display for SummaryTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let record = self.0;

        writeln!(f, "=== SUMMARY STATISTICS ===")?;
        writeln!(f)?;
        query_table(f, "SIMPLE SEARCH", SIMPLE_LABEL_WIDTH, &record.search_simple)?;
        writeln!(f)?;
        query_table(f, "REGEX SEARCH", REGEX_LABEL_WIDTH, &record.search_regex)?;
        writeln!(f)?;
        recommendation_table(f, &record.recommendations)
    }
}

fn query_table(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    width: usize,
    group: &[QueryMeasurement],
) -> fmt::Result {
    writeln!(f, "{title}:")?;
    writeln!(
        f,
        "{:<width$} {:<hw$} {:<hw$} {:<hw$} {:<hw$} {}",
        "Query",
        "Mean (ms)",
        "StdDev",
        "Min",
        "Max",
        "Results",
        hw = HEADING_WIDTH,
    )?;
    writeln!(f, "{}", "-".repeat(width + RULE_EXTRA))?;

    if group.is_empty() {
        return writeln!(f, "(no measurements)");
    }
    for m in group {
        let (min, max) = extremes(&m.times_ms);
        writeln!(
            f,
            "{:<width$} {:>10.2}  {:>10.2}  {:>10}  {:>10}  {:>8}",
            m.query, m.mean_ms, m.stddev_ms, min, max, m.result_count,
        )?;
    }
    Ok(())
}

fn recommendation_table(
    f: &mut fmt::Formatter<'_>,
    group: &[RecommendationMeasurement],
) -> fmt::Result {
    writeln!(f, "RECOMMENDATIONS:")?;
    writeln!(
        f,
        "{:<width$} {:<hw$} {:<hw$} {:<hw$} {}",
        "Book",
        "Mean (ms)",
        "StdDev",
        "Min",
        "Max",
        width = BOOK_LABEL_WIDTH,
        hw = HEADING_WIDTH,
    )?;
    writeln!(f, "{}", "-".repeat(BOOK_LABEL_WIDTH + RULE_EXTRA - 10))?;

    if group.is_empty() {
        return writeln!(f, "(no measurements)");
    }
    for m in group {
        let (min, max) = extremes(&m.times_ms);
        writeln!(
            f,
            "{:<width$} {:>10.2}  {:>10}  {:>10}  {:>10}",
            m.book,
            m.mean_ms,
            recommendation_spread(m),
            min,
            max,
            width = BOOK_LABEL_WIDTH,
        )?;
    }

    writeln!(f)?;
    match aggregate_means(group) {
        Some(agg) => {
            writeln!(f, "Average time: {:.2} ms", agg.mean)?;
            writeln!(f, "StdDev: {:.2} ms", agg.std_dev)?;
            writeln!(f, "Min: {:.2} ms", agg.min)?;
            writeln!(f, "Max: {:.2} ms", agg.max)
        }
        None => writeln!(f, "(no aggregate available)"),
    }
}

/// Statistics across the per-item means of the recommendation group.
pub fn aggregate_means(group: &[RecommendationMeasurement]) -> Option<Summary> {
    let means: Vec<f64> = group.iter().map(|m| m.mean_ms).collect();
    stats::summarize(&means).ok()
}

/// Stored standard deviation, or one recomputed from the raw samples.
fn recommendation_spread(m: &RecommendationMeasurement) -> String {
    m.stddev_ms
        .or_else(|| stats::summarize(&m.times_ms).ok().map(|s| s.std_dev))
        .map(|s| format!("{s:.2}"))
        .unwrap_or_else(|| "n/a".to_string())
}

fn extremes(times: &[f64]) -> (String, String) {
    match stats::summarize(times) {
        Ok(s) => (format!("{:.2}", s.min), format!("{:.2}", s.max)),
        Err(_) => ("n/a".to_string(), "n/a".to_string()),
    }
}

/// Markdown rendition of the summary, stamped with its generation time.
#[derive(Debug, Clone)]
pub struct MarkdownSummary<'a> {
    record: &'a ResultsRecord,
    generated_at: DateTime<Utc>,
}

impl<'a> MarkdownSummary<'a> {
    /// Summary stamped with the current time.
    pub fn new(record: &'a ResultsRecord) -> Self {
        Self::at(record, Utc::now())
    }

    /// Summary stamped with `generated_at`.
    pub fn at(record: &'a ResultsRecord, generated_at: DateTime<Utc>) -> Self {
        Self {
            record,
            generated_at,
        }
    }
}

impl fmt::Display for MarkdownSummary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "# Benchmark Summary")?;
        writeln!(f)?;
        writeln!(f, "Generated: {}", self.generated_at.to_rfc3339())?;
        writeln!(f)?;

        markdown_query_table(f, "Simple search", &self.record.search_simple)?;
        markdown_query_table(f, "Regex search", &self.record.search_regex)?;

        writeln!(f, "## Recommendations")?;
        writeln!(f)?;
        writeln!(f, "| Book | Mean (ms) | StdDev (ms) | Min (ms) | Max (ms) |")?;
        writeln!(f, "|------|-----------|-------------|----------|----------|")?;
        for m in &self.record.recommendations {
            let (min, max) = extremes(&m.times_ms);
            writeln!(
                f,
                "| {} | {:.2} | {} | {} | {} |",
                escape_cell(&m.book),
                m.mean_ms,
                recommendation_spread(m),
                min,
                max
            )?;
        }
        writeln!(f)?;

        if let Some(agg) = aggregate_means(&self.record.recommendations) {
            writeln!(f, "- Average time: {:.2} ms", agg.mean)?;
            writeln!(f, "- StdDev: {:.2} ms", agg.std_dev)?;
            writeln!(f, "- Min: {:.2} ms", agg.min)?;
            writeln!(f, "- Max: {:.2} ms", agg.max)?;
            writeln!(f)?;
        }

        writeln!(f, "---")?;
        writeln!(
            f,
            "Total measurements: {}",
            self.record.search_simple.len()
                + self.record.search_regex.len()
                + self.record.recommendations.len()
        )
    }
}

fn markdown_query_table(
    f: &mut fmt::Formatter<'_>,
    title: &str,
    group: &[QueryMeasurement],
) -> fmt::Result {
    writeln!(f, "## {title}")?;
    writeln!(f)?;
    writeln!(f, "| Query | Mean (ms) | StdDev (ms) | Min (ms) | Max (ms) | Results |")?;
    writeln!(f, "|-------|-----------|-------------|----------|----------|---------|")?;
    for m in group {
        let (min, max) = extremes(&m.times_ms);
        writeln!(
            f,
            "| `{}` | {:.2} | {:.2} | {} | {} | {} |",
            escape_cell(&m.query),
            m.mean_ms,
            m.stddev_ms,
            min,
            max,
            m.result_count
        )?;
    }
    writeln!(f)
}

fn escape_cell(text: &str) -> String {
    text.replace('|', "\\|")
}
