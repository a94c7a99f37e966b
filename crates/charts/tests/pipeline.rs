//! End-to-end pipeline runs against recording and failing sinks.

use benchcharts::error::{PipelineError, RenderError};
use benchcharts::{
    ArtifactPaths, Figure, FigureSink, LoadError, Pipeline, RunReport, Template, TemplateError,
};
use std::fs;
use std::path::{Path, PathBuf};

const RECORD: &str = r#"{
  "search_simple": [
    {"query": "love", "times_ms": [2.8, 3.6, 3.2], "mean_ms": 3.2,
     "stddev_ms": 0.32659863237109044, "result_count": 812},
    {"query": "whale", "times_ms": [4.0, 5.0], "mean_ms": 4.5, "stddev_ms": 0.5, "result_count": 31}
  ],
  "search_regex": [
    {"query": "(king|queen)", "times_ms": [40.0, 56.0], "mean_ms": 48.0,
     "stddev_ms": 8.0, "result_count": 57}
  ],
  "recommendations": [
    {"query": "book_1", "times_ms": [0.1, 0.3], "mean_ms": 0.2},
    {"query": "book_2", "times_ms": [0.4, 0.4], "mean_ms": 0.4}
  ]
}"#;

/// Records what it was asked to draw without touching the filesystem.
#[derive(Default)]
struct RecordingSink {
    saved: Vec<PathBuf>,
    fail_on: Option<&'static str>,
}

impl FigureSink for RecordingSink {
    fn save(&mut self, _figure: &Figure, artifacts: &ArtifactPaths) -> Result<(), RenderError> {
        let name = artifacts.vector.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        if self.fail_on.is_some_and(|stem| name.starts_with(stem)) {
            return Err(RenderError::Draw("backend exploded".to_string()));
        }
        self.saved.push(artifacts.vector.clone());
        Ok(())
    }
}

fn write_record(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("benchmark_results.json");
    fs::write(&path, content).unwrap();
    path
}

fn run(
    sink: &mut RecordingSink,
    input: &Path,
    out_dir: &Path,
) -> (Result<RunReport, PipelineError>, String) {
    let mut out = Vec::new();
    let result = Pipeline::new(sink).with_output_dir(out_dir).run(input, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_missing_input_aborts_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let mut sink = RecordingSink::default();

    let (result, console) = run(&mut sink, &dir.path().join("absent.json"), dir.path());

    assert!(matches!(
        result,
        Err(PipelineError::Load(LoadError::NotFound { .. }))
    ));
    assert!(sink.saved.is_empty());
    assert!(console.starts_with("Error: results file not found"));
    assert!(console.contains("go run ./cmd/benchmark"));
    assert!(!console.contains("SUMMARY STATISTICS"));
}

#[test]
fn test_malformed_input_aborts_before_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_record(dir.path(), "{\"search_simple\": 3}");
    let mut sink = RecordingSink::default();

    let (result, _) = run(&mut sink, &input, dir.path());

    assert!(matches!(
        result,
        Err(PipelineError::Load(LoadError::Malformed { .. }))
    ));
    assert!(sink.saved.is_empty());
}

#[test]
fn test_full_record_renders_every_template_in_order() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_record(dir.path(), RECORD);
    let mut sink = RecordingSink::default();

    let (result, console) = run(&mut sink, &input, dir.path());
    let report = result.unwrap();

    assert!(report.is_complete());
    let expected: Vec<PathBuf> = Template::ALL
        .iter()
        .map(|t| t.artifacts(dir.path()).vector)
        .collect();
    assert_eq!(sink.saved, expected);
    assert!(console.contains("=== SUMMARY STATISTICS ==="));
    assert!(console.contains("✓ All charts generated successfully!"));
    assert!(console.contains("\\includegraphics[width=\\textwidth]{chart_simple_search.pdf}"));
}

#[test]
fn test_failing_template_does_not_stop_the_others() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_record(dir.path(), RECORD);
    let mut sink = RecordingSink {
        fail_on: Some("chart_comparison"),
        ..Default::default()
    };

    let (result, console) = run(&mut sink, &input, dir.path());
    let report = result.unwrap();

    assert_eq!(sink.saved.len(), 4);
    assert_eq!(report.rendered(), 4);
    assert_eq!(report.failed(), 1);
    let failure = report.failures().next().unwrap();
    assert!(matches!(failure, TemplateError::Render { .. }));
    assert_eq!(failure.template(), Template::Comparison);

    assert!(console.contains("✗ Failed: comparison"));
    assert!(console.contains("=== SUMMARY STATISTICS ==="));
    assert!(console.contains("4 of 5 charts generated (0 skipped, 1 failed)"));
}

#[test]
fn test_empty_groups_are_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_record(
        dir.path(),
        r#"{"search_simple": [
            {"query": "love", "times_ms": [1.0], "mean_ms": 1.0, "stddev_ms": 0.0,
             "result_count": 3}
        ]}"#,
    );
    let mut sink = RecordingSink::default();

    let (result, console) = run(&mut sink, &input, dir.path());
    let report = result.unwrap();

    // Only the simple search bars and the result counts have data.
    assert_eq!(report.rendered(), 2);
    assert_eq!(report.skipped(), 3);
    assert_eq!(report.failed(), 0);
    assert_eq!(sink.saved.len(), 2);
    assert!(console.contains("- Skipped: "));
    assert!(console.contains("(no measurements)"));
}

#[test]
fn test_console_output_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_record(dir.path(), RECORD);

    let (_, first) = run(&mut RecordingSink::default(), &input, dir.path());
    let (_, second) = run(&mut RecordingSink::default(), &input, dir.path());

    assert_eq!(first, second);
}

#[test]
fn test_markdown_summary_is_written_alongside() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_record(dir.path(), RECORD);
    let markdown = dir.path().join("summary.md");
    let mut sink = RecordingSink::default();

    let mut out = Vec::new();
    Pipeline::new(&mut sink)
        .with_output_dir(dir.path())
        .with_markdown_summary(&markdown)
        .run(&input, &mut out)
        .unwrap();

    let text = fs::read_to_string(&markdown).unwrap();
    assert!(text.starts_with("# Benchmark Summary"));
    assert!(text.contains("Total measurements: 5"));
}
