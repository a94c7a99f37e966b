//! Publication charts for search benchmark results.
//!
//! This crate reads the results record written by the search benchmark and
//! turns it into five charts, each saved as a vector PDF and a raster PNG,
//! plus a fixed-width summary table.
//!
//! # Quick Start
//!
//! ```no_run
//! use benchcharts::{Pipeline, PlottersSink, ChartStyle};
//! use std::path::Path;
//!
//! let style = ChartStyle::default();
//! let mut pipeline = Pipeline::new(PlottersSink::new(style.clone()))
//!     .with_style(style)
//!     .with_output_dir("figures");
//!
//! let report = pipeline
//!     .run(Path::new("benchmark_results.json"), &mut std::io::stdout())
//!     .expect("results file should load");
//! println!("{} charts written", report.rendered());
//! ```
//!
//! # Modules
//!
//! - [`result`] - The results record and its validation
//! - [`io`] - Loading the record from disk
//! - [`stats`] - Mean, population standard deviation and range
//! - [`figure`] - Declarative chart descriptions
//! - [`templates`] - The five chart templates
//! - [`render`] - Drawing figures to PDF and PNG
//! - [`summary`] - Console and markdown summaries
//! - [`pipeline`] - The end-to-end run

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod error;
pub mod figure;
pub mod io;
pub mod pipeline;
pub mod render;
pub mod result;
pub mod stats;
pub mod style;
pub mod summary;
pub mod templates;

pub use error::{EmptyInputError, LoadError, PipelineError, RenderError, TemplateError};
pub use figure::Figure;
pub use io::{load_results, RESULTS_FILE};
pub use pipeline::{Pipeline, RunReport, TemplateOutcome};
pub use render::{FigureSink, PlottersSink};
pub use result::{QueryMeasurement, RecommendationMeasurement, ResultsRecord};
pub use stats::{summarize, Summary};
pub use style::ChartStyle;
pub use summary::{render_markdown, render_summary, write_summary, MarkdownSummary, SummaryTable};
pub use templates::{ArtifactPaths, Plan, Template};
