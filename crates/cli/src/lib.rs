//! CLI for benchcharts.
//!
//! This crate provides the `benchcharts` command: the full chart pipeline
//! by default, plus `summary` and `manifest` subcommands.

#![warn(missing_docs, rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod logging;

use anyhow::{Context, Result};
use benchcharts::pipeline::write_manifest;
use benchcharts::{
    load_results, write_summary, ChartStyle, LoadError, Pipeline, PipelineError, PlottersSink,
    RESULTS_FILE,
};
use clap::{Parser, Subcommand};
use logging::LogFormat;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

/// Benchcharts CLI.
#[derive(Parser, Debug)]
#[command(name = "benchcharts")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Results record written by the benchmark.
    #[arg(short, long, global = true, env = "BENCHCHARTS_INPUT", default_value = RESULTS_FILE)]
    pub input: PathBuf,

    /// Directory receiving the chart files.
    #[arg(short, long, global = true, env = "BENCHCHARTS_OUTPUT_DIR", default_value = ".")]
    pub output_dir: PathBuf,

    /// Log level used when RUST_LOG is unset.
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    /// Log line layout.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    pub log_format: LogFormat,

    /// Subcommand to run; `render` when omitted.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Generate all charts, print the summary table and the file manifest.
    ///
    /// Each chart is written as <name>.pdf and <name>.png into the output
    /// directory. A chart that fails does not stop the others.
    Render {
        /// Also write a markdown summary to this path.
        #[arg(short, long)]
        markdown: Option<PathBuf>,
    },

    /// Print only the summary table.
    Summary,

    /// Print the files a render would produce, without reading input.
    Manifest,
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Finished. Some charts may have been skipped or failed.
    Success,
    /// The results record could not be loaded. The diagnostic has already
    /// been written to the console.
    LoadFailed,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::LoadFailed => ExitCode::FAILURE,
        }
    }
}

/// Run the CLI with the process arguments.
///
/// # Errors
///
/// Returns an error when console output cannot be written. A record that
/// cannot be loaded is reported as [`Status::LoadFailed`]; individual chart
/// failures are not errors.
pub fn run() -> Result<Status> {
    let cli = Cli::parse();
    logging::init(&cli.log_level, cli.log_format);
    execute(&cli, &mut io::stdout().lock())
}

/// Execute a parsed command, writing the console report to `out`.
pub fn execute(cli: &Cli, out: &mut dyn Write) -> Result<Status> {
    match cli.command.clone().unwrap_or(Commands::Render { markdown: None }) {
        Commands::Render { markdown } => {
            let style = ChartStyle::default();
            let mut pipeline = Pipeline::new(PlottersSink::new(style.clone()))
                .with_style(style)
                .with_output_dir(cli.output_dir.clone());
            if let Some(path) = markdown {
                pipeline = pipeline.with_markdown_summary(path);
            }

            match pipeline.run(&cli.input, out) {
                Ok(_) => Ok(Status::Success),
                Err(PipelineError::Load(_)) => Ok(Status::LoadFailed),
                Err(err) => Err(err).with_context(|| {
                    format!("chart generation from {} aborted", cli.input.display())
                }),
            }
        }
        Commands::Summary => match load_results(&cli.input) {
            Ok(record) => {
                write_summary(&record, out)?;
                Ok(Status::Success)
            }
            Err(err) => {
                write_load_diagnostic(out, &err)?;
                Ok(Status::LoadFailed)
            }
        },
        Commands::Manifest => {
            write_manifest(out, &cli.output_dir)?;
            Ok(Status::Success)
        }
    }
}

fn write_load_diagnostic(out: &mut dyn Write, err: &LoadError) -> io::Result<()> {
    writeln!(out, "Error: {err}")?;
    writeln!(out, "{}", err.hint())
}
