// ==============================================================================
// main.rs - Genetics QC Entry Point
// ==============================================================================
// Description: Command-line entry point for sequencing QC summaries and the
//              coverage/sex QC filter
// Created: 2026-10-16
// Modified: 2026-10-16
// Version: 1.0.0
// ==============================================================================

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use genetics_qc::config::QcThresholds;
use genetics_qc::output::{self, DECISION_TABLE_FILE, MEAN_COVERAGE_TABLE_FILE};
use genetics_qc::parsers::IdxstatsParser;
use genetics_qc::processor::QcProcessor;
use genetics_qc::qc::MissingInputPolicy;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log at debug level unless RUST_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Reference names kept from idxstats (default chr1-22, chrX, chrY, chrM)
    #[arg(long, global = true, value_delimiter = ',')]
    targets: Option<Vec<String>>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse every sample's metrics and write a JSON summary
    Summary {
        #[command(flatten)]
        input: InputArgs,

        /// Summary output path
        #[arg(short, long, default_value = "qc-summary.json")]
        output: PathBuf,

        /// Record malformed samples in the summary instead of failing
        #[arg(long)]
        keep_going: bool,
    },

    /// Apply QC thresholds and write the decision table
    Filter {
        #[command(flatten)]
        input: InputArgs,

        /// QC thresholds (YAML)
        #[arg(short, long)]
        thresholds: PathBuf,

        /// Decision table output path (default <result-dir>/qc.tsv); mean_coverage.tsv is written alongside
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write NA for verdicts that cannot be computed instead of failing
        #[arg(long)]
        tolerate_missing: bool,
    },
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Workflow result directory, one subdirectory per sample
    #[arg(short, long, env = "GENETICS_QC_RESULT_DIR")]
    result_dir: PathBuf,

    /// Sample list (YAML sequence of sample identifiers)
    #[arg(short, long)]
    sample_list: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "genetics_qc=debug"
    } else {
        "genetics_qc=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    info!("Genetics QC starting...");

    let idxstats_parser = match cli.targets {
        Some(targets) if !targets.is_empty() => IdxstatsParser::with_targets(targets),
        Some(_) => {
            warn!("Empty --targets list, using default reference names");
            IdxstatsParser::new()
        }
        None => IdxstatsParser::new(),
    };

    match cli.command {
        Command::Summary {
            input,
            output,
            keep_going,
        } => {
            let processor = QcProcessor::new(input.result_dir, idxstats_parser);
            let summary = processor
                .summarize(&input.sample_list, keep_going)
                .context("Failed to summarize samples")?;

            let path = output::write_summary(&output, &summary)?;
            info!("Summary written: {:?}", path);
        }
        Command::Filter {
            input,
            thresholds,
            output,
            tolerate_missing,
        } => {
            let thresholds = QcThresholds::load(&thresholds).context("Failed to load QC thresholds")?;
            let policy = if tolerate_missing {
                MissingInputPolicy::ReportNa
            } else {
                MissingInputPolicy::Fail
            };

            let output = output.unwrap_or_else(|| input.result_dir.join(DECISION_TABLE_FILE));
            let processor = QcProcessor::new(input.result_dir, idxstats_parser);
            let table = processor
                .filter(&input.sample_list, thresholds, policy)
                .context("QC filter failed; no decision table written")?;

            output::write_mean_coverage_table(&output.with_file_name(MEAN_COVERAGE_TABLE_FILE), &table)?;
            let path = output::write_decision_table(&output, &table)?;
            info!("Decision table written: {:?}", path);
        }
    }

    Ok(())
}
