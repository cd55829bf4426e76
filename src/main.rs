//! CLI entry point for the CQS dashboard pipeline.
//!
//! Provides subcommands for building the full dashboard JSON, exporting the
//! per-video score table, and summarising the classification side tables.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use cqs_dashboard::PipelineConfig;
use cqs_dashboard::analyzers::analyzer::{run_dashboard, run_scores, run_summary};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "cqs_dashboard")]
#[command(about = "Scores video comments and builds the CQS dashboard data", long_about = None)]
struct Cli {
    /// JSON config file; flags below override its values
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Score all videos and write the dashboard JSON
    Dashboard {
        /// Comment-level CSV
        #[arg(long)]
        comments: Option<PathBuf>,

        /// Product classification CSV
        #[arg(long)]
        products: Option<PathBuf>,

        /// Video type classification CSV
        #[arg(long)]
        video_types: Option<PathBuf>,

        /// Where to write the dashboard JSON
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Seed for the synthetic trend history
        #[arg(long, conflicts_with = "unseeded")]
        seed: Option<u64>,

        /// Draw the trend history from OS entropy
        #[arg(long, default_value_t = false)]
        unseeded: bool,
    },
    /// Score all videos and write the per-video score table as CSV
    Score {
        /// Comment-level CSV
        #[arg(long)]
        comments: Option<PathBuf>,

        /// Where to write the score CSV
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Count videos per product and type from the side tables alone
    Summary {
        /// Product classification CSV
        #[arg(long)]
        products: Option<PathBuf>,

        /// Video type classification CSV
        #[arg(long)]
        video_types: Option<PathBuf>,

        /// Where to write the summary JSON
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/cqs_dashboard.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("cqs_dashboard.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    let as_of = Utc::now();

    match cli.command {
        Commands::Dashboard {
            comments,
            products,
            video_types,
            output,
            seed,
            unseeded,
        } => {
            override_path(&mut config.comments_path, comments);
            override_opt_path(&mut config.products_path, products);
            override_opt_path(&mut config.video_types_path, video_types);
            override_path(&mut config.output_path, output);
            if unseeded {
                config.history.seed = None;
            } else if seed.is_some() {
                config.history.seed = seed;
            }
            config.validate()?;

            let run = run_dashboard(&config, as_of).context("dashboard build failed")?;
            info!(
                videos = run.output.video_cqs_data.len(),
                dropped_rows = run.dropped.total(),
                "Successfully generated {}",
                config.output_path.display()
            );
        }
        Commands::Score { comments, output } => {
            override_path(&mut config.comments_path, comments);
            override_path(&mut config.scores_path, output);
            config.validate()?;

            let records = run_scores(&config, as_of).context("scoring failed")?;
            info!(
                videos = records.len(),
                "Successfully generated {}",
                config.scores_path.display()
            );
        }
        Commands::Summary {
            products,
            video_types,
            output,
        } => {
            override_opt_path(&mut config.products_path, products);
            override_opt_path(&mut config.video_types_path, video_types);
            override_path(&mut config.summary_path, output);
            config.validate()?;

            let run = run_summary(&config).context("summary build failed")?;
            info!(
                dropped_rows = run.dropped.total(),
                "Successfully generated {}",
                config.summary_path.display()
            );
        }
    }

    Ok(())
}

fn override_path(target: &mut PathBuf, value: Option<PathBuf>) {
    if let Some(value) = value {
        *target = value;
    }
}

fn override_opt_path(target: &mut Option<PathBuf>, value: Option<PathBuf>) {
    if value.is_some() {
        *target = value;
    }
}
