//! LogGuard CLI
//!
//! Classifies log lines with the hybrid classifier: ordered regex rules
//! first, the sentence-embedding scorer for anything the rules miss.
//!
//! Results go to stdout; logs and metrics go to stderr.

use anyhow::Result;
use clap::{Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use std::path::PathBuf;
use tracing::info;

mod commands;
mod config;

#[derive(Parser, Debug)]
#[command(name = "logguard")]
#[command(about = "Hybrid regex + semantic log classifier", long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "logguard.yaml", env = "LOGGUARD_CONFIG")]
    config: PathBuf,

    /// YAML rules file to use instead of the built-in table
    #[arg(short, long, global = true)]
    rules: Option<PathBuf>,

    /// Device for the embedding model (cpu, cuda, mps)
    #[arg(short, long, global = true)]
    device: Option<String>,

    /// Print Prometheus metrics to stderr when done
    #[arg(long, global = true)]
    metrics: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Classify log lines given as arguments, or read from stdin
    Classify {
        /// Log lines; stdin is read line by line when none are given
        text: Vec<String>,

        /// Print one JSON object per line
        #[arg(long)]
        json: bool,

        /// Never load the semantic scorer
        #[arg(long)]
        rules_only: bool,
    },

    /// List the active rule table in precedence order
    Rules,

    /// Load the scorer and report whether it is usable
    Status,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let metrics_handle = if cli.metrics {
        Some(init_metrics()?)
    } else {
        None
    };

    let config = config::load(&cli)?;

    match &cli.command {
        Command::Classify {
            text,
            json,
            rules_only,
        } => commands::classify(&config, text, *json, *rules_only)?,
        Command::Rules => commands::rules(&config)?,
        Command::Status => commands::status(&config)?,
    }

    if let Some(handle) = metrics_handle {
        eprintln!("{}", handle.render());
    }

    Ok(())
}

/// Initialize tracing/logging on stderr
fn init_tracing(verbose: bool) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("logguard=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("logguard=info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

/// Install the Prometheus recorder and return the handle for rendering
fn init_metrics() -> Result<PrometheusHandle> {
    use metrics_exporter_prometheus::PrometheusBuilder;

    let handle = PrometheusBuilder::new()
        .install_recorder()
        .map_err(|e| anyhow::anyhow!("Failed to install metrics: {}", e))?;

    metrics::describe_counter!(
        "logguard_classifications_total",
        "Total number of log lines classified, by method"
    );
    metrics::describe_histogram!(
        "logguard_classification_latency_us",
        metrics::Unit::Microseconds,
        "Classification latency in microseconds"
    );

    info!("Metrics recorder installed");
    Ok(handle)
}
