//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror crawler.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{load_config_with_hash, validate, Config};
use site_mirror::output::print_report;
use site_mirror::{Coordinator, RunState};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: a single-site web mirroring crawler
///
/// Site-Mirror starts from a seed URL, follows every same-site link to pages,
/// stylesheets, scripts and images, and writes each resource to a local
/// directory whose layout follows the URL paths.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "Mirror a single website to a local directory", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Seed URL, overrides `crawler.seed`
    #[arg(long, value_name = "URL")]
    seed: Option<String>,

    /// Mirror root directory, overrides `output.mirror-root`
    #[arg(long, value_name = "DIR")]
    mirror_root: Option<String>,

    /// URLs fetched concurrently per batch, overrides `crawler.batch-size`
    #[arg(long, value_name = "N")]
    batch_size: Option<usize>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be mirrored without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let mut config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => Config::default(),
    };

    apply_overrides(&mut config, &cli);
    validate(&config).context("invalid configuration")?;

    if cli.dry_run {
        print_dry_run(&config);
        return Ok(ExitCode::SUCCESS);
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("site_mirror=info,warn"),
            1 => EnvFilter::new("site_mirror=debug,info"),
            2 => EnvFilter::new("site_mirror=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Applies command-line overrides on top of the file configuration
fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(seed) = &cli.seed {
        config.crawler.seed = Some(seed.clone());
    }
    if let Some(root) = &cli.mirror_root {
        config.output.mirror_root = root.clone();
    }
    if let Some(batch_size) = cli.batch_size {
        config.crawler.batch_size = batch_size;
    }
}

/// Handles the --dry-run mode: shows the effective configuration
fn print_dry_run(config: &Config) {
    println!("=== Site-Mirror Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Seed: {}", config.crawler.seed.as_deref().unwrap_or("-"));
    println!("  Batch size: {}", config.crawler.batch_size);
    println!("  Request timeout: {}ms", config.crawler.request_timeout_ms);
    println!("  Connect timeout: {}ms", config.crawler.connect_timeout_ms);
    println!(
        "  Binary prefixes: {}",
        config.crawler.binary_prefixes.join(", ")
    );

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Mirror root: {}", config.output.mirror_root);

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<ExitCode> {
    let mut coordinator = Coordinator::new(config)?;

    let cancel = coordinator.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current batch");
            cancel.cancel();
        }
    });

    match coordinator.run().await {
        Ok(report) => {
            print_report(&report);
            match report.state {
                RunState::Done => Ok(ExitCode::SUCCESS),
                RunState::Cancelled => Ok(ExitCode::from(130)),
                _ => Ok(ExitCode::FAILURE),
            }
        }
        Err(e) => {
            tracing::error!("Crawl {}: {}", coordinator.state(), e);
            Err(e.into())
        }
    }
}
