//! LinkSweep main entry point
//!
//! This is the command-line interface for the LinkSweep link-health crawler.

use anyhow::{bail, Context};
use clap::Parser;
use linksweep::config::{load_config_with_hash, validate, Config};
use linksweep::crawler::start_crawl_with_cancellation;
use linksweep::output::{ConsoleSink, CrawlReport, JsonSink, ResultSink};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// LinkSweep: a website link-health crawler
///
/// LinkSweep crawls the internal pages of a site up to a depth limit, checks
/// every link and resource reference it finds, and explains why broken links
/// are broken.
#[derive(Parser, Debug)]
#[command(name = "linksweep")]
#[command(version)]
#[command(about = "A website link-health crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Start URL; overrides the configuration file
    #[arg(long, required_unless_present = "config")]
    url: Option<String>,

    /// Maximum depth of internal pages to crawl
    #[arg(long)]
    max_depth: Option<u32>,

    /// Per-request timeout in seconds
    #[arg(long)]
    timeout: Option<f64>,

    /// Skip links containing this substring (repeatable)
    #[arg(long = "exclude", value_name = "PATTERN")]
    exclude: Vec<String>,

    /// Also write the report as JSON to this file
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// List working links as well as broken ones
    #[arg(long)]
    show_ok: bool,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (config, config_hash) = load(&cli)?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    let report = handle_crawl(config, config_hash).await?;

    let mut console = ConsoleSink::stdout().show_ok(cli.show_ok);
    console.write_report(&report)?;

    if let Some(path) = &cli.json {
        let mut sink = JsonSink::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        sink.write_report(&report)?;
        tracing::info!("JSON report written to {}", path.display());
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("linksweep=info,warn"),
            1 => EnvFilter::new("linksweep=debug,info"),
            2 => EnvFilter::new("linksweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Builds the configuration from the config file and command-line overrides
fn load(cli: &Cli) -> anyhow::Result<(Config, Option<String>)> {
    let (mut config, hash) = match (&cli.config, &cli.url) {
        (Some(path), _) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (config, Some(hash))
        }
        (None, Some(url)) => (Config::for_url(url.clone()), None),
        (None, None) => bail!("either a configuration file or --url is required"),
    };

    if let Some(url) = &cli.url {
        config.crawl.start_url = url.clone();
    }
    if let Some(max_depth) = cli.max_depth {
        config.crawl.max_depth = max_depth;
    }
    if let Some(timeout) = cli.timeout {
        config.crawl.timeout_seconds = timeout;
    }
    config.crawl.exclude_paths.extend(cli.exclude.iter().cloned());

    validate(&config).context("Invalid configuration")?;
    Ok((config, hash))
}

/// Handles the --dry-run mode: shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== LinkSweep Dry Run ===\n");

    println!("Crawl:");
    println!("  Start URL: {}", config.crawl.start_url);
    println!("  Max depth: {}", config.crawl.max_depth);
    println!("  Timeout: {}s", config.crawl.timeout_seconds);
    println!("  Exclude paths ({}):", config.crawl.exclude_paths.len());
    for path in &config.crawl.exclude_paths {
        println!("    - {}", path);
    }

    println!("\nChecker:");
    println!("  Retries: {}", config.checker.retry_count);
    println!("  Request delay: {}ms", config.checker.request_delay_ms);
    println!("  Backoff base: {}ms", config.checker.backoff_base_ms);
    println!(
        "  Max concurrent requests: {}",
        config.checker.max_concurrent_requests
    );
    println!(
        "  Max concurrent pages: {}",
        config.checker.max_concurrent_pages
    );
    println!("  Max redirects: {}", config.checker.max_redirects);
    match config.checker.max_crawl_seconds {
        Some(limit) => println!("  Time limit: {}s", limit),
        None => println!("  Time limit: none"),
    }
    println!("  Ignore patterns: {}", config.checker.ignore_patterns.join(", "));

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\n✓ Configuration is valid");
}

/// Handles the main crawl operation
///
/// Ctrl-C cancels the crawl; the results collected so far are still reported.
async fn handle_crawl(config: Config, config_hash: Option<String>) -> anyhow::Result<CrawlReport> {
    let cancel = CancellationToken::new();

    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing with partial results");
            on_interrupt.cancel();
        }
    });

    let mut report = match start_crawl_with_cancellation(config, cancel).await {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    if let Some(hash) = config_hash {
        report = report.with_config_hash(hash);
    }

    Ok(report)
}
