use std::io::IsTerminal;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use jobhistory::config::{parse_duration, JobHistoryConfig};
use jobhistory::history::{FetchConfig, HttpSource};
use jobhistory::render;

#[derive(Parser)]
#[command(
    name = "jobhistory",
    about = "Show the run history of a CI job from a Prow-style dashboard",
    version,
    after_help = "Examples:\n  jobhistory --skip-status SUCCESS,Aborted minikube-periodics#ci-minikube-integration\n  jobhistory --min-duration 10m ci-minikube-integration"
)]
struct Cli {
    /// Job name, or `dashboard#tab`
    job: String,

    /// Comma-separated list of statuses to skip (e.g. SUCCESS,Aborted)
    #[arg(long, value_delimiter = ',')]
    skip_status: Option<Vec<String>>,

    /// Minimum run duration (e.g. 5m, 1h)
    #[arg(long)]
    min_duration: Option<String>,

    /// Maximum number of history pages to fetch (0 = library default)
    #[arg(long)]
    max_pages: Option<u32>,

    /// Path to a TOML config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// JSON output for machine parsing
    #[arg(long)]
    json: bool,

    /// Disable colored rows
    #[arg(long)]
    no_color: bool,

    /// Log bucket probing and pagination details to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(level: &str, json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = JobHistoryConfig::load_or_default(cli.config.as_deref())?;
    let level = if cli.verbose { "debug" } else { config.logging.level.as_str() };
    init_tracing(level, config.logging.json);

    let mut filter = config.filter_config()?;
    if let Some(statuses) = cli.skip_status {
        filter.skip_statuses = statuses.into_iter().filter(|s| !s.trim().is_empty()).collect();
    }
    if let Some(d) = &cli.min_duration {
        filter.min_duration = parse_duration(d).context("invalid --min-duration")?;
    }

    let fetch = FetchConfig {
        job_name: render::parse_job_name(&cli.job).to_string(),
        max_pages: cli.max_pages.unwrap_or(config.crawl.max_pages),
        filter,
    };

    if !cli.json {
        println!("Fetching history for job: {}", fetch.job_name);
    }

    let source = HttpSource::new(config.request_timeout())?;
    let resolver = config.resolver();
    let history = jobhistory::resolve_and_fetch(&source, &resolver, &fetch)
        .await
        .context("failed to fetch job history")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&history)?);
        return Ok(());
    }

    println!("Found {} jobs.\n", history.records.len());
    let color = !cli.no_color && std::io::stdout().is_terminal();
    print!("{}", render::render_table(&history.records, resolver.host(), color));

    Ok(())
}
