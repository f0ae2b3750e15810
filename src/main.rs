//! tm-harvest main entry point
//!
//! This is the command-line interface for the trademark register harvester.

use anyhow::{bail, Context};
use clap::error::ErrorKind;
use clap::Parser;
use std::path::PathBuf;
use tm_harvest::config::{resolve_config, Config, CrawlOptions, DEFAULT_OUTPUT};
use tm_harvest::crawler::{enabled_next_selector, run_harvest};
use tm_harvest::output::print_statistics;
use tracing_subscriber::EnvFilter;

/// tm-harvest: a trademark register harvester
///
/// Drives the portal's advanced search for a date window, walks every result
/// page and writes one JSON record per detail page.
///
/// Dates may be given as the first two positional arguments or with
/// --start-date/--end-date.
#[derive(Parser, Debug)]
#[command(name = "tm-harvest")]
#[command(version)]
#[command(about = "A trademark register harvester", long_about = None)]
struct Cli {
    /// Start of the search window (YYYY-MM-DD)
    #[arg(value_name = "START_DATE")]
    start: Option<String>,

    /// End of the search window (YYYY-MM-DD)
    #[arg(value_name = "END_DATE")]
    end: Option<String>,

    /// Start of the search window (YYYY-MM-DD)
    #[arg(short = 's', long = "start-date", value_name = "DATE", conflicts_with = "start")]
    start_date: Option<String>,

    /// End of the search window (YYYY-MM-DD)
    #[arg(short = 'e', long = "end-date", value_name = "DATE", conflicts_with = "end")]
    end_date: Option<String>,

    /// Where to write the records
    #[arg(short, long, value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Path to TOML configuration file
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Advanced search page URL (overrides the config file)
    #[arg(long, value_name = "URL")]
    search_url: Option<String>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate inputs and show the planned search without launching a browser
    #[arg(long)]
    dry_run: bool,

    /// Show the browser window
    #[arg(long)]
    headful: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => e.exit(),
        Err(e) => {
            // Invalid usage exits with 1 rather than clap's default
            let _ = e.print();
            std::process::exit(1);
        }
    };

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let (Some(start), Some(end)) = (
        cli.start_date.as_deref().or(cli.start.as_deref()),
        cli.end_date.as_deref().or(cli.end.as_deref()),
    ) else {
        bail!("both a start date and an end date are required (see --help)");
    };

    // Dates are checked before the config so bad input never reaches the browser
    let options = CrawlOptions::new(start, end, cli.output.clone())?;

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = resolve_config(
        cli.config.as_deref(),
        cli.search_url.as_deref(),
        cli.headful,
    )
    .context("invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config, &options);
    } else {
        handle_harvest(config, options, cli.quiet).await?;
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
            0 => EnvFilter::new("tm_harvest=info,warn"),
            1 => EnvFilter::new("tm_harvest=debug,info"),
            2 => EnvFilter::new("tm_harvest=trace,debug"),
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

/// Handles the --dry-run mode: shows what the run would do
fn handle_dry_run(config: &Config, options: &CrawlOptions) {
    let portal = &config.portal;

    println!("=== tm-harvest Dry Run ===\n");

    println!("Search:");
    println!("  Search URL: {}", portal.search_url);
    println!("  Window: {} .. {}", options.start_date, options.end_date);
    println!(
        "  Typed into {} (date to): {}",
        portal.date_to_input,
        options.start_date.format(&portal.date_format)
    );
    println!(
        "  Typed into {} (date from): {}",
        portal.date_from_input,
        options.end_date.format(&portal.date_format)
    );

    println!("\nChecked boxes ({}):", portal.checked_boxes.len());
    for id in &portal.checked_boxes {
        println!("  - {}", id);
    }

    println!("\nPagination:");
    println!("  Row links: {}", portal.result_links);
    println!("  Next control: {}", enabled_next_selector(portal));
    println!("  Max jobs: {}", config.crawler.max_jobs);
    match config.crawler.max_pages {
        Some(pages) => println!("  Max pages: {}", pages),
        None => println!("  Max pages: unlimited"),
    }

    println!("\nBrowser:");
    match &config.browser.remote_debugging_url {
        Some(url) => println!("  Remote: {}", url),
        None => println!("  Headless: {}", config.browser.headless),
    }

    println!("\nOutput: {}", options.output.display());

    println!("\n✓ Configuration is valid");
}

/// Handles the main harvest operation
async fn handle_harvest(config: Config, options: CrawlOptions, quiet: bool) -> anyhow::Result<()> {
    tracing::info!("Search URL: {}", config.portal.search_url);
    tracing::info!("Output: {}", options.output.display());

    match run_harvest(config, options).await {
        Ok(stats) => {
            if !quiet {
                print_statistics(&stats);
            }
            Ok(())
        }
        Err(e) => {
            tracing::error!("Harvest failed: {}", e);
            Err(e.into())
        }
    }
}
