//! Site-Mirror main entry point
//!
//! This is the command-line interface for the Site-Mirror website mirror.

use anyhow::Context;
use clap::Parser;
use site_mirror::config::{
    compute_fingerprint, load_config, load_file_config, Config, FileConfig, RequestProtocol,
    RunOptions,
};
use site_mirror::crawler::mirror;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Site-Mirror: a resumable website mirror
///
/// Site-Mirror downloads every page and asset of a site that is reachable from
/// `/` through `href`/`src` attributes, maps each URL onto a file under the
/// target folder, and checkpoints its progress so an interrupted run can be
/// resumed with --reuse-target-folder.
#[derive(Parser, Debug)]
#[command(name = "site-mirror")]
#[command(version)]
#[command(about = "A resumable website mirror", long_about = None)]
struct Cli {
    /// Folder the site is mirrored into
    #[arg(long, value_name = "DIR", default_value = "downloaded")]
    target_folder: PathBuf,

    /// Continue a previous run in an existing target folder
    #[arg(long, conflicts_with = "delete_target_folder")]
    reuse_target_folder: bool,

    /// Delete an existing target folder before starting
    #[arg(long, conflicts_with = "reuse_target_folder")]
    delete_target_folder: bool,

    /// Comma-separated hostnames of the site; the first is used for requests
    #[arg(
        long,
        value_name = "HOSTS",
        value_delimiter = ',',
        required_unless_present = "stats"
    )]
    hostnames: Vec<String>,

    /// Protocol used for requests
    #[arg(long, value_enum, default_value_t = RequestProtocol::Https)]
    request_protocol: RequestProtocol,

    /// Do not ask for confirmation before deleting the target folder
    #[arg(long)]
    quiet: bool,

    /// Compare existing files against the site instead of downloading
    #[arg(long, conflicts_with = "delete_target_folder")]
    verify_downloaded: bool,

    /// Path to an optional TOML file with crawl rules and HTTP settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Validate configuration and show the effective settings without crawling
    #[arg(long, conflicts_with = "stats")]
    dry_run: bool,

    /// Show statistics of the persisted crawl state and exit
    #[arg(long, conflicts_with = "dry_run")]
    stats: bool,
}

impl Cli {
    fn run_options(&self) -> RunOptions {
        RunOptions {
            target_folder: self.target_folder.clone(),
            reuse_target_folder: self.reuse_target_folder,
            delete_target_folder: self.delete_target_folder,
            hostnames: self
                .hostnames
                .iter()
                .map(|hostname| hostname.trim().to_string())
                .filter(|hostname| !hostname.is_empty())
                .collect(),
            request_protocol: self.request_protocol,
            quiet: self.quiet,
            verify_downloaded: self.verify_downloaded,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    if cli.stats {
        return handle_stats(&cli);
    }

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = load_config(cli.run_options(), cli.config.as_deref())
        .context("Invalid configuration")?;

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    handle_crawl(config).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
///
/// `RUST_LOG` takes precedence when set.
fn setup_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("site_mirror=info,warn"),
        1 => EnvFilter::new("site_mirror=debug,info"),
        2 => EnvFilter::new("site_mirror=trace,debug"),
        _ => EnvFilter::new("trace"),
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: shows the effective settings
fn handle_dry_run(config: &Config) {
    println!("=== Site-Mirror Dry Run ===\n");

    println!("Run:");
    println!("  Target folder: {}", config.run.target_folder.display());
    println!("  Hostnames: {}", config.run.hostnames.join(", "));
    println!("  First request: {}", config.request_url("/"));
    println!("  Reuse target folder: {}", config.run.reuse_target_folder);
    println!("  Delete target folder: {}", config.run.delete_target_folder);
    println!("  Verify only: {}", config.run.verify_downloaded);

    let rules = &config.rules;
    println!("\nRules:");
    println!("  Ignored prefixes ({}):", rules.ignored_prefixes.len());
    for prefix in &rules.ignored_prefixes {
        println!("    - {}", prefix);
    }
    println!("  Ignored patterns ({}):", rules.ignored_patterns.len());
    for pattern in &rules.ignored_patterns {
        println!("    - {}", pattern);
    }
    println!("  Query-mapped keys: {}", rules.query_mapped_keys.join(", "));
    println!("  HTML content types: {}", rules.html_content_types.join(", "));
    println!("  Parse extensions: {}", rules.parse_extensions.join(", "));
    println!("  Rescan written files: {}", rules.rescan_written_files);

    println!("\nHTTP:");
    println!("  User agent: {}", config.http.user_agent);
    println!("  Timeout: {}s", config.http.timeout_secs);
    println!("  Connect timeout: {}s", config.http.connect_timeout_secs);

    println!("\nState:");
    println!("  Cache directory: {}", config.state.cache_dir.display());
    println!("  Report directory: {}", config.state.report_dir.display());
    println!("  Fingerprint: {}", compute_fingerprint(config));

    println!("\n✓ Configuration is valid");
}

/// Handles the --stats mode: shows statistics of the persisted state
///
/// The target folder checks of a crawl do not apply here, so the configuration
/// is assembled without validation.
fn handle_stats(cli: &Cli) -> anyhow::Result<()> {
    use site_mirror::output::{load_statistics, print_statistics};
    use site_mirror::storage::open_store;

    let file = match &cli.config {
        Some(path) => load_file_config(path)
            .with_context(|| format!("Failed to load {}", path.display()))?,
        None => FileConfig::default(),
    };
    let config = Config::new(cli.run_options(), file);

    println!("State: {}\n", config.state.cache_dir.display());

    let store = open_store(&config.state.cache_dir);
    let stats = load_statistics(&store, &config.run.hostnames)
        .context("Failed to read crawl state")?;

    print_statistics(&stats);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config) -> anyhow::Result<()> {
    tracing::info!(
        "Mirroring {} into {}",
        config.request_url("/"),
        config.run.target_folder.display()
    );
    if config.run.hostnames.len() > 1 {
        tracing::info!(
            "Also accepting links to: {}",
            config.run.hostnames[1..].join(", ")
        );
    }

    let Some(report) = mirror(config).await.context("Crawl failed")? else {
        tracing::info!("Crawl cancelled");
        return Ok(());
    };

    if report.unmappable.is_empty() {
        tracing::info!("Crawl completed successfully: {}", report);
        return Ok(());
    }

    tracing::info!("Crawl completed: {}", report);
    for subpath in &report.unmappable {
        tracing::error!("Not mirrored, no file path for subpath: {}", subpath);
    }
    anyhow::bail!(
        "{} subpaths could not be mapped to a file; add their query key to query-mapped-keys",
        report.unmappable.len()
    )
}
