use anyhow::{Context, Result, anyhow, bail};
use clap::ArgMatches;
use colored::Colorize;
use skitter_core::crawl::{CrawlOptions, execute_crawl, parse_claim_policy};
use skitter_core::fixture::{DEMO_ROOT, demo_fetcher, load_fixture};
use skitter_core::report::{ReportFormat, render_report};
use skitter_scanner::{ClaimPolicy, CrawlOutcome, Fetcher, HttpFetcher};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::warn;
use url::Url;

// Helper functions for crawl handler

/// Load URLs from either a file or a single URL argument
pub fn load_urls_from_source(url: Option<&Url>, hosts_file: Option<&PathBuf>) -> Result<Vec<String>> {
    if let Some(hosts_file_path) = hosts_file {
        load_urls_from_file(hosts_file_path)
    } else if let Some(url) = url {
        Ok(vec![url.as_str().to_string()])
    } else {
        bail!("Either --url or --hosts-file must be provided")
    }
}

/// Load and parse URLs from a file
pub fn load_urls_from_file(path: &PathBuf) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read hosts file {}", path.display()))?;

    let urls: Vec<String> = content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| parse_url_line(line.trim()))
        .collect();

    if urls.is_empty() {
        bail!("No valid URLs found in {}", path.display());
    }

    Ok(urls)
}

/// Parse a single line as a URL, trying to add http:// if needed
pub fn parse_url_line(line: &str) -> Option<String> {
    if let Ok(url) = Url::parse(line)
        && url.has_host()
    {
        return Some(line.to_string());
    }

    let with_scheme = format!("http://{}", line);
    if Url::parse(&with_scheme).is_ok() {
        return Some(with_scheme);
    }

    warn!("Skipping invalid URL '{}'", line);
    None
}

fn claim_policy_arg(args: &ArgMatches) -> Result<ClaimPolicy> {
    let name = args
        .get_one::<String>("claim")
        .map(String::as_str)
        .unwrap_or("on-spawn");
    parse_claim_policy(name).ok_or_else(|| anyhow!("Unknown claim policy '{}'", name))
}

fn report_format_arg(args: &ArgMatches) -> Result<ReportFormat> {
    let name = args
        .get_one::<String>("format")
        .map(String::as_str)
        .unwrap_or("text");
    ReportFormat::from_str(name).ok_or_else(|| anyhow!("Unknown report format '{}'", name))
}

fn print_report(outcomes: &[CrawlOutcome], format: ReportFormat) -> Result<()> {
    let report = render_report(outcomes, format).context("Failed to render report")?;
    print!("{}", report);
    if format == ReportFormat::Json {
        println!();
    }
    Ok(())
}

async fn run_and_report(
    options: CrawlOptions,
    fetcher: Arc<dyn Fetcher>,
    format: ReportFormat,
    quiet: bool,
) -> Result<()> {
    let progress_callback = (!quiet).then(|| {
        Arc::new(|msg: String| {
            eprintln!("{}", msg);
        }) as skitter_core::CrawlProgressCallback
    });

    let outcomes = execute_crawl(options, fetcher, progress_callback, None).await;

    if !quiet {
        eprintln!("\n{} Crawl complete!\n", "✓".green().bold());
    }
    print_report(&outcomes, format)
}

pub async fn handle_crawl(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let url = sub_matches.get_one::<Url>("url");
    let hosts_file = sub_matches.get_one::<PathBuf>("hosts-file");
    let max_depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&4);
    let timeout = *sub_matches.get_one::<u64>("timeout").unwrap_or(&10);
    let claim_policy = claim_policy_arg(sub_matches)?;
    let format = report_format_arg(sub_matches)?;

    let roots = load_urls_from_source(url, hosts_file)?;
    let fetcher = HttpFetcher::with_timeout(timeout).context("Failed to set up HTTP client")?;

    if !quiet {
        eprintln!("\n🕷️  Crawling {} host(s)", roots.len());
        eprintln!("Max depth: {}", max_depth);
        eprintln!("Claim policy: {:?}\n", claim_policy);
    }

    let options = CrawlOptions {
        roots,
        max_depth,
        claim_policy,
        show_progress_bars: !quiet,
    };

    run_and_report(options, Arc::new(fetcher), format, quiet).await
}

pub async fn handle_demo(sub_matches: &ArgMatches, quiet: bool) -> Result<()> {
    let fixture = sub_matches.get_one::<PathBuf>("fixture");
    let max_depth = *sub_matches.get_one::<usize>("depth").unwrap_or(&4);
    let claim_policy = claim_policy_arg(sub_matches)?;
    let format = report_format_arg(sub_matches)?;

    let fetcher = match fixture {
        Some(path) => load_fixture(path)?,
        None => demo_fetcher(),
    };

    let root = match (sub_matches.get_one::<String>("root"), fixture) {
        (Some(root), _) => root.clone(),
        (None, None) => DEMO_ROOT.to_string(),
        (None, Some(path)) => bail!("--root is required with --fixture {}", path.display()),
    };

    if !quiet {
        eprintln!("\n🕷️  Crawling {} pages from {}", fetcher.len(), root);
        eprintln!("Max depth: {}", max_depth);
        eprintln!("Claim policy: {:?}\n", claim_policy);
    }

    let options = CrawlOptions {
        roots: vec![root],
        max_depth,
        claim_policy,
        show_progress_bars: false,
    };

    run_and_report(options, Arc::new(fetcher), format, quiet).await
}
