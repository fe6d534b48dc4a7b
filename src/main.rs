// src/main.rs
// =============================================================================
// This is the entry point of the harvester CLI.
//
// What happens here:
// 1. Parse command-line arguments using clap and set up logging
// 2. Load settings (file + flag overrides) and build the profile registry
// 3. Crawl the requested API version(s); several versions run concurrently,
//    each with its own rate state and result set
// 4. Print a summary and exit (0 = completed, 1 = invalid usage, 2 = error)
//
// Per-query failures do not change the exit code: they are written to
// failures_<version>.txt and counted in the summary.
// =============================================================================

mod cli;
mod config;
mod crawl;
mod error;
mod fetch;
mod profile;
mod store;

use anyhow::Result;
use clap::Parser;
use futures::future::join_all;

use cli::{Cli, Commands};
use config::Settings;
use crawl::{CrawlReport, CrawlStats, ExpansionPolicy};
use error::HarvestError;
use profile::{ApiProfile, ProfileRegistry};
use store::FileStore;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let exit_code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            2
        }
    };

    std::process::exit(exit_code);
}

// Default filter is info (debug with --verbose); RUST_LOG wins if set
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

async fn run(cli: Cli) -> Result<i32> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(base_url) = cli.base_url {
        settings.base_url = base_url;
    }
    if let Some(output_dir) = cli.output_dir {
        settings.output_dir = output_dir;
    }

    match cli.command {
        Commands::Run {
            version,
            json,
            exhaustive_expansion,
            checkpoint_every,
        } => {
            if exhaustive_expansion {
                settings.expansion = ExpansionPolicy::FullAlphabet;
            }
            if let Some(every) = checkpoint_every {
                settings.checkpoint_every = every;
            }
            settings.validate()?;

            let registry = ProfileRegistry::builtin(&settings.base_url)?;
            let profiles = match select_profiles(&registry, version.as_deref()) {
                Ok(profiles) => profiles,
                Err(e) if e.is_usage() => {
                    print_usage(&registry, &e);
                    return Ok(1);
                }
                Err(e) => return Err(e.into()),
            };

            handle_run(&settings, profiles, json).await
        }
        Commands::Profiles => {
            settings.validate()?;
            let registry = ProfileRegistry::builtin(&settings.base_url)?;
            print_profiles(&registry);
            Ok(0)
        }
    }
}

// One profile for `run <version>`, all of them for a bare `run`.
// Resolved before any network activity so a typo costs nothing.
fn select_profiles(
    registry: &ProfileRegistry,
    version: Option<&str>,
) -> error::Result<Vec<ApiProfile>> {
    match version {
        Some(version) => Ok(vec![registry.lookup(version)?.clone()]),
        None => Ok(registry.iter().cloned().collect()),
    }
}

async fn handle_run(settings: &Settings, profiles: Vec<ApiProfile>, json: bool) -> Result<i32> {
    let store = FileStore::new(&settings.output_dir);

    if profiles.len() == 1 {
        println!("🚀 Starting harvester for {}...", profiles[0].version);
    } else {
        println!("🚀 Running harvester for all API versions...");
    }

    // Versions share nothing mutable, so they can run side by side
    let runs = profiles
        .iter()
        .map(|profile| crawl::harvest(profile, settings, &store));
    let results = join_all(runs).await;

    let mut reports = Vec::new();
    let mut errored = false;
    for (profile, result) in profiles.iter().zip(results) {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                errored = true;
                eprintln!("❌ Harvest for {} failed: {}", profile.version, e);
            }
        }
    }

    if json {
        let stats: Vec<&CrawlStats> = reports.iter().map(|r| &r.stats).collect();
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        print_table(&reports, &store);
    }

    Ok(if errored { 2 } else { 0 })
}

fn print_usage(registry: &ProfileRegistry, error: &HarvestError) {
    eprintln!("❌ Invalid usage: {}", error);
    eprintln!("Usage: name-harvester run [VERSION]");
    eprintln!("Valid versions: {}", registry.versions().join(", "));
}

fn print_table(reports: &[CrawlReport], store: &FileStore) {
    println!();
    println!(
        "{:<8} {:>10} {:>10} {:>10} {:>8} {:>10} {:>10} {:>10}",
        "VERSION", "QUERIES", "REQUESTS", "TRUNCATED", "FAILED", "NEW", "TOTAL", "TIME"
    );
    println!("{}", "=".repeat(84));

    for report in reports {
        let stats = &report.stats;
        println!(
            "{:<8} {:>10} {:>10} {:>10} {:>8} {:>10} {:>10} {:>9}s",
            stats.version,
            stats.queries_dispatched,
            stats.requests_sent,
            stats.truncated,
            stats.failed,
            stats.names_discovered,
            report.names.len(),
            stats.elapsed_ms / 1000
        );
    }

    println!();
    for report in reports {
        let version = &report.stats.version;
        println!("✅ {}: names saved to {}", version, store.names_path(version).display());
        if !report.failures.is_empty() {
            println!(
                "⚠️  {}: {} failed queries listed in {}",
                version,
                report.failures.len(),
                store.failures_path(version).display()
            );
        }
    }
}

fn print_profiles(registry: &ProfileRegistry) {
    println!(
        "{:<8} {:>8} {:>8} {:>10}  {:<44} {}",
        "VERSION", "RESULTS", "REQ/MIN", "INTERVAL", "ALPHABET", "ENDPOINT"
    );
    println!("{}", "=".repeat(110));

    for profile in registry.iter() {
        println!(
            "{:<8} {:>8} {:>8} {:>8}ms  {:<44} {}",
            profile.version,
            profile.max_results,
            profile.max_requests_per_minute,
            profile.min_interval().as_millis(),
            format!("{:?}", profile.alphabet_string()),
            profile.endpoint
        );
    }
}
