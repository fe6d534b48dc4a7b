// src/cli.rs
// =============================================================================
// This file defines the command-line interface using the `clap` crate.
//
//   name-harvester run            crawl every API version concurrently
//   name-harvester run v2         crawl a single version
//   name-harvester profiles       list the known versions
//
// Global flags (--config, --output-dir, --base-url, --verbose) can be given
// before or after the subcommand and override the settings file.
// =============================================================================

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "name-harvester",
    version,
    about = "Enumerates every name behind a rate-limited autocomplete API",
    long_about = "name-harvester probes an autocomplete endpoint with every two-character prefix, \
                  expands prefixes whose results are cut off at the server's page size, and keeps \
                  a deduplicated list of names per API version on disk. Runs are cumulative."
)]
pub struct Cli {
    /// Settings file (TOML). Defaults to ./harvester.toml if present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for names_<version>.txt and failures_<version>.txt
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    /// Base URL of the service, e.g. http://localhost:8000
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Enable debug logging (per-query progress)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Crawl one API version, or all of them when VERSION is omitted
    ///
    /// Example: name-harvester run v1 --checkpoint-every 50
    Run {
        /// API version to crawl (v1, v2, v3)
        version: Option<String>,

        /// Print the run summary as JSON instead of a table
        #[arg(long)]
        json: bool,

        /// Expand truncated queries with the whole alphabet instead of
        /// resuming after the last returned name
        #[arg(long)]
        exhaustive_expansion: bool,

        /// Flush results to disk every N queries (0 = only at the end)
        #[arg(long)]
        checkpoint_every: Option<usize>,
    },

    /// List the known API versions and their limits
    Profiles,
}
