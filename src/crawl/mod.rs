// src/crawl/mod.rs
// =============================================================================
// This module runs the exhaustive prefix crawl for one API version.
//
// Submodules:
// - generator: seed queries and expansion queries
// - coordinator: the work-queue loop (dedup, expansion, checkpoints)
// - report: result set, failure list and counters handed back to main
//
// harvest() wires a profile to a real HTTP fetcher and the wall clock.
// harvest_with() takes both as parameters so a run can be driven by a fake
// server or a fake clock.
// =============================================================================

mod coordinator;
mod generator;
mod report;

use std::sync::Arc;

pub use coordinator::{Coordinator, CrawlOptions};
pub use generator::ExpansionPolicy;
pub use report::{CrawlReport, CrawlStats, FailedQuery};

use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{Clock, HttpFetcher, RateControlledClient, RawFetch, TokioClock};
use crate::profile::ApiProfile;
use crate::store::NameStore;

// Crawls one version against its real endpoint and persists the result
pub async fn harvest(
    profile: &ApiProfile,
    settings: &Settings,
    store: &dyn NameStore,
) -> Result<CrawlReport> {
    let fetcher = HttpFetcher::new(&profile.endpoint, settings)?;
    harvest_with(profile, settings, store, Arc::new(fetcher), Arc::new(TokioClock)).await
}

pub async fn harvest_with(
    profile: &ApiProfile,
    settings: &Settings,
    store: &dyn NameStore,
    fetcher: Arc<dyn RawFetch>,
    clock: Arc<dyn Clock>,
) -> Result<CrawlReport> {
    let client = RateControlledClient::new(
        fetcher,
        clock,
        profile.min_interval(),
        settings.rate.clone(),
        settings.retry.clone(),
    );

    Coordinator::new(profile, client, store, CrawlOptions::from_settings(settings))
        .run()
        .await
}
