// src/crawl/coordinator.rs
// =============================================================================
// The crawl loop for one API version.
//
// How it works:
// 1. Seed the result set from whatever the store already has
// 2. Fill a FIFO queue with every two-character query
// 3. Pop a query; skip it if it was already dispatched
// 4. Fetch it through the rate-controlled client
// 5. Merge returned names (trimmed, blanks dropped) into the result set
// 6. If the response was a full page, push longer queries onto the queue
// 7. Repeat until the queue is empty, then flush to the store
//
// Expansion pushes onto the same queue instead of recursing, so prefixes
// can grow as long as the server keeps returning full pages without
// growing the stack.
//
// Failures never stop the loop. They are recorded and written to the
// store next to the names.
// =============================================================================

use std::collections::{BTreeSet, HashSet, VecDeque};

use super::generator::{expansion_queries, seed_queries, ExpansionPolicy};
use super::report::{CrawlReport, CrawlStats, FailedQuery, QueryState};
use crate::config::Settings;
use crate::error::Result;
use crate::fetch::{FetchOutcome, RateControlledClient};
use crate::profile::ApiProfile;
use crate::store::NameStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlOptions {
    pub expansion: ExpansionPolicy,
    /// Flush every N dispatched queries; 0 flushes only at the end
    pub checkpoint_every: usize,
}

impl CrawlOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            expansion: settings.expansion,
            checkpoint_every: settings.checkpoint_every,
        }
    }
}

pub struct Coordinator<'a> {
    profile: &'a ApiProfile,
    client: RateControlledClient,
    store: &'a dyn NameStore,
    options: CrawlOptions,
}

impl<'a> Coordinator<'a> {
    pub fn new(
        profile: &'a ApiProfile,
        client: RateControlledClient,
        store: &'a dyn NameStore,
        options: CrawlOptions,
    ) -> Self {
        Self {
            profile,
            client,
            store,
            options,
        }
    }

    pub async fn run(mut self) -> Result<CrawlReport> {
        let version = self.profile.version.clone();
        let started = self.client.now();

        log::info!(
            "Starting crawl for {} ({} characters, {} results per request, {:?} between requests)",
            version,
            self.profile.alphabet.len(),
            self.profile.max_results,
            self.profile.min_interval()
        );

        // Merge with earlier runs, never overwrite them
        let mut names = BTreeSet::new();
        for name in self.store.load_names(&version).await? {
            insert_name(&mut names, &name);
        }
        let names_loaded = names.len();
        if names_loaded > 0 {
            log::info!("Loaded {} existing names for {}", names_loaded, version);
        }

        let mut queue: VecDeque<String> = seed_queries(&self.profile.alphabet).into();
        let mut attempted: HashSet<String> = HashSet::new();
        let mut failures: Vec<FailedQuery> = Vec::new();
        let mut stats = CrawlStats {
            version: version.clone(),
            names_loaded,
            ..CrawlStats::default()
        };

        while let Some(query) = queue.pop_front() {
            if !attempted.insert(query.clone()) {
                stats.duplicates_skipped += 1;
                continue;
            }

            let state = match self.client.fetch_names(&query).await {
                FetchOutcome::Names(found) => {
                    let state = classify_count(found.len(), self.profile.max_results);
                    let added = found
                        .iter()
                        .filter(|name| insert_name(&mut names, name))
                        .count();

                    if !found.is_empty() {
                        log::debug!(
                            "Saved {} names from query \"{}\" ({} new)",
                            found.len(),
                            query,
                            added
                        );
                    }

                    if state == QueryState::Truncated {
                        let next: Vec<String> = expansion_queries(
                            &query,
                            &found,
                            &self.profile.alphabet,
                            self.options.expansion,
                        )
                        .into_iter()
                        .filter(|q| !attempted.contains(q))
                        .collect();

                        log::info!(
                            "Expanding query \"{}\" with {} longer queries",
                            query,
                            next.len()
                        );
                        stats.expansions_enqueued += next.len() as u64;
                        queue.extend(next);
                    }

                    state
                }
                FetchOutcome::Malformed { reason } => {
                    log::debug!("Treating \"{}\" as empty: {}", query, reason);
                    QueryState::Empty
                }
                FetchOutcome::Failed(reason) => {
                    failures.push(FailedQuery {
                        query: query.clone(),
                        reason,
                    });
                    QueryState::Failed
                }
            };
            stats.record(state);

            let every = self.options.checkpoint_every as u64;
            if every > 0 && stats.queries_dispatched % every == 0 {
                // A failed checkpoint is not fatal; the final flush will retry
                match self.flush(&version, &names, &failures).await {
                    Ok(()) => log::info!(
                        "Checkpoint for {}: {} queries, {} names, {} queued",
                        version,
                        stats.queries_dispatched,
                        names.len(),
                        queue.len()
                    ),
                    Err(e) => log::warn!("Checkpoint for {} failed: {}", version, e),
                }
            }
        }

        self.flush(&version, &names, &failures).await?;

        stats.requests_sent = self.client.dispatches();
        stats.rate_limit_hits = self.client.rate_limit_hits();
        stats.names_total = names.len();
        stats.names_discovered = names.len() - names_loaded;
        stats.final_interval_ms = self.client.current_interval().as_millis() as u64;
        stats.elapsed_ms = self
            .client
            .now()
            .saturating_duration_since(started)
            .as_millis() as u64;

        log::info!(
            "Crawl for {} finished: {} queries, {} names ({} new), {} failed",
            version,
            stats.queries_dispatched,
            stats.names_total,
            stats.names_discovered,
            stats.failed
        );

        Ok(CrawlReport {
            names,
            failures,
            stats,
        })
    }

    async fn flush(
        &self,
        version: &str,
        names: &BTreeSet<String>,
        failures: &[FailedQuery],
    ) -> Result<()> {
        self.store.save_names(version, names).await?;
        self.store.save_failures(version, failures).await
    }
}

fn classify_count(count: usize, max_results: usize) -> QueryState {
    if count == 0 {
        QueryState::Empty
    } else if count >= max_results {
        QueryState::Truncated
    } else {
        QueryState::Partial
    }
}

// Trims and inserts; returns true if the name was new.
// The names file is one name per line, so a name with a line break in it
// could not be written back faithfully and is dropped.
fn insert_name(names: &mut BTreeSet<String>, raw: &str) -> bool {
    let name = raw.trim();
    if name.contains(['\n', '\r']) {
        log::warn!("Dropping name with a line break: {:?}", name);
        return false;
    }
    if name.is_empty() || names.contains(name) {
        return false;
    }
    names.insert(name.to_string())
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why a BTreeSet for names?
//    - Same dedup guarantee as a HashSet
//    - Iterates in sorted order, so the output file is stable between runs
//
// 2. Why `attempted.insert(...)` instead of `contains` then `insert`?
//    - insert() returns false when the value was already there
//    - One lookup instead of two, and the check and the mark can't drift apart
//
// 3. What does `run(mut self)` mean?
//    - The coordinator is consumed by the run; it can't be reused afterwards
//    - Each crawl gets a fresh rate state and attempted set
// -----------------------------------------------------------------------------
