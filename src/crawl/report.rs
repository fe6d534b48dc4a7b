// src/crawl/report.rs
// =============================================================================
// What a crawl hands back: the result set, the failures and some counters.
// =============================================================================

use serde::Serialize;
use std::collections::BTreeSet;

use crate::fetch::FailureReason;

// Terminal state of one dispatched query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryState {
    /// No names (including malformed responses)
    Empty,
    /// Fewer names than the result cap: the prefix is exhausted
    Partial,
    /// A full page: more names exist, the query gets expanded
    Truncated,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FailedQuery {
    pub query: String,
    pub reason: FailureReason,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CrawlStats {
    pub version: String,
    pub queries_dispatched: u64,
    /// HTTP requests actually sent, 429 retries included
    pub requests_sent: u64,
    pub duplicates_skipped: u64,
    pub empty: u64,
    pub partial: u64,
    pub truncated: u64,
    pub failed: u64,
    pub expansions_enqueued: u64,
    pub rate_limit_hits: u64,
    pub names_loaded: usize,
    pub names_discovered: usize,
    pub names_total: usize,
    pub final_interval_ms: u64,
    pub elapsed_ms: u64,
}

impl CrawlStats {
    pub fn record(&mut self, state: QueryState) {
        self.queries_dispatched += 1;
        match state {
            QueryState::Empty => self.empty += 1,
            QueryState::Partial => self.partial += 1,
            QueryState::Truncated => self.truncated += 1,
            QueryState::Failed => self.failed += 1,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub names: BTreeSet<String>,
    pub failures: Vec<FailedQuery>,
    pub stats: CrawlStats,
}
