// src/fetch/testing.rs
// =============================================================================
// In-memory RawFetch for tests.
//
// Each query can be given a script of responses that are played back in
// order; once a script is used up (or for unscripted queries) the fetcher
// answers 200 with an empty list. Every call is recorded.
// =============================================================================

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::clock::ManualClock;
use super::raw::{RawFetch, RawResponse};
use crate::error::FetchError;

type Reply = Result<RawResponse, FetchError>;

#[derive(Default)]
pub struct ScriptedFetcher {
    scripts: Mutex<HashMap<String, VecDeque<Reply>>>,
    calls: Mutex<Vec<String>>,
    // Simulated round trip, applied to the manual clock on every call
    latency: Option<(Arc<ManualClock>, Duration)>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_latency(clock: Arc<ManualClock>, latency: Duration) -> Self {
        Self {
            latency: Some((clock, latency)),
            ..Self::default()
        }
    }

    pub fn reply(&self, query: &str, reply: Reply) {
        self.scripts
            .lock()
            .unwrap()
            .entry(query.to_string())
            .or_default()
            .push_back(reply);
    }

    pub fn names(&self, query: &str, names: &[&str]) {
        let body = serde_json::to_string(names).unwrap();
        self.reply(query, Ok(RawResponse::ok(body)));
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RawFetch for ScriptedFetcher {
    async fn fetch(&self, query: &str) -> Result<RawResponse, FetchError> {
        self.calls.lock().unwrap().push(query.to_string());

        if let Some((clock, latency)) = &self.latency {
            clock.advance(*latency);
        }

        let next = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(query)
            .and_then(|script| script.pop_front());

        next.unwrap_or_else(|| Ok(RawResponse::ok("[]")))
    }
}
