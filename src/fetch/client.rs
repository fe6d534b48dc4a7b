// src/fetch/client.rs
// =============================================================================
// Rate-controlled fetch client.
//
// One logical "fetch names for query Q":
// 1. Wait until the current interval has passed since the last dispatch
// 2. Call the raw fetcher
// 3. Classify the response:
//    - 2xx with a name list      -> Names
//    - 2xx with anything else    -> Malformed (treated as empty)
//    - 429                       -> widen interval, back off, retry
//    - other status / transport  -> Failed, no retry
//
// The client never returns an error. Every call ends in an outcome the
// coordinator can record, so one bad query cannot stop a crawl.
//
// Each retry of a 429 is a real dispatch: it waits for the rate interval
// like any other request, on top of the backoff delay.
// =============================================================================

use std::sync::Arc;
use std::time::{Duration, Instant};

use super::classify::{parse_names, FailureReason, FetchOutcome};
use super::clock::Clock;
use super::raw::{RawFetch, RawResponse};
use super::rate::RateState;
use crate::config::{RateSettings, RetrySettings};
use crate::error::FetchError;

const TOO_MANY_REQUESTS: u16 = 429;

pub struct RateControlledClient {
    fetcher: Arc<dyn RawFetch>,
    clock: Arc<dyn Clock>,
    rate: RateState,
    retry: RetrySettings,
    dispatches: u64,
    rate_limit_hits: u64,
}

impl RateControlledClient {
    pub fn new(
        fetcher: Arc<dyn RawFetch>,
        clock: Arc<dyn Clock>,
        baseline: Duration,
        rate: RateSettings,
        retry: RetrySettings,
    ) -> Self {
        Self {
            fetcher,
            clock,
            rate: RateState::new(baseline, rate),
            retry,
            dispatches: 0,
            rate_limit_hits: 0,
        }
    }

    pub async fn fetch_names(&mut self, query: &str) -> FetchOutcome {
        let mut retries = 0;

        loop {
            let response = match self.dispatch(query).await {
                Ok(response) => response,
                Err(e) => {
                    log::warn!("Error fetching \"{}\": {}. Skipping...", query, e);
                    return FetchOutcome::Failed(FailureReason::Transport(e));
                }
            };

            if response.status == TOO_MANY_REQUESTS {
                self.rate_limit_hits += 1;
                self.rate.record_rate_limited();

                if retries >= self.retry.max_retries {
                    log::warn!(
                        "Rate limit hit for \"{}\", giving up after {} attempts",
                        query,
                        retries + 1
                    );
                    return FetchOutcome::Failed(FailureReason::RateLimited {
                        attempts: retries + 1,
                    });
                }

                retries += 1;
                let mut delay = self.retry.backoff_for(retries);
                if let Some(hint) = response.retry_after {
                    delay = delay.max(hint);
                }

                log::warn!(
                    "Rate limit hit for \"{}\". Backing off {:?} (retry {}/{}, interval now {:?})",
                    query,
                    delay,
                    retries,
                    self.retry.max_retries,
                    self.rate.current_interval()
                );
                self.clock.sleep(delay).await;
                continue;
            }

            return classify(query, response);
        }
    }

    // Waits out the rate interval, then performs one raw fetch
    async fn dispatch(&mut self, query: &str) -> Result<RawResponse, FetchError> {
        let wait = self.rate.wait_before_dispatch(self.clock.now());
        if !wait.is_zero() {
            log::debug!("Waiting {:?} before \"{}\" to stay under the rate limit", wait, query);
            self.clock.sleep(wait).await;
        }

        let started = self.clock.now();
        self.rate.record_dispatch(started);
        self.dispatches += 1;

        let result = self.fetcher.fetch(query).await;

        if let Ok(response) = &result {
            if is_success(response.status) {
                let latency = self.clock.now().saturating_duration_since(started);
                self.rate.record_latency(latency);
            }
        }

        result
    }

    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    pub fn rate_limit_hits(&self) -> u64 {
        self.rate_limit_hits
    }

    pub fn current_interval(&self) -> Duration {
        self.rate.current_interval()
    }
}

fn is_success(status: u16) -> bool {
    (200..300).contains(&status)
}

fn classify(query: &str, response: RawResponse) -> FetchOutcome {
    if !is_success(response.status) {
        log::warn!("Error fetching \"{}\": HTTP {}. Skipping...", query, response.status);
        return FetchOutcome::Failed(FailureReason::Status(response.status));
    }

    match parse_names(&response.body) {
        Ok(names) => FetchOutcome::Names(names),
        Err(reason) => {
            log::warn!("Malformed response for \"{}\": {}", query, reason);
            FetchOutcome::Malformed { reason }
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why Arc<dyn RawFetch> and Arc<dyn Clock>?
//    - The client doesn't care which fetcher or clock it talks to
//    - Production passes HttpFetcher + TokioClock, tests pass fakes
//    - Arc lets a test keep its own handle to inspect calls and sleeps
//
// 2. Why does fetch_names return FetchOutcome instead of Result?
//    - There is nothing the caller could do with an Err except log and skip
//    - An outcome enum makes "this never aborts the crawl" part of the type
//
// 3. What is saturating_sub?
//    - Subtraction that stops at zero instead of panicking on underflow
//    - Duration can't be negative, so "interval minus elapsed" needs it
// -----------------------------------------------------------------------------
