// src/fetch/mod.rs
// =============================================================================
// Everything between "I want names for this query" and the network.
//
// Submodules:
// - raw: the bare HTTP GET (RawFetch trait + reqwest implementation)
// - classify: reading response bodies into outcomes
// - rate: the adaptive interval between requests
// - clock: the time source, swappable in tests
// - client: ties the above together with retry/backoff for 429s
// =============================================================================

mod classify;
mod client;
mod clock;
mod rate;
mod raw;

#[cfg(test)]
pub mod testing;

pub use classify::{FailureReason, FetchOutcome};
pub use client::RateControlledClient;
pub use clock::{Clock, TokioClock};
pub use raw::{HttpFetcher, RawFetch};

#[cfg(test)]
pub use clock::ManualClock;
#[cfg(test)]
pub use raw::RawResponse;
