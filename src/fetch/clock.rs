// src/fetch/clock.rs
// =============================================================================
// Time source for the fetch client.
//
// Every wait in the harvester (spacing between requests, 429 backoff) goes
// through a Clock so tests can swap in a manual clock and check the exact
// durations without sleeping for real.
// =============================================================================

use async_trait::async_trait;
use std::time::{Duration, Instant};

#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;

    async fn sleep(&self, duration: Duration);
}

// Wall-clock time backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

#[cfg(test)]
pub use manual::ManualClock;

#[cfg(test)]
mod manual {
    use super::*;
    use std::sync::Mutex;

    // Virtual clock: sleeping returns immediately and moves time forward.
    // Every sleep is recorded so tests can assert on individual waits.
    #[derive(Debug)]
    pub struct ManualClock {
        start: Instant,
        state: Mutex<State>,
    }

    #[derive(Debug)]
    struct State {
        now: Instant,
        sleeps: Vec<Duration>,
    }

    impl ManualClock {
        pub fn new() -> Self {
            let start = Instant::now();
            Self {
                start,
                state: Mutex::new(State {
                    now: start,
                    sleeps: Vec::new(),
                }),
            }
        }

        pub fn advance(&self, duration: Duration) {
            self.state.lock().unwrap().now += duration;
        }

        pub fn elapsed(&self) -> Duration {
            self.state.lock().unwrap().now - self.start
        }

        pub fn sleeps(&self) -> Vec<Duration> {
            self.state.lock().unwrap().sleeps.clone()
        }

        pub fn total_slept(&self) -> Duration {
            self.sleeps().iter().sum()
        }
    }

    #[async_trait]
    impl Clock for ManualClock {
        fn now(&self) -> Instant {
            self.state.lock().unwrap().now
        }

        async fn sleep(&self, duration: Duration) {
            let mut state = self.state.lock().unwrap();
            state.now += duration;
            state.sleeps.push(duration);
        }
    }
}
