// src/fetch/rate.rs
// =============================================================================
// Adaptive spacing between requests.
//
// The baseline interval comes from the profile's rate cap (60s / cap). On
// top of that the interval reacts to the server:
// - slow response  -> interval grows by a fixed step
// - fast response  -> interval shrinks by a smaller step, never below baseline
// - HTTP 429       -> interval is multiplied by a growth factor
//
// The interval is capped at max_interval (but never below baseline). State
// lives for one crawl and is never shared between API versions.
// =============================================================================

use std::time::{Duration, Instant};

use crate::config::RateSettings;

#[derive(Debug, Clone)]
pub struct RateState {
    baseline: Duration,
    current: Duration,
    last_dispatch: Option<Instant>,
    settings: RateSettings,
}

impl RateState {
    pub fn new(baseline: Duration, settings: RateSettings) -> Self {
        Self {
            baseline,
            current: baseline,
            last_dispatch: None,
            settings,
        }
    }

    pub fn current_interval(&self) -> Duration {
        self.current
    }

    // How long the caller must wait before dispatching at `now`.
    // Zero for the first dispatch of a run.
    pub fn wait_before_dispatch(&self, now: Instant) -> Duration {
        match self.last_dispatch {
            None => Duration::ZERO,
            Some(last) => self
                .current
                .saturating_sub(now.saturating_duration_since(last)),
        }
    }

    pub fn record_dispatch(&mut self, at: Instant) {
        self.last_dispatch = Some(at);
    }

    pub fn record_latency(&mut self, latency: Duration) {
        if latency > self.settings.slow_response() {
            self.current = (self.current + self.settings.slow_step()).min(self.ceiling());
        } else if self.current > self.baseline {
            self.current = self
                .current
                .saturating_sub(self.settings.fast_step())
                .max(self.baseline);
        }
    }

    pub fn record_rate_limited(&mut self) {
        self.current = self
            .current
            .mul_f64(self.settings.rate_limit_factor)
            .min(self.ceiling());
    }

    fn ceiling(&self) -> Duration {
        self.settings.max_interval().max(self.baseline)
    }
}
