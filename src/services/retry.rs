//! Retry policy
//!
//! Exponential backoff with symmetric jitter, bounded by attempt count and a
//! delay ceiling

use rand::Rng;
use std::time::{Duration, Instant};

use crate::config::settings::RetrySettings;
use crate::utils::error::ApiError;

/// Largest exponent used when doubling; the ceiling applies long before this
const MAX_EXPONENT: u32 = 62;

/// Retry configuration
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Retries beyond the first attempt; 0 disables retrying
    pub max_attempts: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Delay ceiling
    pub max_delay: Duration,
    /// Fraction of the raw delay used as the jitter amplitude
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(10),
            jitter_ratio: 0.3,
        }
    }
}

impl From<&RetrySettings> for RetryPolicy {
    fn from(settings: &RetrySettings) -> Self {
        Self {
            max_attempts: settings.max_retries,
            initial_delay: Duration::from_millis(settings.initial_delay_ms),
            max_delay: Duration::from_millis(settings.max_delay_ms),
            jitter_ratio: settings.jitter_ratio.clamp(0.0, 1.0),
        }
    }
}

/// Decision on whether to retry a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the request after the specified delay
    Retry { delay: Duration },
    /// Do not retry the request
    NoRetry,
}

impl RetryPolicy {
    /// Policy that never retries
    pub fn disabled() -> Self {
        Self {
            max_attempts: 0,
            ..Self::default()
        }
    }

    /// Delay for a retry given a jitter sample in `[-1, 1]`
    ///
    /// Never exceeds `max_delay`. A non-finite jitter ratio or sample counts
    /// as no jitter.
    pub fn delay_for(&self, attempt_index: u32, jitter_sample: f64) -> Duration {
        let exponent = attempt_index.min(MAX_EXPONENT) as i32;
        let raw = self.initial_delay.as_secs_f64() * 2f64.powi(exponent);
        let ratio = finite_or_zero(self.jitter_ratio);
        let sample = finite_or_zero(jitter_sample).clamp(-1.0, 1.0);
        let delay = (raw + raw * ratio * sample).clamp(0.0, self.max_delay.as_secs_f64());
        Duration::try_from_secs_f64(delay)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }

    /// Delay before retry number `attempt_index` (0 for the first retry),
    /// or `None` once the retry budget is spent
    pub fn next_delay(&self, attempt_index: u32) -> Option<Duration> {
        if attempt_index >= self.max_attempts {
            return None;
        }
        let sample = if finite_or_zero(self.jitter_ratio) > 0.0 {
            rand::thread_rng().gen_range(-1.0..=1.0)
        } else {
            0.0
        };
        Some(self.delay_for(attempt_index, sample))
    }

    /// Decide whether a classified failure should be retried
    pub fn decide(&self, attempt_index: u32, error: &ApiError) -> RetryDecision {
        if !error.retryable() {
            return RetryDecision::NoRetry;
        }
        match self.next_delay(attempt_index) {
            Some(delay) => RetryDecision::Retry { delay },
            None => RetryDecision::NoRetry,
        }
    }
}

fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

/// One dispatch within a call's retry loop
#[derive(Debug, Clone, Copy)]
pub struct Attempt {
    /// 0 for the initial try
    pub index: u32,
    pub started_at: Instant,
}

impl Attempt {
    pub fn start(index: u32) -> Self {
        Self {
            index,
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }
}
