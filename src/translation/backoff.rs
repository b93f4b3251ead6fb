/*!
 * Backoff policy for rate-limited single-item requests.
 */

use rand::Rng;
use std::time::Duration;

use crate::app_config::RateLimitConfig;

/// How long to wait between rate-limited attempts and when to give up
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    initial_delay: Duration,
    multiplier: f64,
    max_delay: Duration,
    max_attempts: Option<u32>,
    jitter: Duration,
}

impl RetryPolicy {
    /// Same delay before every retry, retrying forever
    pub fn fixed(delay: Duration) -> Self {
        Self {
            initial_delay: delay,
            multiplier: 1.0,
            max_delay: delay,
            max_attempts: None,
            jitter: Duration::ZERO,
        }
    }

    /// Delay doubling (or scaling by `multiplier`) on each retry, capped at `max_delay`
    pub fn exponential(initial_delay: Duration, multiplier: f64, max_delay: Duration) -> Self {
        Self {
            initial_delay,
            multiplier: multiplier.max(1.0),
            max_delay: max_delay.max(initial_delay),
            max_attempts: None,
            jitter: Duration::ZERO,
        }
    }

    /// Bound the total number of attempts, the first one included
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Add up to `jitter` of random delay to each wait
    pub fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    /// Whether another attempt is allowed after `attempts_made` failed ones
    pub fn allows_another(&self, attempts_made: u32) -> bool {
        match self.max_attempts {
            Some(max) => attempts_made < max,
            None => true,
        }
    }

    /// Base delay before retry number `retry` (0 for the first retry), without jitter
    pub fn base_delay(&self, retry: u32) -> Duration {
        let factor = self.multiplier.powi(retry.min(i32::MAX as u32) as i32);
        let secs = self.initial_delay.as_secs_f64() * factor;
        if !secs.is_finite() || secs >= self.max_delay.as_secs_f64() {
            return self.max_delay;
        }
        Duration::from_secs_f64(secs)
    }

    /// Delay before retry number `retry`, jitter included
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = self.base_delay(retry);
        let jitter_ms = self.jitter.as_millis() as u64;
        if jitter_ms == 0 {
            return base;
        }
        base + Duration::from_millis(rand::rng().random_range(0..=jitter_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(20))
    }
}

impl From<&RateLimitConfig> for RetryPolicy {
    fn from(config: &RateLimitConfig) -> Self {
        let mut policy = Self::exponential(
            Duration::from_secs(config.initial_delay_secs),
            config.multiplier,
            Duration::from_secs(config.max_delay_secs),
        )
        .with_jitter(Duration::from_millis(config.jitter_ms));
        if let Some(max_attempts) = config.max_attempts {
            policy = policy.with_max_attempts(max_attempts);
        }
        policy
    }
}
