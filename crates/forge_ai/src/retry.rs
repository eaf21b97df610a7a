use std::time::Duration;

use forge_core::{ForgeConfig, MAX_RETRY_DELAY_SECS};

/// Bounded exponential backoff without jitter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first. Always at least 1.
    pub max_attempts: u32,
    /// Delay after failed attempt `n` (1-based) is `backoff_base^n` seconds.
    pub backoff_base: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff_base: f64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff_base,
        }
    }

    pub fn from_config(config: &ForgeConfig) -> Self {
        Self::new(config.max_attempts, config.backoff_base)
    }

    /// Delay to wait after failed attempt `attempt`, or `None` when that
    /// attempt was the last one. Never longer than [`MAX_RETRY_DELAY_SECS`].
    pub fn delay_after(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let secs = self.backoff_base.powi(exponent).min(MAX_RETRY_DELAY_SECS);
        Some(Duration::try_from_secs_f64(secs).unwrap_or(Duration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_grow_exponentially() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Some(Duration::from_secs(2)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_secs(4)));
        assert_eq!(policy.delay_after(3), None);
    }

    #[test]
    fn single_attempt_never_waits() {
        let policy = RetryPolicy::new(1, 2.0);
        assert_eq!(policy.delay_after(1), None);
    }

    #[test]
    fn zero_attempts_is_clamped() {
        assert_eq!(RetryPolicy::new(0, 2.0).max_attempts, 1);
    }

    #[test]
    fn fractional_base() {
        let policy = RetryPolicy::new(4, 0.5);
        assert_eq!(policy.delay_after(1), Some(Duration::from_millis(500)));
        assert_eq!(policy.delay_after(2), Some(Duration::from_millis(250)));
    }

    #[test]
    fn oversized_delay_is_capped() {
        let policy = RetryPolicy::new(3, 1e300);
        let cap = Duration::from_secs_f64(MAX_RETRY_DELAY_SECS);
        assert_eq!(policy.delay_after(1), Some(cap));
        assert_eq!(policy.delay_after(2), Some(cap));
    }

    #[test]
    fn built_from_config() {
        let config = ForgeConfig {
            max_attempts: 5,
            backoff_base: 1.5,
            ..ForgeConfig::default()
        };
        let policy = RetryPolicy::from_config(&config);
        assert_eq!(policy.max_attempts, 5);
        assert!((policy.backoff_base - 1.5).abs() < f64::EPSILON);
    }
}
