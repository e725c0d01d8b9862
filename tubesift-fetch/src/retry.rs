//! Retry policy for transient provider failures.

use rand::Rng;
use std::time::Duration;

/// Capped exponential backoff with jitter.
///
/// Only transient failures are retried; rate limits and permanent failures
/// bypass this policy entirely. Jitter spreads concurrent workers out so
/// retries do not stampede the same provider.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Maximum number of attempts (first try included).
    pub max_attempts: u32,
    /// Base delay before the first retry, in milliseconds.
    pub base_delay_ms: u64,
    /// Cap on any single delay, in milliseconds.
    pub max_delay_ms: u64,
    /// Jitter fraction applied to each delay (0.0 disables jitter).
    pub jitter: f64,
}

impl RetryPolicy {
    /// Creates a policy with the given attempt budget.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay_ms: 500,
            max_delay_ms: 30_000,
            jitter: 0.25,
        }
    }

    /// Disables retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            base_delay_ms: 0,
            max_delay_ms: 0,
            jitter: 0.0,
        }
    }

    /// Sets the base delay.
    pub fn with_base_delay(mut self, ms: u64) -> Self {
        self.base_delay_ms = ms;
        self
    }

    /// Returns true when another attempt is allowed after `attempt`
    /// attempts have already been made.
    pub fn allows_retry(&self, attempt: u32) -> bool {
        attempt < self.max_attempts
    }

    /// Delay before retry number `attempt` (1-based), doubling per attempt
    /// and capped, with jitter applied.
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exp = self
            .base_delay_ms
            .saturating_mul(2u64.saturating_pow(attempt.saturating_sub(1)));
        let capped = exp.min(self.max_delay_ms);

        if self.jitter <= 0.0 || capped == 0 {
            return Duration::from_millis(capped);
        }

        let spread = (capped as f64 * self.jitter) as u64;
        let jittered = if spread == 0 {
            capped
        } else {
            let offset = rand::thread_rng().gen_range(0..=spread * 2);
            capped.saturating_sub(spread).saturating_add(offset)
        };
        Duration::from_millis(jittered.min(self.max_delay_ms))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exponential_growth_without_jitter() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        };

        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(1000));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(2000));
    }

    #[test]
    fn test_delay_is_capped() {
        let policy = RetryPolicy {
            jitter: 0.0,
            ..RetryPolicy::default()
        };
        assert_eq!(policy.delay_for_attempt(30), Duration::from_millis(30_000));
    }

    #[test]
    fn test_jitter_stays_within_band() {
        let policy = RetryPolicy::default();
        for _ in 0..50 {
            let d = policy.delay_for_attempt(2).as_millis() as u64;
            // 1000ms +/- 25%
            assert!((750..=1250).contains(&d), "delay {d} out of band");
        }
    }

    #[test]
    fn test_attempt_budget() {
        let policy = RetryPolicy::new(3);
        assert!(policy.allows_retry(1));
        assert!(policy.allows_retry(2));
        assert!(!policy.allows_retry(3));

        assert!(!RetryPolicy::no_retry().allows_retry(1));
    }
}
