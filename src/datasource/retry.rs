//! Bounded fixed-delay retry policy for upstream calls.

use backoff::backoff::Backoff;
use std::time::Duration;

/// Total attempts (first try included) before a transient failure is
/// escalated to a fatal error.
pub const MAX_ATTEMPTS: u32 = 15;

/// Cool-off between attempts, sized to respect upstream rate limits.
pub const RETRY_DELAY: Duration = Duration::from_secs(5);

/// A `backoff` policy that retries a fixed number of times with a constant
/// delay and no jitter. Upstream rate limiters respond better to a steady
/// cool-off than to exponential bursts.
#[derive(Debug, Clone)]
pub struct FixedDelayPolicy {
    delay: Duration,
    max_attempts: u32,
    attempts_used: u32,
}

impl FixedDelayPolicy {
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts,
            attempts_used: 1,
        }
    }
}

impl Default for FixedDelayPolicy {
    fn default() -> Self {
        Self::new(RETRY_DELAY, MAX_ATTEMPTS)
    }
}

impl Backoff for FixedDelayPolicy {
    fn next_backoff(&mut self) -> Option<Duration> {
        if self.attempts_used >= self.max_attempts {
            return None;
        }
        self.attempts_used += 1;
        Some(self.delay)
    }

    fn reset(&mut self) {
        self.attempts_used = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grants_max_attempts_minus_one_retries() {
        let mut policy = FixedDelayPolicy::new(Duration::from_millis(10), 3);
        assert_eq!(policy.next_backoff(), Some(Duration::from_millis(10)));
        assert_eq!(policy.next_backoff(), Some(Duration::from_millis(10)));
        assert_eq!(policy.next_backoff(), None);
    }

    #[test]
    fn test_reset_restores_budget() {
        let mut policy = FixedDelayPolicy::new(Duration::from_millis(10), 2);
        assert!(policy.next_backoff().is_some());
        assert!(policy.next_backoff().is_none());
        policy.reset();
        assert!(policy.next_backoff().is_some());
    }

    #[test]
    fn test_default_policy_constants() {
        let mut policy = FixedDelayPolicy::default();
        let mut retries = 0;
        while let Some(delay) = policy.next_backoff() {
            assert_eq!(delay, RETRY_DELAY);
            retries += 1;
        }
        assert_eq!(retries, MAX_ATTEMPTS - 1);
    }
}
