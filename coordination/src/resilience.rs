//! Resilience — retry budget for the unreliable upstream call.
//!
//! ```text
//! attempt 1 ── fail (retriable) ── wait base ──────┐
//! attempt 2 ── fail (retriable) ── wait base * 2 ──┤
//! attempt 3 ── fail (retriable) ── wait base * 4 ──┤
//! attempt 4 ── fail ── surface last error          │
//!      └────── success at any attempt ── return ◄──┘
//! ```
//!
//! Non-retriable failures surface at once, with no delay.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Retries after the first attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Delay before the first retry; doubles for each retry after that.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(2000);

/// Exponential backoff policy without jitter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = `max_retries + 1`).
    pub max_retries: u32,
    /// Delay before the first retry.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_retries: u32, base_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn total_attempts(&self) -> u32 {
        self.max_retries.saturating_add(1)
    }

    /// Delay before retry number `retry` (0-based): `base * 2^retry`.
    pub fn delay_before_retry(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Whether another attempt is allowed after `attempt` (0-based) failed.
    pub fn allows_retry_after(&self, attempt: u32) -> bool {
        attempt < self.max_retries
    }

    /// Sum of every backoff delay the policy can impose.
    pub fn worst_case_delay(&self) -> Duration {
        (0..self.max_retries)
            .map(|retry| self.delay_before_retry(retry))
            .fold(Duration::ZERO, Duration::saturating_add)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_RETRIES, DEFAULT_BASE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.total_attempts(), 4);
        assert_eq!(policy.base_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_delays_double() {
        let policy = RetryPolicy::new(3, Duration::from_millis(100));
        assert_eq!(policy.delay_before_retry(0), Duration::from_millis(100));
        assert_eq!(policy.delay_before_retry(1), Duration::from_millis(200));
        assert_eq!(policy.delay_before_retry(2), Duration::from_millis(400));
    }

    #[test]
    fn test_allows_retry_after() {
        let policy = RetryPolicy::default();
        assert!(policy.allows_retry_after(0));
        assert!(policy.allows_retry_after(2));
        assert!(!policy.allows_retry_after(3));
        assert!(!RetryPolicy::none().allows_retry_after(0));
    }

    #[test]
    fn test_worst_case_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.worst_case_delay(), Duration::from_secs(2 + 4 + 8));
    }

    #[test]
    fn test_huge_retry_index_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert!(policy.delay_before_retry(64) >= policy.delay_before_retry(31));
    }
}
