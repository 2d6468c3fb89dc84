//! # Backoff policy for retrying tasks.
//!
//! [`BackoffPolicy`] controls how retry delays grow after repeated failures.
//! It is parameterized by:
//! - [`BackoffPolicy::base`] the initial delay;
//! - [`BackoffPolicy::factor`] the multiplicative growth factor;
//! - [`BackoffPolicy::cap`] the maximum delay.
//!
//! The delay before retry `n` (0-indexed) is `base × factor^n`, clamped to
//! `cap`, then jitter is applied. Because the base delay is derived purely
//! from the retry ordinal, jitter output never feeds back into subsequent
//! calculations — this prevents the negative feedback loop that causes
//! delays to shrink over time.
//!
//! # Example
//! ```rust
//! use std::time::Duration;
//! use taskpool::{BackoffPolicy, JitterPolicy};
//!
//! let backoff = BackoffPolicy {
//!     base: Duration::from_millis(100),
//!     cap: Duration::from_secs(10),
//!     factor: 2.0,
//!     jitter: JitterPolicy::None,
//! };
//!
//! // Retry 0 — uses `base` (100ms)
//! assert_eq!(backoff.next(0), Duration::from_millis(100));
//!
//! // Retry 1 — base × factor^1 = 200ms
//! assert_eq!(backoff.next(1), Duration::from_millis(200));
//!
//! // Retry 10 — 100ms × 2^10 = 102_400ms → capped at 10s
//! assert_eq!(backoff.next(10), Duration::from_secs(10));
//! ```

use std::time::Duration;

use crate::policies::jitter::JitterPolicy;

/// Retry backoff policy.
#[derive(Clone, Copy, Debug)]
pub struct BackoffPolicy {
    /// Delay before the first retry.
    pub base: Duration,
    /// Maximum delay for any retry.
    pub cap: Duration,
    /// Multiplicative growth factor (`>= 1.0` recommended).
    pub factor: f64,
    /// Jitter policy applied to the clamped delay.
    pub jitter: JitterPolicy,
}

impl Default for BackoffPolicy {
    /// Returns a policy with:
    /// - `base = 100ms`;
    /// - `cap = 30s`;
    /// - `factor = 2.0` (exponential);
    /// - no jitter.
    fn default() -> Self {
        Self {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(30),
            factor: 2.0,
            jitter: JitterPolicy::None,
        }
    }
}

impl BackoffPolicy {
    /// Computes the delay for the given retry ordinal (0-indexed).
    ///
    /// The base delay is `base × factor^attempt`, clamped to
    /// [`BackoffPolicy::cap`]. Jitter is applied to the clamped value; the
    /// jittered result is never fed back into subsequent calculations.
    ///
    /// # Notes
    /// - `factor == 1.0` keeps the delay constant at `base` (up to `cap`).
    /// - Non-finite or overflowing intermediates clamp to `cap`.
    pub fn next(&self, attempt: u32) -> Duration {
        let cap_secs = self.cap.as_secs_f64();
        let exp = attempt.min(i32::MAX as u32) as i32;
        let raw_secs = self.base.as_secs_f64() * self.factor.powi(exp);

        let clamped = if !raw_secs.is_finite() || raw_secs < 0.0 || raw_secs > cap_secs {
            self.cap
        } else {
            Duration::from_secs_f64(raw_secs)
        };

        self.jitter.apply(clamped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn policy(factor: f64, jitter: JitterPolicy) -> BackoffPolicy {
        BackoffPolicy {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(30),
            factor,
            jitter,
        }
    }

    #[test]
    fn test_attempt_zero_returns_base() {
        assert_eq!(
            policy(2.0, JitterPolicy::None).next(0),
            Duration::from_millis(100)
        );
    }

    #[test]
    fn test_exponential_growth_no_jitter() {
        let p = policy(2.0, JitterPolicy::None);
        assert_eq!(p.next(0), Duration::from_millis(100));
        assert_eq!(p.next(1), Duration::from_millis(200));
        assert_eq!(p.next(2), Duration::from_millis(400));
        assert_eq!(p.next(3), Duration::from_millis(800));
    }

    #[test]
    fn test_constant_factor() {
        let p = policy(1.0, JitterPolicy::None);
        for attempt in 0..10 {
            assert_eq!(
                p.next(attempt),
                Duration::from_millis(100),
                "attempt {} should stay at base",
                attempt
            );
        }
    }

    #[test]
    fn test_clamped_to_cap() {
        let p = BackoffPolicy {
            base: Duration::from_millis(100),
            cap: Duration::from_secs(1),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(p.next(10), Duration::from_secs(1));
    }

    #[test]
    fn test_base_exceeding_cap_clamps() {
        let p = BackoffPolicy {
            base: Duration::from_secs(10),
            cap: Duration::from_secs(5),
            factor: 2.0,
            jitter: JitterPolicy::None,
        };
        assert_eq!(p.next(0), Duration::from_secs(5));
    }

    #[test]
    fn test_full_jitter_bounded_by_base_delay() {
        let p = policy(2.0, JitterPolicy::Full);
        for attempt in 0..12 {
            let bound_ms = (100.0 * 2.0f64.powi(attempt as i32)).min(30_000.0);
            let delay = p.next(attempt);
            assert!(
                delay <= Duration::from_millis(bound_ms as u64),
                "attempt {}: delay {:?} exceeds bound {}ms",
                attempt,
                delay,
                bound_ms
            );
        }
    }

    #[test]
    fn test_equal_jitter_keeps_half() {
        let p = policy(2.0, JitterPolicy::Equal);
        for attempt in 0..12 {
            let bound_ms = (100.0 * 2.0f64.powi(attempt as i32)).min(30_000.0);
            let delay = p.next(attempt);
            assert!(
                delay >= Duration::from_millis((bound_ms / 2.0) as u64),
                "attempt {}: delay {:?} below half of {}ms",
                attempt,
                delay,
                bound_ms
            );
            assert!(delay <= Duration::from_millis(bound_ms as u64));
        }
    }

    #[test]
    fn test_huge_attempt_clamps_to_cap() {
        let p = policy(2.0, JitterPolicy::None);
        assert_eq!(p.next(u32::MAX), Duration::from_secs(30));
    }
}
