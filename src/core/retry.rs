//! Bounded retry policy for non-blocking lock acquisition
//!
//! The polling strategy never blocks while it holds a guard. Instead it drops
//! what it holds and tries again. Unbounded polling can livelock under
//! contention, so every polling loop runs under a [`Backoff`] that caps the
//! attempt count and, optionally, the wall-clock time, and reports
//! exhaustion as [`LedgerError::LockTimeout`].

use crate::types::LedgerError;
use rand::Rng;
use std::time::{Duration, Instant};

/// Limits and pacing of a polling loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Failed attempts allowed before giving up
    pub max_attempts: u32,
    /// Wall-clock budget for one operation, if any
    pub deadline: Option<Duration>,
    /// Attempts that only busy-spin before the policy starts sleeping
    pub spin_limit: u32,
    /// Upper bound of a single randomized sleep
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10_000,
            deadline: Some(Duration::from_secs(5)),
            spin_limit: 16,
            max_backoff: Duration::from_millis(1),
        }
    }
}

impl RetryPolicy {
    /// Create a policy with custom limits
    ///
    /// A zero attempt budget or a zero deadline would fail every contended
    /// operation immediately; both fall back to the defaults with a warning.
    pub fn new(max_attempts: u32, deadline: Option<Duration>) -> Self {
        let default = Self::default();

        let max_attempts = if max_attempts == 0 {
            tracing::warn!(
                max_attempts,
                default = default.max_attempts,
                "invalid max_attempts, using default"
            );
            default.max_attempts
        } else {
            max_attempts
        };

        let deadline = match deadline {
            Some(deadline) if deadline.is_zero() => {
                tracing::warn!(default = ?default.deadline, "invalid zero deadline, using default");
                default.deadline
            }
            other => other,
        };

        Self {
            max_attempts,
            deadline,
            ..default
        }
    }
}

/// Attempt counter and pacing state of one polling operation
#[derive(Debug)]
pub struct Backoff {
    policy: RetryPolicy,
    attempts: u32,
    started: Instant,
}

impl Backoff {
    /// Start a fresh budget for one operation
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            attempts: 0,
            started: Instant::now(),
        }
    }

    /// Failed attempts recorded so far
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Record a failed attempt and wait before the next one
    ///
    /// Callers must release every guard before calling this, except the
    /// accumulated guards of a snapshot which never wait on another holder.
    ///
    /// # Errors
    ///
    /// `LockTimeout` once the attempt budget or the deadline is exhausted.
    pub fn snooze(&mut self, operation: &str) -> Result<(), LedgerError> {
        self.attempts = self.attempts.saturating_add(1);

        let expired = self
            .policy
            .deadline
            .is_some_and(|deadline| self.started.elapsed() >= deadline);
        if self.attempts >= self.policy.max_attempts || expired {
            return Err(LedgerError::lock_timeout(operation, self.attempts));
        }

        if self.attempts <= self.policy.spin_limit {
            std::hint::spin_loop();
        } else {
            std::thread::sleep(self.jittered_delay());
        }
        Ok(())
    }

    // Exponential in the attempts past the spin phase, capped, with full jitter.
    fn jittered_delay(&self) -> Duration {
        let exponent = (self.attempts - self.policy.spin_limit).min(20);
        let ceiling = Duration::from_micros(1u64 << exponent).min(self.policy.max_backoff);
        let nanos = u64::try_from(ceiling.as_nanos()).unwrap_or(u64::MAX);
        Duration::from_nanos(rand::thread_rng().gen_range(0..=nanos))
    }
}
