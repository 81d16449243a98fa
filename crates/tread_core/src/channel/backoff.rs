//! Reconnect delay policy.

use std::time::Duration;

/// Delay strategy between failed connection attempts.
///
/// The default matches the historical client behavior: a fixed 5 second
/// wait on every retry. A multiplier above 1.0 turns this into capped
/// exponential backoff, optionally with jitter to avoid thundering-herd
/// reconnects.
#[derive(Debug, Clone)]
pub struct BackoffPolicy {
    initial: Duration,
    max: Duration,
    multiplier: f64,
    jitter: f64,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::fixed(Duration::from_secs(5))
    }
}

impl BackoffPolicy {
    /// Build a policy. `multiplier` is clamped to at least 1.0 and
    /// `jitter` to `[0.0, 1.0)`.
    pub fn new(initial: Duration, max: Duration, multiplier: f64, jitter: f64) -> Self {
        Self {
            initial,
            max: max.max(initial),
            multiplier: multiplier.max(1.0),
            jitter: jitter.clamp(0.0, 0.99),
        }
    }

    /// Same delay on every attempt.
    pub fn fixed(delay: Duration) -> Self {
        Self::new(delay, delay, 1.0, 0.0)
    }

    /// Doubling delay with a cap and 10% jitter.
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self::new(initial, max, 2.0, 0.1)
    }

    /// Delay before the given retry attempt (0-based).
    pub fn delay(&self, attempt: u32) -> Duration {
        let factor = self.multiplier.powi(attempt.min(32) as i32);
        let base = self.initial.as_secs_f64() * factor;
        let capped = base.min(self.max.as_secs_f64());

        let jittered = if self.jitter > 0.0 {
            capped * (1.0 - self.jitter * rand::random::<f64>())
        } else {
            capped
        };

        Duration::from_secs_f64(jittered)
    }
}
