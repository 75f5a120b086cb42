//! Backoff strategies applied between retried attempts.
//!
//! How many attempts a call gets is decided by the client's retry count;
//! a [`Backoff`] only decides how long to wait before the next one.

use rand::Rng;
use std::time::Duration;

/// Delay used by [`Backoff::default`].
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);

/// Defines how long to wait before retrying a transiently failed attempt.
///
/// # Examples
///
/// ```
/// use blnk_http::Backoff;
/// use std::time::Duration;
///
/// // Flat wait: 2s, 2s, 2s...
/// let fixed = Backoff::Fixed { delay: Duration::from_secs(2) };
///
/// // Exponential backoff: 100ms, 200ms, 400ms... capped at 5s
/// let exponential = Backoff::Exponential {
///     initial_delay: Duration::from_millis(100),
///     max_delay: Duration::from_secs(5),
///     jitter: true,
/// };
///
/// assert_eq!(fixed.delay_for_attempt(3), Duration::from_secs(2));
/// assert!(exponential.delay_for_attempt(1) <= Duration::from_millis(100));
/// ```
#[derive(Debug, Clone)]
pub enum Backoff {
    /// Retry immediately.
    None,

    /// Wait the same delay before every retry.
    Fixed {
        /// The delay between attempts.
        delay: Duration,
    },

    /// Wait `initial_delay * 2^(attempt - 1)`, capped at `max_delay`.
    ///
    /// With `jitter` set, the delay is scaled by a random factor between
    /// 50% and 100%.
    Exponential {
        /// The delay after the first failed attempt.
        initial_delay: Duration,
        /// The maximum delay between attempts.
        max_delay: Duration,
        /// Whether to add random jitter to delays.
        jitter: bool,
    },

    /// Custom backoff logic.
    Custom {
        /// Takes the number of the attempt that just failed (1-indexed) and
        /// returns the delay before the next one.
        delay_fn: fn(attempt: usize) -> Duration,
    },
}

impl Default for Backoff {
    fn default() -> Self {
        Backoff::Fixed {
            delay: DEFAULT_RETRY_DELAY,
        }
    }
}

impl Backoff {
    /// Returns the delay to wait after `attempt` (1-indexed) failed and
    /// before the next attempt starts.
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        match self {
            Backoff::None => Duration::ZERO,
            Backoff::Fixed { delay } => *delay,
            Backoff::Exponential {
                initial_delay,
                max_delay,
                jitter,
            } => {
                let exponent = attempt.saturating_sub(1).min(u32::MAX as usize) as u32;
                let multiplier = 2u32.saturating_pow(exponent);
                let delay = initial_delay.saturating_mul(multiplier).min(*max_delay);

                if *jitter {
                    let jitter_factor = rand::thread_rng().gen_range(0.5..=1.0);
                    delay.mul_f64(jitter_factor)
                } else {
                    delay
                }
            }
            Backoff::Custom { delay_fn } => delay_fn(attempt),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_fixed_two_seconds() {
        let backoff = Backoff::default();
        assert_eq!(backoff.delay_for_attempt(1), Duration::from_secs(2));
        assert_eq!(backoff.delay_for_attempt(7), Duration::from_secs(2));
    }

    #[test]
    fn test_exponential_delays() {
        let backoff = Backoff::Exponential {
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(1),
            jitter: false,
        };

        assert_eq!(backoff.delay_for_attempt(1), Duration::from_millis(100));
        assert_eq!(backoff.delay_for_attempt(2), Duration::from_millis(200));
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(400));
        assert_eq!(backoff.delay_for_attempt(4), Duration::from_millis(800));
        assert_eq!(backoff.delay_for_attempt(5), Duration::from_secs(1));
        assert_eq!(backoff.delay_for_attempt(64), Duration::from_secs(1));
    }

    #[test]
    fn test_exponential_jitter_stays_in_range() {
        let backoff = Backoff::Exponential {
            initial_delay: Duration::from_millis(400),
            max_delay: Duration::from_secs(10),
            jitter: true,
        };

        for _ in 0..50 {
            let delay = backoff.delay_for_attempt(1);
            assert!(delay >= Duration::from_millis(200));
            assert!(delay <= Duration::from_millis(400));
        }
    }

    #[test]
    fn test_custom_delays() {
        fn by_attempt(attempt: usize) -> Duration {
            Duration::from_millis(attempt as u64 * 10)
        }

        let backoff = Backoff::Custom {
            delay_fn: by_attempt,
        };
        assert_eq!(backoff.delay_for_attempt(3), Duration::from_millis(30));
    }

    #[test]
    fn test_no_backoff() {
        assert_eq!(Backoff::None.delay_for_attempt(1), Duration::ZERO);
    }
}
