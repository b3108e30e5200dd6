//! Deterministic, bounded exponential backoff for reconnection.

use std::time::Duration;

use backoff::backoff::Backoff;

use super::config::ReconnectConfig;

/// Exponential backoff with a ceiling on both the exponent and the delay,
/// and a hard limit on the number of attempts.
///
/// Unlike [`backoff::ExponentialBackoff`] there is no jitter: the delay before
/// attempt `n` is always
/// `min(initial_backoff * backoff_multiplier^min(max_exponent, n - 1), max_backoff)`,
/// and [`Backoff::next_backoff`] returns `None` once `max_attempts` delays
/// have been handed out.
#[derive(Debug, Clone)]
pub struct CappedBackoff {
    config: ReconnectConfig,
    attempts: u32,
}

impl CappedBackoff {
    #[must_use]
    pub const fn new(config: ReconnectConfig) -> Self {
        Self {
            config,
            attempts: 0,
        }
    }

    /// Number of attempts handed out since the last reset.
    #[must_use]
    pub const fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Whether every attempt in the budget has been used.
    #[must_use]
    pub const fn is_exhausted(&self) -> bool {
        self.attempts >= self.config.max_attempts
    }

    /// Delay before the given 1-based attempt.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "Backoff growth factor is fractional (1.5 by default)"
    )]
    pub fn delay_for(config: &ReconnectConfig, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(config.max_exponent);
        let exponent = i32::try_from(exponent).unwrap_or(i32::MAX);
        let secs = config.initial_backoff.as_secs_f64() * config.backoff_multiplier.powi(exponent);

        Duration::try_from_secs_f64(secs)
            .unwrap_or(config.max_backoff)
            .min(config.max_backoff)
    }
}

impl Backoff for CappedBackoff {
    fn reset(&mut self) {
        self.attempts = 0;
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        if self.is_exhausted() {
            return None;
        }

        self.attempts += 1;
        Some(Self::delay_for(&self.config, self.attempts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sequence_grows_by_half() {
        let mut backoff = CappedBackoff::new(ReconnectConfig::default());

        let delays: Vec<_> = (0..5).map(|_| backoff.next_backoff().unwrap()).collect();

        assert_eq!(
            delays,
            vec![
                Duration::from_millis(2000),
                Duration::from_millis(3000),
                Duration::from_millis(4500),
                Duration::from_millis(6750),
                Duration::from_micros(10_125_000),
            ]
        );
        assert_eq!(backoff.attempts(), 5);
    }

    #[test]
    fn delay_is_capped_at_max_backoff() {
        let config = ReconnectConfig::default();

        // 2s * 1.5^7 = 34.17s
        assert_eq!(CappedBackoff::delay_for(&config, 8), Duration::from_secs(30));
        assert_eq!(CappedBackoff::delay_for(&config, 10), Duration::from_secs(30));
    }

    #[test]
    fn exponent_is_capped() {
        let config = ReconnectConfig::builder()
            .initial_backoff(Duration::from_millis(1))
            .backoff_multiplier(2.0)
            .max_exponent(3)
            .max_backoff(Duration::from_secs(60))
            .max_attempts(100)
            .build();

        let delays: Vec<_> = (1..=6)
            .map(|n| CappedBackoff::delay_for(&config, n).as_millis())
            .collect();

        assert_eq!(delays, vec![1, 2, 4, 8, 8, 8]);
    }

    #[test]
    fn stops_after_max_attempts_until_reset() {
        let config = ReconnectConfig::builder()
            .max_attempts(2)
            .initial_backoff(Duration::from_millis(10))
            .build();
        let mut backoff = CappedBackoff::new(config);

        assert!(backoff.next_backoff().is_some());
        assert!(backoff.next_backoff().is_some());
        assert!(backoff.is_exhausted());
        assert_eq!(backoff.next_backoff(), None);
        assert_eq!(backoff.attempts(), 2);

        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_backoff(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn zero_budget_never_retries() {
        let config = ReconnectConfig::builder().max_attempts(0).build();
        let mut backoff = CappedBackoff::new(config);

        assert_eq!(backoff.next_backoff(), None);
    }
}
