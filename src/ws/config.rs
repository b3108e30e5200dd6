#![expect(
    clippy::module_name_repetitions,
    reason = "Configuration types intentionally mirror the module name for clarity"
)]

use std::time::Duration;

use bon::Builder;

use super::retry::CappedBackoff;

const DEFAULT_HEARTBEAT_INTERVAL_DURATION: Duration = Duration::from_secs(15);
const DEFAULT_HEARTBEAT_TIMEOUT_DURATION: Duration = Duration::from_secs(10);
const DEFAULT_CONNECT_TIMEOUT_DURATION: Duration = Duration::from_secs(10);
const DEFAULT_CLOSE_TIMEOUT_DURATION: Duration = Duration::from_secs(1);
const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 10;
const DEFAULT_INITIAL_BACKOFF_DURATION: Duration = Duration::from_millis(2000);
const DEFAULT_MAX_BACKOFF_DURATION: Duration = Duration::from_secs(30);
const DEFAULT_BACKOFF_MULTIPLIER: f64 = 1.5;
const DEFAULT_MAX_EXPONENT: u32 = 10;

/// Configuration for WebSocket client behavior.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct Config {
    /// Interval for sending `{"command":"ping"}` probes while open.
    /// [`Duration::ZERO`] disables the heartbeat.
    #[builder(default = DEFAULT_HEARTBEAT_INTERVAL_DURATION)]
    pub heartbeat_interval: Duration,
    /// Maximum time to wait for a `pong`/`heartbeat` before considering the connection dead
    #[builder(default = DEFAULT_HEARTBEAT_TIMEOUT_DURATION)]
    pub heartbeat_timeout: Duration,
    /// Maximum time to wait for the opening handshake
    #[builder(default = DEFAULT_CONNECT_TIMEOUT_DURATION)]
    pub connect_timeout: Duration,
    /// How long `disconnect()` waits for the close frame to be flushed
    #[builder(default = DEFAULT_CLOSE_TIMEOUT_DURATION)]
    pub close_timeout: Duration,
    /// Reconnection strategy configuration
    #[builder(default)]
    pub reconnect: ReconnectConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL_DURATION,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT_DURATION,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT_DURATION,
            close_timeout: DEFAULT_CLOSE_TIMEOUT_DURATION,
            reconnect: ReconnectConfig::default(),
        }
    }
}

/// Configuration for automatic reconnection behavior.
///
/// The delay before attempt `n` is
/// `min(initial_backoff * backoff_multiplier^min(max_exponent, n - 1), max_backoff)`.
#[non_exhaustive]
#[derive(Debug, Clone, Builder)]
pub struct ReconnectConfig {
    /// Maximum number of reconnection attempts before giving up
    #[builder(default = DEFAULT_MAX_RECONNECT_ATTEMPTS)]
    pub max_attempts: u32,
    /// Backoff duration for the first reconnection attempt
    #[builder(default = DEFAULT_INITIAL_BACKOFF_DURATION)]
    pub initial_backoff: Duration,
    /// Maximum backoff duration
    #[builder(default = DEFAULT_MAX_BACKOFF_DURATION)]
    pub max_backoff: Duration,
    /// Multiplier for exponential backoff
    #[builder(default = DEFAULT_BACKOFF_MULTIPLIER)]
    pub backoff_multiplier: f64,
    /// Largest exponent the multiplier is raised to
    #[builder(default = DEFAULT_MAX_EXPONENT)]
    pub max_exponent: u32,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RECONNECT_ATTEMPTS,
            initial_backoff: DEFAULT_INITIAL_BACKOFF_DURATION,
            max_backoff: DEFAULT_MAX_BACKOFF_DURATION,
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_exponent: DEFAULT_MAX_EXPONENT,
        }
    }
}

impl From<ReconnectConfig> for CappedBackoff {
    fn from(config: ReconnectConfig) -> Self {
        CappedBackoff::new(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_constants() {
        let config = Config::default();

        assert_eq!(config.heartbeat_interval, Duration::from_secs(15));
        assert_eq!(config.heartbeat_timeout, Duration::from_secs(10));
        assert_eq!(config.reconnect.max_attempts, 10);
        assert_eq!(config.reconnect.initial_backoff, Duration::from_millis(2000));
        assert_eq!(config.reconnect.max_backoff, Duration::from_secs(30));
        assert_eq!(config.reconnect.max_exponent, 10);
    }

    #[test]
    fn builder_fills_unset_fields_with_defaults() {
        let config = Config::builder()
            .heartbeat_interval(Duration::from_millis(50))
            .reconnect(ReconnectConfig::builder().max_attempts(3).build())
            .build();

        assert_eq!(config.heartbeat_interval, Duration::from_millis(50));
        assert_eq!(config.heartbeat_timeout, Duration::from_secs(10));
        assert_eq!(config.reconnect.max_attempts, 3);
        assert_eq!(config.reconnect.initial_backoff, Duration::from_millis(2000));
    }
}
