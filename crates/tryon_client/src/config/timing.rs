//! Timing configuration for prediction polling

use lazy_static::lazy_static;
use std::env;
use std::time::Duration;

/// Polling timing for asynchronous predictions
#[derive(Debug, Clone)]
pub struct PollingTimingConfig {
    /// Seconds between status polls while a prediction runs
    pub poll_interval: f64,
    /// Optional deadline in seconds for a single submission to reach a terminal state
    pub completion_timeout: Option<f64>,
}

impl Default for PollingTimingConfig {
    fn default() -> Self {
        Self {
            poll_interval: env::var("TRYON_POLL_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &f64| *v > 0.0)
                .unwrap_or(0.5),
            completion_timeout: env::var("TRYON_COMPLETION_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|v: &f64| *v > 0.0),
        }
    }
}

impl PollingTimingConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs_f64(self.poll_interval)
    }

    pub fn completion_timeout(&self) -> Option<Duration> {
        self.completion_timeout.map(Duration::from_secs_f64)
    }
}

lazy_static! {
    /// Global timing configuration instance
    pub static ref TIMING_CONFIG: PollingTimingConfig = PollingTimingConfig::default();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_durations() {
        let config = PollingTimingConfig {
            poll_interval: 0.25,
            completion_timeout: Some(90.0),
        };
        assert_eq!(config.poll_interval(), Duration::from_millis(250));
        assert_eq!(config.completion_timeout(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn test_no_deadline() {
        let config = PollingTimingConfig {
            poll_interval: 1.0,
            completion_timeout: None,
        };
        assert!(config.completion_timeout().is_none());
    }
}
