//! Tracker configuration.

use std::time::Duration;

use crate::geo::GeoPoint;

use super::state::SearchParams;

/// Default search radius for non-elevated callers.
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// Default retry budget for the change subscription.
pub const DEFAULT_RECONNECT_ATTEMPTS: u32 = 5;

/// Default fixed interval between reconnect attempts.
pub const DEFAULT_RECONNECT_INTERVAL: Duration = Duration::from_secs(3);

/// Default minimum interval between notification-triggered fetches.
pub const DEFAULT_FETCH_THROTTLE: Duration = Duration::from_secs(5);

/// Default debounce window for parameter changes.
pub const DEFAULT_PARAM_DEBOUNCE: Duration = Duration::from_secs(1);

/// Default client-side deadline for the restricted public source.
pub const DEFAULT_RESTRICTED_FETCH_TIMEOUT: Duration = Duration::from_secs(5);

/// Default change-feed topic.
pub const DEFAULT_TOPIC: &str = "responder-locations";

/// Configuration for a [`ResponderTracker`](super::ResponderTracker).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Initial search center.
    pub center: GeoPoint,
    /// Initial search radius in kilometers.
    pub radius_km: f64,
    /// Start enabled; when false the tracker idles until a parameter update
    /// enables it.
    pub enabled: bool,
    /// Consecutive transport failures tolerated before the connection is
    /// declared lost.
    pub reconnect_attempts: u32,
    /// Fixed interval between reconnect attempts (no backoff).
    pub reconnect_interval: Duration,
    /// Minimum interval between notification-triggered fetches.
    pub fetch_throttle: Duration,
    /// Trailing debounce window collapsing bursts of parameter changes.
    pub param_debounce: Duration,
    /// Client-side deadline for the restricted public source.
    pub restricted_fetch_timeout: Duration,
    /// Change-feed topic carrying location row changes.
    pub topic: String,
}

impl TrackerConfig {
    /// Configuration with production defaults for the given center.
    pub fn new(center: GeoPoint) -> Self {
        Self {
            center,
            radius_km: DEFAULT_RADIUS_KM,
            enabled: true,
            reconnect_attempts: DEFAULT_RECONNECT_ATTEMPTS,
            reconnect_interval: DEFAULT_RECONNECT_INTERVAL,
            fetch_throttle: DEFAULT_FETCH_THROTTLE,
            param_debounce: DEFAULT_PARAM_DEBOUNCE,
            restricted_fetch_timeout: DEFAULT_RESTRICTED_FETCH_TIMEOUT,
            topic: DEFAULT_TOPIC.to_string(),
        }
    }

    /// The initial [`SearchParams`] described by this configuration.
    pub fn initial_params(&self) -> SearchParams {
        SearchParams {
            center: self.center,
            radius_km: self.radius_km,
            enabled: self.enabled,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::new(GeoPoint::new(10.2465, 122.9735));
        assert_eq!(config.radius_km, 10.0);
        assert!(config.enabled);
        assert_eq!(config.reconnect_attempts, 5);
        assert_eq!(config.reconnect_interval, Duration::from_secs(3));
        assert_eq!(config.fetch_throttle, Duration::from_secs(5));
        assert_eq!(config.param_debounce, Duration::from_secs(1));
        assert_eq!(config.topic, "responder-locations");
    }

    #[test]
    fn test_initial_params_mirror_config() {
        let mut config = TrackerConfig::new(GeoPoint::new(10.2465, 122.9735));
        config.enabled = false;
        config.radius_km = 25.0;

        let params = config.initial_params();
        assert_eq!(params.radius_km, 25.0);
        assert!(!params.enabled);
        assert_eq!(params.center, config.center);
    }
}
