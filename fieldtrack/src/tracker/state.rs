//! Core state types for the responder tracker.
//!
//! - [`ResponderLocation`] - one ranked entry in the published set
//! - [`ConnectionState`] - health of the single change subscription
//! - [`TrackerSnapshot`] - the facade's published view, replaced wholesale
//! - [`SearchParams`] / [`ParamCell`] - caller-supplied parameters, always
//!   read live so late-resolving work never acts on stale values

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};

use crate::geo::GeoPoint;
use crate::source::LocationRecord;

/// One active responder position, ranked by distance from the search center.
///
/// `distance_km` is recomputed against the center current at fetch completion
/// time; it is never cached across a center change.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponderLocation {
    pub responder_id: String,
    pub latitude: f64,
    pub longitude: f64,
    pub accuracy: Option<f64>,
    pub speed_mps: Option<f64>,
    pub observed_at: DateTime<Utc>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    /// Great-circle distance from the current search center.
    pub distance_km: f64,
}

impl ResponderLocation {
    /// Build an entry from a raw row and its computed distance.
    pub fn from_record(record: LocationRecord, distance_km: f64) -> Self {
        Self {
            responder_id: record.responder_id,
            latitude: record.latitude,
            longitude: record.longitude,
            accuracy: record.accuracy,
            speed_mps: record.speed_mps,
            observed_at: record.observed_at,
            first_name: record.first_name,
            last_name: record.last_name,
            phone: record.phone,
            distance_km,
        }
    }

    /// The entry's coordinate as a [`GeoPoint`].
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}

/// Health of the single logical change subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// Opening the subscription.
    #[default]
    Connecting,
    /// Subscription established; change ticks are flowing.
    Connected,
    /// Subscription failed; a retry is scheduled within the budget.
    Reconnecting,
    /// No subscription: disabled, explicitly closed, or retry budget spent.
    Disconnected,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connecting => write!(f, "connecting"),
            Self::Connected => write!(f, "connected"),
            Self::Reconnecting => write!(f, "reconnecting"),
            Self::Disconnected => write!(f, "disconnected"),
        }
    }
}

/// The facade's published view.
///
/// Replaced wholesale on every successful fetch so each rendered snapshot is
/// internally consistent; consumers never see a half-patched set.
#[derive(Debug, Clone, Default)]
pub struct TrackerSnapshot {
    /// Active responders, sorted ascending by `distance_km`.
    pub responders: Vec<ResponderLocation>,
    /// True while the change subscription is established.
    pub is_connected: bool,
    /// True while a fetch is outstanding.
    pub is_loading: bool,
    /// Terminal transport error or hard fetch error; `None` on soft
    /// degradation.
    pub error: Option<String>,
    pub connection_status: ConnectionState,
}

impl TrackerSnapshot {
    /// Initial snapshot published before the supervisor processes anything.
    pub fn initial(enabled: bool) -> Self {
        Self {
            connection_status: if enabled {
                ConnectionState::Connecting
            } else {
                ConnectionState::Disconnected
            },
            ..Self::default()
        }
    }
}

/// Caller-supplied search parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParams {
    /// Search center of the console's map view.
    pub center: GeoPoint,
    /// Radius cut applied for non-elevated callers, in kilometers.
    pub radius_km: f64,
    /// Master switch; disabling tears down the subscription and clears state.
    pub enabled: bool,
}

/// Shared holder for the live [`SearchParams`].
///
/// Updated by a plain method call on every parameter change and read at
/// resolution time by any asynchronously completing work, never captured in a
/// closure at setup time. This is what keeps a change notification that lands
/// after a map pan using the new center rather than the one in effect when
/// the subscription was opened.
#[derive(Debug, Clone)]
pub struct ParamCell {
    inner: Arc<RwLock<SearchParams>>,
}

impl ParamCell {
    pub fn new(params: SearchParams) -> Self {
        Self {
            inner: Arc::new(RwLock::new(params)),
        }
    }

    /// The parameters in effect right now.
    pub fn get(&self) -> SearchParams {
        *self.inner.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the live parameters.
    pub fn set(&self, params: SearchParams) {
        *self.inner.write().unwrap_or_else(|e| e.into_inner()) = params;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn record(id: &str, lat: f64, lon: f64) -> LocationRecord {
        serde_json::from_value(serde_json::json!({
            "responder_id": id,
            "latitude": lat,
            "longitude": lon,
            "accuracy": 12.0,
            "speed_mps": null,
            "observed_at": "2026-08-30T09:15:00Z",
            "first_name": "Ana",
            "last_name": null,
            "phone": null
        }))
        .unwrap()
    }

    #[test]
    fn test_from_record_carries_fields_and_distance() {
        let loc = ResponderLocation::from_record(record("r-1", 10.3, 122.9), 4.25);
        assert_eq!(loc.responder_id, "r-1");
        assert_eq!(loc.accuracy, Some(12.0));
        assert_eq!(loc.first_name.as_deref(), Some("Ana"));
        assert_eq!(loc.distance_km, 4.25);
        assert_eq!(
            loc.observed_at,
            Utc.with_ymd_and_hms(2026, 8, 30, 9, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_connection_state_display() {
        assert_eq!(ConnectionState::Connecting.to_string(), "connecting");
        assert_eq!(ConnectionState::Connected.to_string(), "connected");
        assert_eq!(ConnectionState::Reconnecting.to_string(), "reconnecting");
        assert_eq!(ConnectionState::Disconnected.to_string(), "disconnected");
    }

    #[test]
    fn test_initial_snapshot_tracks_enabled_flag() {
        let on = TrackerSnapshot::initial(true);
        assert_eq!(on.connection_status, ConnectionState::Connecting);
        assert!(on.responders.is_empty());
        assert!(!on.is_connected);

        let off = TrackerSnapshot::initial(false);
        assert_eq!(off.connection_status, ConnectionState::Disconnected);
    }

    #[test]
    fn test_param_cell_reads_latest_value() {
        let cell = ParamCell::new(SearchParams {
            center: GeoPoint::new(10.0, 122.0),
            radius_km: 10.0,
            enabled: true,
        });
        let clone = cell.clone();

        clone.set(SearchParams {
            center: GeoPoint::new(11.0, 123.0),
            radius_km: 25.0,
            enabled: true,
        });

        // Reads through any clone observe the update
        let seen = cell.get();
        assert_eq!(seen.radius_km, 25.0);
        assert_eq!(seen.center, GeoPoint::new(11.0, 123.0));
    }
}
