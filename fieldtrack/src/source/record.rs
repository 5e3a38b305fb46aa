//! Raw location row shape.

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::geo::GeoPoint;

/// One raw location row as returned by a backend source.
///
/// This is our own type, decoupled from any particular backend schema.
/// Numeric fields are assumed already validated by the persistence layer;
/// distance from the search center is *not* part of the row - it is computed
/// by the fetcher against the search parameters current at completion time.
#[derive(Debug, Clone, Deserialize)]
pub struct LocationRecord {
    /// Stable responder identity; deduplication key.
    pub responder_id: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Reported GPS accuracy in meters, if the device sent one.
    pub accuracy: Option<f64>,
    /// Reported ground speed in meters per second, if the device sent one.
    pub speed_mps: Option<f64>,
    /// When the position was observed. Latest wins on duplicate responder ids.
    pub observed_at: DateTime<Utc>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
}

impl LocationRecord {
    /// The row's coordinate as a [`GeoPoint`].
    pub fn position(&self) -> GeoPoint {
        GeoPoint::new(self.latitude, self.longitude)
    }
}
