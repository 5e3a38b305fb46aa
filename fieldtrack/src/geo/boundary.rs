//! Operating boundary geofence.
//!
//! An [`OperatingBoundary`] is the authorized operating region for a dispatch
//! deployment. Location rows outside it are dropped before they ever reach a
//! console, regardless of the caller's role or search radius.

use super::GeoPoint;

/// Axis-aligned lat/lon bounding box for the authorized operating region.
///
/// # Examples
///
/// ```
/// use fieldtrack::geo::{GeoPoint, OperatingBoundary};
///
/// let boundary = OperatingBoundary::new(9.0, 11.5, 121.5, 124.0);
/// assert!(boundary.contains(GeoPoint::new(10.2465, 122.9735)));
/// assert!(!boundary.contains(GeoPoint::new(14.5995, 120.9842)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OperatingBoundary {
    /// South edge in degrees.
    pub min_lat: f64,
    /// North edge in degrees.
    pub max_lat: f64,
    /// West edge in degrees.
    pub min_lon: f64,
    /// East edge in degrees.
    pub max_lon: f64,
}

impl OperatingBoundary {
    /// Create a boundary from its south/north/west/east edges.
    pub fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Geofence predicate: does the point lie inside the boundary?
    ///
    /// Edges are inclusive so a responder sitting exactly on the region line
    /// is not dropped.
    pub fn contains(&self, point: GeoPoint) -> bool {
        (self.min_lat..=self.max_lat).contains(&point.lat)
            && (self.min_lon..=self.max_lon).contains(&point.lon)
    }
}
