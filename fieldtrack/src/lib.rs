//! FieldTrack - live field responder position tracking.
//!
//! This library maintains a near-real-time, distance-ranked view of active
//! field responder positions for an emergency dispatch console, built on
//! tiered role-based data sources and a change-notification feed.
//!
//! # High-Level API
//!
//! The [`tracker`] module provides the facade most callers want:
//!
//! ```ignore
//! use std::sync::Arc;
//! use fieldtrack::geo::{GeoPoint, OperatingBoundary};
//! use fieldtrack::tracker::{ResponderTracker, TrackerConfig};
//!
//! let config = TrackerConfig::new(GeoPoint::new(10.2465, 122.9735));
//! let boundary = OperatingBoundary::new(9.0, 11.5, 121.5, 124.0);
//! let handle = ResponderTracker::new(backend, feed, session, boundary, config).start();
//!
//! let mut snapshots = handle.subscribe();
//! while snapshots.changed().await.is_ok() {
//!     render(snapshots.borrow().clone());
//! }
//! ```

pub mod feed;
pub mod geo;
pub mod logging;
pub mod session;
pub mod source;
pub mod tracker;

/// Version of the FieldTrack library.
///
/// Defined in `Cargo.toml` and injected at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
