//! Backend location source trait.

use std::future::Future;

use super::error::SourceError;
use super::record::LocationRecord;

/// The three backend data sources behind the tiered fetcher.
///
/// Implemented by the host application on top of its persistence/API layer.
/// Each method corresponds to one [`FetchTier`](super::FetchTier); the fetcher
/// decides which to call and how to interpret failures, so implementations
/// should report errors honestly rather than papering over them.
pub trait LocationBackend: Send + Sync {
    /// Privileged source: every known active location, unfiltered by radius
    /// server-side.
    fn fetch_all_active(
        &self,
    ) -> impl Future<Output = Result<Vec<LocationRecord>, SourceError>> + Send;

    /// Restricted public source: time-windowed and count-capped server-side.
    ///
    /// The fetcher wraps this call in a client-side timeout; implementations
    /// need not enforce their own deadline.
    fn fetch_public_window(
        &self,
    ) -> impl Future<Output = Result<Vec<LocationRecord>, SourceError>> + Send;

    /// Direct fallback source: raw rows, subject to row-level access rules.
    fn fetch_raw_rows(
        &self,
    ) -> impl Future<Output = Result<Vec<LocationRecord>, SourceError>> + Send;
}
