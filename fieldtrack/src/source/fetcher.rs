//! Tiered locator fetcher.
//!
//! [`TieredFetcher`] runs the role-selected tier chain against a
//! [`LocationBackend`] and turns raw rows into the ranked, geofenced
//! responder set. It is idempotent and side-effect-free beyond producing a
//! [`FetchOutcome`]; the supervisor decides what to publish.
//!
//! # Failure asymmetry
//!
//! Operational views must know when the system is broken; restricted public
//! views fail soft. A hard failure on the privileged or direct-fallback tier
//! becomes [`FetchOutcome::Failed`]. A restricted-tier timeout or a
//! permission rejection on the fallback tier becomes
//! [`FetchOutcome::Degraded`]: an empty set with no surfaced error, healed by
//! the next scheduled fetch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::geo::{haversine_km, OperatingBoundary};
use crate::session::AccessRole;
use crate::tracker::{ParamCell, ResponderLocation};

use super::backend::LocationBackend;
use super::error::SourceError;
use super::record::LocationRecord;
use super::tier::FetchTier;

/// Result of running the tier chain once.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    /// A tier produced an authoritative set (possibly empty).
    Snapshot(Vec<ResponderLocation>),
    /// Soft degradation: restricted-tier timeout or fallback permission
    /// rejection. Empty set, no surfaced error.
    Degraded,
    /// Every tier in the chain failed hard.
    Failed(SourceError),
}

/// What one tier yielded before post-processing.
enum TierAnswer {
    Rows(Vec<LocationRecord>),
    SoftEmpty(&'static str),
}

/// Runs the ordered tier chain and normalizes the winning tier's rows.
pub struct TieredFetcher<B> {
    backend: Arc<B>,
    boundary: OperatingBoundary,
    params: ParamCell,
    restricted_timeout: Duration,
}

impl<B> Clone for TieredFetcher<B> {
    fn clone(&self) -> Self {
        Self {
            backend: Arc::clone(&self.backend),
            boundary: self.boundary,
            params: self.params.clone(),
            restricted_timeout: self.restricted_timeout,
        }
    }
}

impl<B: LocationBackend> TieredFetcher<B> {
    pub fn new(
        backend: Arc<B>,
        boundary: OperatingBoundary,
        params: ParamCell,
        restricted_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            boundary,
            params,
            restricted_timeout,
        }
    }

    /// Run the tier chain for `role` and produce the outcome.
    ///
    /// The first tier to produce a usable answer (rows or a soft empty)
    /// short-circuits the rest; two tiers' results are never merged. Search
    /// parameters are read *after* the winning tier resolves, so distances
    /// and the radius cut always reflect the center current at completion
    /// time.
    pub async fn fetch(&self, role: AccessRole) -> FetchOutcome {
        let mut last_error = None;

        for &tier in FetchTier::chain_for(role) {
            match self.run_tier(tier).await {
                Ok(TierAnswer::Rows(rows)) => {
                    tracing::debug!(%tier, rows = rows.len(), "fetch tier succeeded");
                    return FetchOutcome::Snapshot(self.normalize(rows, role));
                }
                Ok(TierAnswer::SoftEmpty(reason)) => {
                    tracing::debug!(%tier, reason, "fetch tier degraded to empty");
                    return FetchOutcome::Degraded;
                }
                Err(error) => {
                    tracing::warn!(%tier, %error, "fetch tier failed, trying next");
                    last_error = Some(error);
                }
            }
        }

        FetchOutcome::Failed(
            last_error.unwrap_or_else(|| SourceError::Unavailable("no fetch tier ran".to_string())),
        )
    }

    async fn run_tier(&self, tier: FetchTier) -> Result<TierAnswer, SourceError> {
        match tier {
            FetchTier::Privileged => self.backend.fetch_all_active().await.map(TierAnswer::Rows),
            FetchTier::RestrictedPublic => {
                // Client-side deadline: a degraded network must never block
                // the restricted view.
                match tokio::time::timeout(
                    self.restricted_timeout,
                    self.backend.fetch_public_window(),
                )
                .await
                {
                    Err(_elapsed) => Ok(TierAnswer::SoftEmpty("client-side timeout")),
                    Ok(Err(SourceError::Timeout)) => Ok(TierAnswer::SoftEmpty("source timeout")),
                    Ok(Ok(rows)) => Ok(TierAnswer::Rows(rows)),
                    Ok(Err(error)) => Err(error),
                }
            }
            FetchTier::DirectFallback => match self.backend.fetch_raw_rows().await {
                // Row-level access rules are expected, not a system fault
                Err(SourceError::PermissionDenied) => {
                    Ok(TierAnswer::SoftEmpty("row-level access policy"))
                }
                Ok(rows) => Ok(TierAnswer::Rows(rows)),
                Err(error) => Err(error),
            },
        }
    }

    /// Deduplicate, geofence, rank, and radius-filter the winning tier's rows.
    fn normalize(&self, rows: Vec<LocationRecord>, role: AccessRole) -> Vec<ResponderLocation> {
        let params = self.params.get();

        // Latest observation wins on duplicate responder ids
        let mut newest: HashMap<String, LocationRecord> = HashMap::with_capacity(rows.len());
        for row in rows {
            match newest.get(&row.responder_id) {
                Some(existing) if existing.observed_at >= row.observed_at => {}
                _ => {
                    newest.insert(row.responder_id.clone(), row);
                }
            }
        }

        let mut ranked: Vec<ResponderLocation> = newest
            .into_values()
            .filter(|row| self.boundary.contains(row.position()))
            .map(|row| {
                let distance_km = haversine_km(params.center, row.position());
                ResponderLocation::from_record(row, distance_km)
            })
            // Elevated views show everyone; restricted views stop at the radius
            .filter(|loc| role.is_elevated() || loc.distance_km <= params.radius_km)
            .collect();

        ranked.sort_by(|a, b| {
            a.distance_km
                .partial_cmp(&b.distance_km)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        ranked
    }
}
