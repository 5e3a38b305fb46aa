//! Tiered location sources.
//!
//! This module produces the authoritative responder set for the current
//! search parameters and caller role. Data comes from one of three backend
//! sources tried in role-dependent order, with the first usable answer
//! short-circuiting the rest:
//!
//! 1. **Privileged source** - all known active locations, elevated roles only.
//! 2. **Restricted public source** - time-windowed, count-capped view for
//!    restricted roles, guarded by a client-side timeout.
//! 3. **Direct fallback source** - raw rows under row-level access rules, any
//!    role with baseline read access.
//!
//! Two tiers' results are never merged. On success, rows are deduplicated by
//! responder id (latest observation wins), geofenced against the operating
//! boundary, ranked by distance from the *current* center, and radius-filtered
//! for non-elevated callers.

mod backend;
mod error;
mod fetcher;
mod record;
mod tier;

pub use backend::LocationBackend;
pub use error::SourceError;
pub use fetcher::{FetchOutcome, TieredFetcher};
pub use record::LocationRecord;
pub use tier::FetchTier;
