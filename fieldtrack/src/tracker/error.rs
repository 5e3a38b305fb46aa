//! Tracker error taxonomy.

use thiserror::Error;

use crate::source::SourceError;

/// Errors surfaced through the facade's `error` field.
///
/// Soft degradation (restricted-tier timeout, fallback permission rejection)
/// deliberately has no variant here: it is expected, frequent, and not
/// user-actionable, so the facade keeps `error` empty and publishes an empty
/// set instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackerError {
    /// The change subscription spent its retry budget; live updates stopped.
    #[error("Connection lost. Live position updates are unavailable.")]
    ConnectionLost { attempts: u32 },

    /// The privileged or direct-fallback tier failed hard.
    #[error("Failed to load responder locations: {0}")]
    Fetch(#[from] SourceError),
}
