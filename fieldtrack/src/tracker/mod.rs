//! Live responder position tracking.
//!
//! The tracker maintains a near-real-time view of active field responder
//! positions for a dispatch console: a change subscription signals that
//! rows changed, a throttled snapshot fetch produces the new authoritative
//! set, and a bounded-retry state machine keeps the subscription alive
//! through transient transport failures.
//!
//! # Design
//!
//! One supervisor task owns all mutable state and multiplexes command,
//! feed-event, fetch-completion, and timer sources in a single `select!`
//! loop. Change ticks carry no payload; every applied update is a full
//! snapshot replace, so the published view never interleaves rows from
//! different fetches. See [`supervisor`] for the generation guards that
//! make replaced subscriptions and superseded fetches inert.
//!
//! Entry point is [`ResponderTracker`]; callers hold a [`TrackerHandle`]
//! and watch [`TrackerSnapshot`] values.

pub mod config;
pub mod connection;
pub mod error;
pub mod gate;
pub mod handle;
pub mod state;
pub mod supervisor;

pub use config::TrackerConfig;
pub use connection::Transition;
pub use error::TrackerError;
pub use handle::TrackerHandle;
pub use state::{ConnectionState, ParamCell, ResponderLocation, SearchParams, TrackerSnapshot};
pub use supervisor::ResponderTracker;
