//! # Sync Module
//!
//! The business logic of a run: find candidate tracks, resolve the target
//! playlist and add whatever it does not contain yet.
//!
//! - [`search`] - runs the genre queries, filters by popularity and dedups
//! - [`playlist`] - finds or creates the playlist and adds only new tracks
//! - [`pipeline`] - drives one run through `Idle → Searching → Adding →
//!   Finished`, or `Cancelled` when the cancel token is set
//! - [`context`] - progress hooks and the cooperative cancel token
//!
//! All remote access goes through [`crate::spotify::Catalog`], so the logic
//! here runs the same against the real API or an in-memory fake.

pub mod context;
pub mod pipeline;
pub mod playlist;
pub mod search;

pub use context::{CancelToken, ProgressSink, RunContext, RunState, Silent};
pub use pipeline::{RunReport, SyncRequest, run};
pub use playlist::{AddOutcome, PlaylistSynchronizer, Resolved};
pub use search::{SearchCriteria, search_candidates, search_queries, search_track_uris};
