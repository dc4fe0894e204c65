//! # CLI Module
//!
//! User-facing commands. Each command loads what it needs, calls into
//! [`crate::spotify`] and [`crate::sync`], and turns the outcome into console
//! output using the crate's `info!`/`success!`/`warning!`/`error!` macros.
//!
//! - [`auth`] - authenticate (reusing the cached token unless forced)
//! - [`whoami`] - show the authenticated user and token cache location
//! - [`sync`] - build or extend a playlist from a genre search, with live
//!   progress bars and Ctrl-C cancellation
//! - [`genres`] - list suggested genre keywords
//!
//! ```bash
//! genrelist auth
//! genrelist sync --name "Road Trip" --genre rock --min-popularity 50 --limit 30
//! genrelist sync --name "Late Night" --genre lo-fi --private --open
//! ```
//!
//! Errors that end a run are printed and exit the process with status 1;
//! tracks already added stay in the playlist.

mod auth;
mod genres;
mod sync;

pub use auth::auth;
pub use auth::whoami;
pub use genres::genres;
pub use sync::SyncOptions;
pub use sync::sync;
