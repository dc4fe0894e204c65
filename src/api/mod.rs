//! # API Module
//!
//! HTTP endpoints served by the temporary local server during authentication.
//!
//! - [`callback`] - receives the authorization code from Spotify and exchanges
//!   it, together with the PKCE verifier, for an access token.
//! - [`health`] - reports status and version, handy for checking that the
//!   redirect URI points at a running server.
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use genrelist::api::{callback, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::CallbackState;
pub use callback::callback;
pub use health::health;
