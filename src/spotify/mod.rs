//! # Spotify Integration Module
//!
//! The adapter between the playlist logic and the Spotify Web API. It owns
//! authentication, pagination, search and batched playlist writes; nothing
//! above this module builds URLs or touches HTTP.
//!
//! ```text
//! CLI / sync pipeline
//!          ↓
//!     Catalog trait
//!          ↓
//! Session (reqwest, bearer token, page streams)
//!          ↓
//! Spotify Web API
//! ```
//!
//! ## Authentication
//!
//! [`SpotifyClient::authenticate`] returns a [`Session`]. A cached token is
//! reused (and refreshed when close to expiry); otherwise the OAuth 2.0
//! authorization code flow with PKCE runs in the browser, with the local
//! callback server from [`crate::server`] receiving the code. The resulting
//! session is passed explicitly to everything that needs the API.
//!
//! ## Endpoints
//!
//! - `GET /me` - current user
//! - `GET /me/playlists` - user's playlists, paginated
//! - `POST /users/{user_id}/playlists` - create playlist
//! - `GET /playlists/{playlist_id}/tracks` - playlist items, paginated
//! - `POST /playlists/{playlist_id}/tracks` - add tracks, 100 per request
//! - `GET /search` - track search, one page of at most 50
//!
//! ## Errors
//!
//! Failures surface as [`Error::RemoteService`] or [`Error::Authentication`]
//! and are never retried here.

pub mod auth;
mod pages;
mod session;

use async_trait::async_trait;
use reqwest::Client;

use crate::{
    config::{Credentials, Settings},
    error::{Error, Result},
    management::TokenManager,
    types::{Playlist, TrackCandidate, User},
};

pub use session::Session;

/// Maximum number of URIs per add-tracks request.
pub const BATCH_SIZE: usize = 100;
/// Service cap on search results per request.
pub const SEARCH_PAGE_LIMIT: u32 = 50;
/// Page size used when listing playlists.
pub const PAGE_SIZE: u32 = 50;
/// Page size used when listing playlist items.
pub const ITEMS_PAGE_SIZE: u32 = 100;

/// The catalog operations the sync core relies on.
///
/// Every call may block for arbitrary latency; implementations must not retry.
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn current_user(&self) -> Result<User>;

    /// Every playlist owned by the current user, in service order.
    async fn list_user_playlists(&self) -> Result<Vec<Playlist>>;

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        is_public: bool,
        description: &str,
    ) -> Result<Playlist>;

    /// Track URIs currently in the playlist; items without a track are skipped.
    async fn list_playlist_track_uris(&self, playlist_id: &str) -> Result<Vec<String>>;

    /// Appends URIs in order, one request per batch of [`BATCH_SIZE`].
    async fn add_track_uris(&self, playlist_id: &str, uris: &[String]) -> Result<()>;

    /// A single page of at most `min(limit, 50)` tracks matching `query`.
    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<TrackCandidate>>;
}

/// Entry point that turns [`Settings`] into an authenticated [`Session`].
pub struct SpotifyClient {
    settings: Settings,
    http: Client,
}

impl SpotifyClient {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            http: Client::new(),
        }
    }

    /// Returns a session, reusing the cached token when it is still usable.
    ///
    /// Calling this repeatedly is safe: once a token is cached no further
    /// browser round trip happens.
    pub async fn authenticate(&self) -> Result<Session> {
        let creds = self.settings.credentials()?;

        match TokenManager::load(&self.settings.cache_path).await {
            Ok(mut tokens) => match tokens.get_valid_token(&self.http, &creds).await {
                Ok(_) => {
                    tracing::debug!(cache = %self.settings.cache_path.display(), "using cached token");
                    Ok(self.session(creds, tokens))
                }
                Err(e) => {
                    tracing::warn!(error = %e, "cached token unusable, starting authorization");
                    self.authenticate_fresh().await
                }
            },
            Err(e) => {
                tracing::debug!(error = %e, "no cached token");
                self.authenticate_fresh().await
            }
        }
    }

    /// Runs the browser authorization flow regardless of any cached token.
    pub async fn authenticate_fresh(&self) -> Result<Session> {
        let creds = self.settings.credentials()?;
        let token = auth::authorize(&self.http, &creds, &self.settings.server_addr).await?;

        let tokens = TokenManager::new(token, &self.settings.cache_path);
        tokens
            .persist()
            .await
            .map_err(|e| Error::Authentication(format!("failed to cache token: {}", e)))?;

        Ok(self.session(creds, tokens))
    }

    fn session(&self, creds: Credentials, tokens: TokenManager) -> Session {
        Session::new(self.http.clone(), self.settings.api_url.clone(), creds, tokens)
    }
}
