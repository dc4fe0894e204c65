use async_trait::async_trait;
use futures_util::TryStreamExt;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::{Mutex, OnceCell};
use tracing::debug;

use crate::{
    config::Credentials,
    error::{Error, Result},
    management::TokenManager,
    types::{
        AddTrackToPlaylistRequest, AddTrackToPlaylistResponse, CreatePlaylistRequest, Playlist,
        PlaylistItem, PlaylistObject, SearchResponse, TrackCandidate, User,
    },
};

use super::{BATCH_SIZE, Catalog, ITEMS_PAGE_SIZE, PAGE_SIZE, SEARCH_PAGE_LIMIT, pages::pages};

/// An authenticated connection to the Spotify Web API.
///
/// Obtained from [`super::SpotifyClient::authenticate`] and handed to whatever
/// needs catalog access. The token is refreshed on demand.
pub struct Session {
    http: Client,
    api_url: String,
    creds: Credentials,
    tokens: Mutex<TokenManager>,
    user: OnceCell<User>,
}

impl Session {
    pub fn new(
        http: Client,
        api_url: impl Into<String>,
        creds: Credentials,
        tokens: TokenManager,
    ) -> Self {
        Self {
            http,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            creds,
            tokens: Mutex::new(tokens),
            user: OnceCell::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let token = self
            .tokens
            .lock()
            .await
            .get_valid_token(&self.http, &self.creds)
            .await?;

        let response = request.bearer_auth(token).send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().path().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(Error::RemoteService(format!(
            "{} returned {}: {}",
            url,
            status,
            body.trim()
        )))
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self.send(self.http.get(url)).await?;
        Ok(response.json::<T>().await?)
    }

    async fn post_json<B, T>(&self, url: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let response = self.send(self.http.post(url).json(body)).await?;
        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl Catalog for Session {
    async fn current_user(&self) -> Result<User> {
        let url = self.endpoint("/me");
        self.user
            .get_or_try_init(|| async { self.get_json::<User>(&url).await })
            .await
            .cloned()
    }

    async fn list_user_playlists(&self) -> Result<Vec<Playlist>> {
        let me = self.current_user().await?;
        let url = self.endpoint(&format!("/me/playlists?limit={}&offset=0", PAGE_SIZE));

        let all: Vec<Option<PlaylistObject>> = pages(self, url).try_concat().await?;
        debug!(count = all.len(), "listed playlists");

        // /me/playlists also returns followed playlists, which cannot be modified.
        Ok(all
            .into_iter()
            .flatten()
            .filter(|p| p.owner.as_ref().is_some_and(|o| o.id == me.id))
            .map(Playlist::from)
            .collect())
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        is_public: bool,
        description: &str,
    ) -> Result<Playlist> {
        let url = self.endpoint(&format!("/users/{}/playlists", owner_id));
        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: description.to_string(),
            public: is_public,
            collaborative: false,
        };

        let created: PlaylistObject = self.post_json(&url, &request).await?;
        debug!(id = %created.id, name = %created.name, public = is_public, "created playlist");
        Ok(created.into())
    }

    async fn list_playlist_track_uris(&self, playlist_id: &str) -> Result<Vec<String>> {
        let url = self.endpoint(&format!(
            "/playlists/{}/tracks?limit={}&offset=0",
            playlist_id, ITEMS_PAGE_SIZE
        ));

        let items: Vec<PlaylistItem> = pages(self, url).try_concat().await?;
        Ok(items
            .into_iter()
            .filter_map(|item| item.track.and_then(|t| t.uri))
            .filter(|uri| !uri.is_empty())
            .collect())
    }

    async fn add_track_uris(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        let url = self.endpoint(&format!("/playlists/{}/tracks", playlist_id));

        for chunk in uris.chunks(BATCH_SIZE) {
            debug!(playlist_id, count = chunk.len(), "adding tracks");
            let res: AddTrackToPlaylistResponse = self
                .post_json(&url, &AddTrackToPlaylistRequest { uris: chunk })
                .await?;
            debug!(snapshot_id = %res.snapshot_id, "tracks added");
        }

        Ok(())
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<TrackCandidate>> {
        let limit = limit.clamp(1, SEARCH_PAGE_LIMIT).to_string();
        let request = self.http.get(self.endpoint("/search")).query(&[
            ("q", query),
            ("type", "track"),
            ("limit", limit.as_str()),
        ]);

        let res: SearchResponse = self.send(request).await?.json().await?;
        let tracks: Vec<TrackCandidate> = res
            .tracks
            .map(|t| t.items)
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(|t| t.into_candidate())
            .collect();

        debug!(query, count = tracks.len(), "search finished");
        Ok(tracks)
    }
}
