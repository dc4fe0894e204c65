use serde::{Deserialize, Serialize};
use tabled::Tabled;

use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Token {
    pub access_token: String,
    pub refresh_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone)]
pub struct PkceToken {
    pub code_verifier: String,
    pub token: Option<Token>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct User {
    pub id: String,
    pub display_name: Option<String>,
}

impl User {
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

impl Visibility {
    pub fn is_public(self) -> bool {
        self == Visibility::Public
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackCandidate {
    pub uri: String,
    pub popularity: u8,
    pub artists: Vec<String>,
    pub title: String,
}

/// Inclusive popularity bounds, both within 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PopularityRange {
    min: u8,
    max: u8,
}

impl PopularityRange {
    pub const MAX: u8 = 100;

    pub fn new(min: u8, max: u8) -> Result<Self> {
        if max > Self::MAX {
            return Err(Error::Validation(format!(
                "popularity must be within 0..={}, got {}",
                Self::MAX,
                max
            )));
        }
        if min > max {
            return Err(Error::Validation(format!(
                "minimum popularity {} is above maximum {}",
                min, max
            )));
        }
        Ok(Self { min, max })
    }

    pub fn min(&self) -> u8 {
        self.min
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    pub fn contains(&self, popularity: u8) -> bool {
        (self.min..=self.max).contains(&popularity)
    }
}

impl Default for PopularityRange {
    fn default() -> Self {
        Self {
            min: 0,
            max: Self::MAX,
        }
    }
}

#[derive(Tabled)]
pub struct TrackTableRow {
    pub artists: String,
    pub title: String,
    pub popularity: u8,
}

impl From<&TrackCandidate> for TrackTableRow {
    fn from(track: &TrackCandidate) -> Self {
        TrackTableRow {
            artists: track.artists.join(", "),
            title: track.title.clone(),
            popularity: track.popularity,
        }
    }
}

// Spotify Web API wire types.

#[derive(Debug, Clone, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub next: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalUrls {
    pub spotify: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistOwner {
    pub id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistObject {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub external_urls: ExternalUrls,
    pub owner: Option<PlaylistOwner>,
}

impl From<PlaylistObject> for Playlist {
    fn from(p: PlaylistObject) -> Self {
        Playlist {
            id: p.id,
            name: p.name,
            url: p.external_urls.spotify,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
    pub collaborative: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<TrackRef>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackRef {
    pub uri: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AddTrackToPlaylistRequest<'a> {
    pub uris: &'a [String],
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddTrackToPlaylistResponse {
    pub snapshot_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: Option<SearchTracks>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchTracks {
    pub items: Vec<Option<TrackObject>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub uri: Option<String>,
    pub name: Option<String>,
    pub popularity: Option<u8>,
    #[serde(default)]
    pub artists: Vec<TrackArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackArtist {
    pub name: String,
}

impl TrackObject {
    /// Converts a search hit into a candidate, dropping hits without a URI.
    pub fn into_candidate(self) -> Option<TrackCandidate> {
        let uri = self.uri.filter(|u| !u.is_empty())?;
        Some(TrackCandidate {
            uri,
            popularity: self.popularity.unwrap_or(0),
            artists: self.artists.into_iter().map(|a| a.name).collect(),
            title: self.name.unwrap_or_else(|| "<unknown>".to_string()),
        })
    }
}
