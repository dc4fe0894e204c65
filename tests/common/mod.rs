//! In-memory `Catalog` used by the sync tests.

#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use async_trait::async_trait;
use genrelist::{
    error::{Error, Result},
    spotify::Catalog,
    sync::{ProgressSink, RunState},
    types::{Playlist, TrackCandidate, User},
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CurrentUser,
    ListPlaylists,
    Create {
        owner: String,
        name: String,
        public: bool,
        description: String,
    },
    ListTracks(String),
    Add(String, Vec<String>),
    Search(String, u32),
}

#[derive(Default)]
pub struct FakeCatalog {
    pub playlists: Mutex<Vec<Playlist>>,
    pub members: Mutex<HashMap<String, Vec<String>>>,
    pub search_pages: Mutex<VecDeque<Vec<TrackCandidate>>>,
    pub calls: Mutex<Vec<Call>>,
    /// 1-based index of the add call that fails, if any.
    pub fail_add_on: Option<usize>,
}

impl FakeCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_playlists(self, playlists: &[(&str, &str)]) -> Self {
        *self.playlists.lock().unwrap() = playlists
            .iter()
            .map(|(id, name)| playlist(id, name))
            .collect();
        self
    }

    pub fn with_members(self, playlist_id: &str, uris: &[&str]) -> Self {
        self.members.lock().unwrap().insert(
            playlist_id.to_string(),
            uris.iter().map(|u| u.to_string()).collect(),
        );
        self
    }

    pub fn with_search_pages(self, pages: Vec<Vec<TrackCandidate>>) -> Self {
        *self.search_pages.lock().unwrap() = pages.into();
        self
    }

    pub fn failing_add(mut self, nth: usize) -> Self {
        self.fail_add_on = Some(nth);
        self
    }

    pub fn members_of(&self, playlist_id: &str) -> Vec<String> {
        self.members
            .lock()
            .unwrap()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn add_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Add(_, uris) => Some(uris),
                _ => None,
            })
            .collect()
    }

    pub fn search_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Search(q, _) => Some(q),
                _ => None,
            })
            .collect()
    }

    pub fn create_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Create { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn current_user(&self) -> Result<User> {
        self.record(Call::CurrentUser);
        Ok(User {
            id: "user-1".to_string(),
            display_name: Some("Test User".to_string()),
        })
    }

    async fn list_user_playlists(&self) -> Result<Vec<Playlist>> {
        self.record(Call::ListPlaylists);
        Ok(self.playlists.lock().unwrap().clone())
    }

    async fn create_playlist(
        &self,
        owner_id: &str,
        name: &str,
        is_public: bool,
        description: &str,
    ) -> Result<Playlist> {
        self.record(Call::Create {
            owner: owner_id.to_string(),
            name: name.to_string(),
            public: is_public,
            description: description.to_string(),
        });
        let mut playlists = self.playlists.lock().unwrap();
        let created = playlist(&format!("new-{}", playlists.len() + 1), name);
        playlists.push(created.clone());
        Ok(created)
    }

    async fn list_playlist_track_uris(&self, playlist_id: &str) -> Result<Vec<String>> {
        self.record(Call::ListTracks(playlist_id.to_string()));
        Ok(self
            .members
            .lock()
            .unwrap()
            .get(playlist_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn add_track_uris(&self, playlist_id: &str, uris: &[String]) -> Result<()> {
        self.record(Call::Add(playlist_id.to_string(), uris.to_vec()));
        if self.fail_add_on == Some(self.add_calls().len()) {
            return Err(Error::RemoteService("503 Service Unavailable".to_string()));
        }
        self.members
            .lock()
            .unwrap()
            .entry(playlist_id.to_string())
            .or_default()
            .extend(uris.iter().cloned());
        Ok(())
    }

    async fn search_tracks(&self, query: &str, limit: u32) -> Result<Vec<TrackCandidate>> {
        self.record(Call::Search(query.to_string(), limit));
        Ok(self
            .search_pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_default())
    }
}

/// Records what a run reports.
#[derive(Default)]
pub struct RecordingSink {
    pub states: Mutex<Vec<RunState>>,
    pub found: Mutex<Vec<usize>>,
    pub added: Mutex<Vec<usize>>,
    pub lines: Mutex<Vec<String>>,
}

impl ProgressSink for RecordingSink {
    fn state_changed(&self, state: RunState) {
        self.states.lock().unwrap().push(state);
    }

    fn track_found(&self, found: usize, _target: usize, _track: &TrackCandidate) {
        self.found.lock().unwrap().push(found);
    }

    fn tracks_added(&self, added: usize, _target: usize) {
        self.added.lock().unwrap().push(added);
    }

    fn log(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}

pub fn playlist(id: &str, name: &str) -> Playlist {
    Playlist {
        id: id.to_string(),
        name: name.to_string(),
        url: Some(format!("https://open.spotify.com/playlist/{}", id)),
    }
}

pub fn track(uri: &str, popularity: u8) -> TrackCandidate {
    TrackCandidate {
        uri: uri.to_string(),
        popularity,
        artists: vec![format!("Artist {}", uri)],
        title: format!("Title {}", uri),
    }
}

pub fn uris(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("spotify:track:{}", i)).collect()
}
