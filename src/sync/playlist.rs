use std::collections::HashSet;

use crate::{
    error::Result,
    spotify::{BATCH_SIZE, Catalog},
    types::{Playlist, Visibility},
    utils,
};

use super::RunContext;

/// Outcome of resolving a playlist by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    Found(Playlist),
    Created(Playlist),
}

impl Resolved {
    pub fn playlist(&self) -> &Playlist {
        match self {
            Resolved::Found(p) | Resolved::Created(p) => p,
        }
    }

    pub fn into_playlist(self) -> Playlist {
        match self {
            Resolved::Found(p) | Resolved::Created(p) => p,
        }
    }

    pub fn was_created(&self) -> bool {
        matches!(self, Resolved::Created(_))
    }
}

/// What an add pass did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AddOutcome {
    /// Tracks appended to the playlist.
    pub added: usize,
    /// New tracks left out because the run was cancelled between batches.
    pub skipped: usize,
}

impl AddOutcome {
    pub fn was_interrupted(&self) -> bool {
        self.skipped > 0
    }
}

/// Keeps a user's playlist in step with a list of candidate tracks.
///
/// Only ever appends; tracks are never removed.
pub struct PlaylistSynchronizer<'a, C: Catalog + ?Sized> {
    catalog: &'a C,
    user_id: String,
    visibility: Visibility,
}

impl<'a, C: Catalog + ?Sized> PlaylistSynchronizer<'a, C> {
    pub fn new(catalog: &'a C, user_id: impl Into<String>) -> Self {
        Self {
            catalog,
            user_id: user_id.into(),
            visibility: Visibility::default(),
        }
    }

    /// Visibility used when a playlist has to be created. Defaults to public.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// First playlist whose trimmed name equals `name`, ignoring case.
    pub async fn find_playlist_by_name(&self, name: &str) -> Result<Option<Playlist>> {
        let playlists = self.catalog.list_user_playlists().await?;
        Ok(playlists
            .into_iter()
            .find(|p| utils::same_name(&p.name, name)))
    }

    pub async fn find_or_create_playlist(&self, name: &str, description: &str) -> Result<Resolved> {
        if let Some(existing) = self.find_playlist_by_name(name).await? {
            return Ok(Resolved::Found(existing));
        }

        let created = self
            .catalog
            .create_playlist(
                &self.user_id,
                name.trim(),
                self.visibility.is_public(),
                description,
            )
            .await?;
        Ok(Resolved::Created(created))
    }

    /// Adds the candidates the playlist does not contain yet, in input order.
    ///
    /// Membership is fetched fresh on every call. Returns how many tracks were
    /// actually added, which is less than planned if `ctx` is cancelled between
    /// batches.
    pub async fn add_new_tracks(
        &self,
        playlist_id: &str,
        candidates: &[String],
        ctx: &RunContext<'_>,
    ) -> Result<usize> {
        let outcome = self.add_missing_tracks(playlist_id, candidates, ctx).await?;
        Ok(outcome.added)
    }

    /// Same as [`Self::add_new_tracks`], also reporting whether cancellation
    /// left any batch unsent.
    pub async fn add_missing_tracks(
        &self,
        playlist_id: &str,
        candidates: &[String],
        ctx: &RunContext<'_>,
    ) -> Result<AddOutcome> {
        let existing: HashSet<String> = self
            .catalog
            .list_playlist_track_uris(playlist_id)
            .await?
            .into_iter()
            .collect();

        let mut seen: HashSet<&str> = HashSet::new();
        let mut to_add: Vec<String> = Vec::new();
        for uri in candidates {
            if uri.is_empty() || existing.contains(uri) {
                continue;
            }
            if seen.insert(uri.as_str()) {
                to_add.push(uri.clone());
            }
        }

        if to_add.is_empty() {
            ctx.log("No new tracks to add.");
            return Ok(AddOutcome::default());
        }

        let target = to_add.len();
        ctx.progress.add_started(target);

        let mut added = 0;
        for batch in to_add.chunks(BATCH_SIZE) {
            if ctx.is_cancelled() {
                break;
            }
            self.catalog.add_track_uris(playlist_id, batch).await?;
            added += batch.len();
            ctx.progress.tracks_added(added, target);
        }

        Ok(AddOutcome {
            added,
            skipped: target - added,
        })
    }
}
