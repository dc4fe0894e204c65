use crate::{
    error::{Error, Result},
    spotify::Catalog,
    types::{Playlist, PopularityRange, TrackCandidate, Visibility},
};

use super::{PlaylistSynchronizer, RunContext, RunState, SearchCriteria, search_candidates};

/// Everything a user asks for in one run.
#[derive(Debug, Clone)]
pub struct SyncRequest {
    pub playlist_name: String,
    pub keyword: String,
    pub popularity: PopularityRange,
    pub limit: usize,
    pub visibility: Visibility,
    pub description: Option<String>,
}

impl SyncRequest {
    /// Rejects input the run cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.playlist_name.trim().is_empty() {
            return Err(Error::Validation("playlist name must not be empty".to_string()));
        }
        self.criteria().map(|_| ())
    }

    pub fn criteria(&self) -> Result<SearchCriteria> {
        SearchCriteria::new(self.keyword.as_str(), self.popularity, self.limit)
    }

    pub fn description(&self) -> String {
        match &self.description {
            Some(d) if !d.trim().is_empty() => d.clone(),
            _ => format!("Auto playlist: {}", self.keyword.trim()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunReport {
    pub playlist: Playlist,
    pub created: bool,
    pub candidates: Vec<TrackCandidate>,
    pub added: usize,
    pub state: RunState,
}

fn enter(ctx: &RunContext<'_>, state: &mut RunState, next: RunState) {
    debug_assert!(!state.is_terminal(), "run already ended as {}", state);
    *state = next;
    ctx.progress.state_changed(next);
}

/// Executes one run: resolve the playlist, search candidates, add new ones.
///
/// Any error ends the run and is returned unchanged; tracks added by earlier
/// batches stay in the playlist. Cancellation is checked between remote calls
/// and yields a report in the `Cancelled` state when it left work undone.
pub async fn run<C>(
    catalog: &C,
    user_id: &str,
    request: &SyncRequest,
    ctx: &RunContext<'_>,
) -> Result<RunReport>
where
    C: Catalog + ?Sized,
{
    request.validate()?;
    let criteria = request.criteria()?;
    let mut state = RunState::Idle;

    ctx.log(format!(
        "Starting operation for playlist '{}', genre '{}'",
        request.playlist_name.trim(),
        criteria.keyword
    ));
    enter(ctx, &mut state, RunState::Searching);

    let sync = PlaylistSynchronizer::new(catalog, user_id).with_visibility(request.visibility);
    let resolved = sync
        .find_or_create_playlist(&request.playlist_name, &request.description())
        .await?;
    let created = resolved.was_created();
    let playlist = resolved.into_playlist();
    if created {
        ctx.log(format!("Created playlist: {} (id: {})", playlist.name, playlist.id));
    } else {
        ctx.log(format!("Found existing playlist: {} (id: {})", playlist.name, playlist.id));
    }

    let mut report = RunReport {
        playlist,
        created,
        candidates: Vec::new(),
        added: 0,
        state,
    };

    if ctx.is_cancelled() {
        ctx.log("Operation cancelled by user (before search).");
        enter(ctx, &mut state, RunState::Cancelled);
        report.state = state;
        return Ok(report);
    }

    report.candidates = search_candidates(catalog, &criteria, ctx).await?;
    ctx.log(format!("Found {} candidate tracks.", report.candidates.len()));

    if ctx.is_cancelled() {
        ctx.log("Operation cancelled by user (during search).");
        enter(ctx, &mut state, RunState::Cancelled);
        report.state = state;
        return Ok(report);
    }

    enter(ctx, &mut state, RunState::Adding);
    let uris: Vec<String> = report.candidates.iter().map(|t| t.uri.clone()).collect();
    let outcome = sync.add_missing_tracks(&report.playlist.id, &uris, ctx).await?;
    report.added = outcome.added;
    ctx.log(format!(
        "Added {} new tracks to playlist '{}'.",
        report.added, report.playlist.name
    ));

    // a cancel that arrives after the last batch leaves nothing undone
    if outcome.was_interrupted() {
        ctx.log("Operation cancelled by user (during add).");
        enter(ctx, &mut state, RunState::Cancelled);
    } else {
        enter(ctx, &mut state, RunState::Finished);
    }
    report.state = state;
    Ok(report)
}
