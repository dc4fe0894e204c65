use indexmap::IndexMap;

use crate::{
    error::{Error, Result},
    spotify::{Catalog, SEARCH_PAGE_LIMIT},
    types::{PopularityRange, TrackCandidate},
};

use super::RunContext;

/// What to look for in one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchCriteria {
    pub keyword: String,
    pub popularity: PopularityRange,
    pub limit: usize,
}

impl SearchCriteria {
    pub fn new(keyword: impl Into<String>, popularity: PopularityRange, limit: usize) -> Result<Self> {
        let keyword = keyword.into().trim().to_string();
        if keyword.is_empty() {
            return Err(Error::Validation("genre/keyword must not be empty".to_string()));
        }
        if limit == 0 {
            return Err(Error::Validation("track limit must be at least 1".to_string()));
        }
        Ok(Self {
            keyword,
            popularity,
            limit,
        })
    }
}

/// The queries issued for a keyword, in order.
///
/// Spotify's `genre:` filter matches reliably only on artist metadata, so the
/// bare keyword follows as a broader second pass.
pub fn search_queries(keyword: &str) -> [String; 2] {
    [format!("genre:{}", keyword), keyword.to_string()]
}

/// Collects up to `criteria.limit` unique tracks within the popularity range,
/// in first-seen order across the queries.
///
/// Stops issuing queries as soon as the limit is reached, and returns what it
/// has when cancelled. Fewer results than the limit is not an error.
pub async fn search_candidates<C>(
    catalog: &C,
    criteria: &SearchCriteria,
    ctx: &RunContext<'_>,
) -> Result<Vec<TrackCandidate>>
where
    C: Catalog + ?Sized,
{
    let limit = criteria.limit;
    let mut found: IndexMap<String, TrackCandidate> = IndexMap::new();
    ctx.progress.search_started(limit);

    for query in search_queries(&criteria.keyword) {
        if found.len() >= limit || ctx.is_cancelled() {
            break;
        }

        let tracks = catalog.search_tracks(&query, SEARCH_PAGE_LIMIT).await?;
        tracing::debug!(query = %query, results = tracks.len(), "search page");

        for track in tracks {
            if found.len() >= limit || ctx.is_cancelled() {
                break;
            }
            if !criteria.popularity.contains(track.popularity) || found.contains_key(&track.uri) {
                continue;
            }

            ctx.progress.track_found(found.len() + 1, limit, &track);
            found.insert(track.uri.clone(), track);
        }
    }

    Ok(found.into_values().collect())
}

/// Same as [`search_candidates`], keeping only the track URIs.
pub async fn search_track_uris<C>(
    catalog: &C,
    criteria: &SearchCriteria,
    ctx: &RunContext<'_>,
) -> Result<Vec<String>>
where
    C: Catalog + ?Sized,
{
    let tracks = search_candidates(catalog, criteria, ctx).await?;
    Ok(tracks.into_iter().map(|t| t.uri).collect())
}
