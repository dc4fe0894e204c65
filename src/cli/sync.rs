use std::{sync::Arc, time::Duration};

use colored::Colorize;
use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use tabled::Table;

use crate::{
    config::Settings,
    error, info,
    spotify::{Catalog, SpotifyClient},
    success,
    sync::{self, CancelToken, ProgressSink, RunContext, RunReport, RunState, SyncRequest},
    types::{PopularityRange, TrackCandidate, TrackTableRow, Visibility},
    warning,
};

#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub name: String,
    pub genre: String,
    pub min_popularity: u8,
    pub max_popularity: u8,
    pub limit: usize,
    pub private: bool,
    pub description: Option<String>,
    pub open: bool,
}

/// Two bars (search, add) plus a scrolling log above them.
struct CliProgress {
    multi: MultiProgress,
    search: ProgressBar,
    add: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let style = ProgressStyle::with_template(
            "{prefix:>7.bold} [{bar:30.blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

        let multi = MultiProgress::new();
        let search = multi.add(ProgressBar::new(1).with_style(style.clone()));
        search.set_prefix("Search");
        let add = multi.add(ProgressBar::new(1).with_style(style));
        add.set_prefix("Add");

        Self { multi, search, add }
    }

    fn println(&self, line: String) {
        // hidden draw targets (e.g. no tty) reject println; fall back to stdout
        if self.multi.println(&line).is_err() {
            println!("{}", line);
        }
    }

    fn finish(&self) {
        self.search.finish();
        self.add.finish();
    }
}

impl ProgressSink for CliProgress {
    fn state_changed(&self, state: RunState) {
        match state {
            RunState::Searching => self.search.enable_steady_tick(Duration::from_millis(200)),
            RunState::Adding => self.search.disable_steady_tick(),
            _ => {}
        }
    }

    fn search_started(&self, target: usize) {
        self.search.set_length(target.max(1) as u64);
        self.search.set_position(0);
    }

    fn track_found(&self, found: usize, _target: usize, track: &TrackCandidate) {
        self.search.set_position(found as u64);
        self.println(format!(
            "    {} - {} (pop {})",
            track.artists.join(", ").dimmed(),
            track.title,
            track.popularity
        ));
    }

    fn add_started(&self, target: usize) {
        self.add.set_length(target.max(1) as u64);
        self.add.set_position(0);
    }

    fn tracks_added(&self, added: usize, _target: usize) {
        self.add.set_position(added as u64);
    }

    fn log(&self, message: &str) {
        self.println(format!("[{}] {}", "o".blue().bold(), message));
    }
}

pub async fn sync(settings: Settings, opts: SyncOptions) {
    let popularity = match PopularityRange::new(opts.min_popularity, opts.max_popularity) {
        Ok(range) => range,
        Err(e) => error!("{}", e),
    };

    let request = SyncRequest {
        playlist_name: opts.name.trim().to_string(),
        keyword: opts.genre.trim().to_string(),
        popularity,
        limit: opts.limit,
        visibility: if opts.private {
            Visibility::Private
        } else {
            Visibility::Public
        },
        description: opts.description.clone(),
    };
    if let Err(e) = request.validate() {
        error!("{}", e);
    }

    info!("Starting authentication...");
    let session = match SpotifyClient::new(settings).authenticate().await {
        Ok(s) => s,
        Err(e) => error!("{}\nRun genrelist auth --force.", e),
    };
    let user = match session.current_user().await {
        Ok(u) => u,
        Err(e) => error!("Authentication failed: {}", e),
    };
    success!("Authenticated as {}", user.label());

    let session = Arc::new(session);
    let progress = Arc::new(CliProgress::new());
    let cancel = CancelToken::new();

    let job = {
        let session = Arc::clone(&session);
        let progress = Arc::clone(&progress);
        let cancel = cancel.clone();
        let user_id = user.id.clone();
        tokio::spawn(async move {
            let ctx = RunContext::new(progress.as_ref(), cancel);
            sync::run(session.as_ref(), &user_id, &request, &ctx).await
        })
    };

    let watcher = {
        let progress = Arc::clone(&progress);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
                progress.log("Cancellation requested... (will stop when current request completes)");
            }
        })
    };

    let outcome = job.await;
    watcher.abort();
    progress.finish();

    match outcome {
        Ok(Ok(report)) => print_report(&report, opts.open),
        Ok(Err(e)) => error!("Operation failed: {}", e),
        Err(e) => error!("Task join error: {}", e),
    }
}

fn print_report(report: &RunReport, open: bool) {
    if !report.candidates.is_empty() {
        let rows: Vec<TrackTableRow> = report.candidates.iter().map(TrackTableRow::from).collect();
        println!("{}", Table::new(rows));
    }

    let verb = if report.created { "created" } else { "existing" };
    info!(
        "Playlist '{}' ({}, id: {})",
        report.playlist.name, verb, report.playlist.id
    );

    match report.state {
        RunState::Cancelled => warning!(
            "Operation cancelled: found {} candidates, added {} tracks.",
            report.candidates.len(),
            report.added
        ),
        _ => success!(
            "Found {} candidates, added {} new tracks.",
            report.candidates.len(),
            report.added
        ),
    }

    let Some(url) = &report.playlist.url else {
        return;
    };
    info!("Playlist link: {}", url);
    if open && webbrowser::open(url).is_err() {
        warning!("Failed to open browser. Open the link above manually.");
    }
}
