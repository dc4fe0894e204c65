use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
};

use crate::types::TrackCandidate;

/// Operation-level state of one run. `Finished` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Searching,
    Adding,
    Finished,
    Cancelled,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(self, RunState::Finished | RunState::Cancelled)
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RunState::Idle => "idle",
            RunState::Searching => "searching",
            RunState::Adding => "adding",
            RunState::Finished => "finished",
            RunState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Receives progress from a run. Every hook defaults to doing nothing.
///
/// Hooks are called from the task executing the run; implementations that
/// drive an interface are responsible for getting the update to it.
pub trait ProgressSink: Send + Sync {
    fn state_changed(&self, _state: RunState) {}

    fn search_started(&self, _target: usize) {}

    /// Called once per accepted candidate; `found` counts from 1.
    fn track_found(&self, _found: usize, _target: usize, _track: &TrackCandidate) {}

    fn add_started(&self, _target: usize) {}

    fn tracks_added(&self, _added: usize, _target: usize) {}

    /// Human-readable status line.
    fn log(&self, _message: &str) {}
}

/// A sink that ignores everything.
pub struct Silent;

impl ProgressSink for Silent {}

/// Cooperative cancellation flag, checked between remote calls.
///
/// Setting it never interrupts a request already in flight.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// What a run reports to and listens for.
pub struct RunContext<'a> {
    pub progress: &'a dyn ProgressSink,
    pub cancel: CancelToken,
}

impl<'a> RunContext<'a> {
    pub fn new(progress: &'a dyn ProgressSink, cancel: CancelToken) -> Self {
        Self { progress, cancel }
    }

    /// A context nobody watches and nobody cancels.
    pub fn detached() -> RunContext<'static> {
        RunContext {
            progress: &Silent,
            cancel: CancelToken::new(),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn log(&self, message: impl AsRef<str>) {
        self.progress.log(message.as_ref());
    }
}
