//! Error types shared by the Spotify adapter, the sync core and the CLI.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Every failure a run can end with.
///
/// Remote failures are never retried; they abort the current run and leave
/// whatever was already added to the playlist in place.
#[derive(Error, Debug)]
pub enum Error {
    /// Credential exchange, refresh or configuration failed.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network, HTTP or decoding failure while talking to Spotify.
    #[error("Spotify request failed: {0}")]
    RemoteService(String),

    /// Malformed user input, rejected before any remote call.
    #[error("Invalid input: {0}")]
    Validation(String),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Error::RemoteService(err.to_string())
    }
}

impl Error {
    pub fn is_authentication(&self) -> bool {
        matches!(self, Error::Authentication(_))
    }
}
