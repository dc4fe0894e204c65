//! Configuration management for the genre playlist builder.
//!
//! Values come from environment variables, optionally seeded from a `.env`
//! file in the local data directory. Only the Spotify client id is mandatory,
//! and its absence is reported when authenticating, not at startup.
//!
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults

use std::{env, path::PathBuf};

use crate::error::{Error, Result};

pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:8888/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8888";
pub const DEFAULT_SCOPE: &str =
    "playlist-modify-public playlist-modify-private playlist-read-private user-library-read";
pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// The file is looked up in:
/// - Linux: `~/.local/share/genrelist/.env`
/// - macOS: `~/Library/Application Support/genrelist/.env`
/// - Windows: `%LOCALAPPDATA%/genrelist/.env`
///
/// A missing file is fine; variables may come from the process environment.
///
/// # Errors
///
/// Returns an error string if the directory cannot be created or the file
/// exists but cannot be parsed.
pub async fn load_env() -> std::result::Result<(), String> {
    let path = data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent)
            .await
            .map_err(|e| e.to_string())?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| e.to_string())?;
    }
    Ok(())
}

/// Returns the application directory inside the platform's local data dir.
///
/// Falls back to `./genrelist` when the platform reports no data directory.
/// The token cache defaults to `cache/token.json` below this directory.
pub fn data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("genrelist");
    path
}

/// Runtime settings for talking to Spotify.
///
/// | Field | Variable | Default |
/// |---|---|---|
/// | `client_id` | `SPOTIFY_CLIENT_ID` | none, required to authenticate |
/// | `client_secret` | `SPOTIFY_CLIENT_SECRET` | none |
/// | `redirect_uri` | `SPOTIFY_REDIRECT_URI` | [`DEFAULT_REDIRECT_URI`] |
/// | `cache_path` | `SPOTIFY_CACHE_PATH` | `<data dir>/cache/token.json` |
/// | `server_addr` | `SERVER_ADDRESS` | [`DEFAULT_SERVER_ADDRESS`] |
/// | `scope` | `SPOTIFY_API_AUTH_SCOPE` | [`DEFAULT_SCOPE`] |
/// | `auth_url` | `SPOTIFY_API_AUTH_URL` | [`DEFAULT_AUTH_URL`] |
/// | `token_url` | `SPOTIFY_API_TOKEN_URL` | [`DEFAULT_TOKEN_URL`] |
/// | `api_url` | `SPOTIFY_API_URL` | [`DEFAULT_API_URL`] |
#[derive(Debug, Clone)]
pub struct Settings {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub cache_path: PathBuf,
    pub server_addr: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
}

/// The subset of [`Settings`] needed to obtain and refresh tokens.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: Option<String>,
    pub redirect_uri: String,
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
}

impl Settings {
    /// Reads settings from the process environment.
    ///
    /// Call [`load_env`] first if values from the `.env` file should apply.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup.
    ///
    /// Values are trimmed, and blank values count as unset so that an empty
    /// line in `.env` falls back to the default instead of producing an
    /// unusable setting. A trailing slash on the API base URL is dropped.
    ///
    /// # Arguments
    ///
    /// * `lookup` - Returns the raw value for a variable name, or `None`
    ///
    /// # Returns
    ///
    /// Settings with defaults filled in. This never fails; a missing client
    /// id is only reported by [`Settings::credentials`].
    ///
    /// # Example
    ///
    /// ```
    /// use std::collections::HashMap;
    ///
    /// let vars = HashMap::from([("SPOTIFY_CLIENT_ID", "abc")]);
    /// let settings = Settings::from_lookup(|key| vars.get(key).map(|v| v.to_string()));
    /// assert_eq!(settings.client_id.as_deref(), Some("abc"));
    /// ```
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let or = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        Self {
            client_id: get("SPOTIFY_CLIENT_ID"),
            client_secret: get("SPOTIFY_CLIENT_SECRET"),
            redirect_uri: or("SPOTIFY_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            cache_path: get("SPOTIFY_CACHE_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| data_dir().join("cache/token.json")),
            server_addr: or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            scope: or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: or("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
        }
    }

    /// Returns the OAuth credentials used by the authorization flow.
    ///
    /// # Returns
    ///
    /// The client id and secret together with the redirect URI, scope and
    /// accounts service endpoints.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Authentication`] when `SPOTIFY_CLIENT_ID` is unset or
    /// blank. This surfaces on the first command that needs Spotify, so
    /// commands like `genres` work without any configuration.
    pub fn credentials(&self) -> Result<Credentials> {
        let client_id = self.client_id.clone().ok_or_else(|| {
            Error::Authentication("SPOTIFY_CLIENT_ID is not set".to_string())
        })?;

        Ok(Credentials {
            client_id,
            client_secret: self.client_secret.clone(),
            redirect_uri: self.redirect_uri.clone(),
            scope: self.scope.clone(),
            auth_url: self.auth_url.clone(),
            token_url: self.token_url.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn settings(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults_apply_when_unset() {
        let s = settings(&[]);
        assert_eq!(s.redirect_uri, DEFAULT_REDIRECT_URI);
        assert_eq!(s.server_addr, DEFAULT_SERVER_ADDRESS);
        assert_eq!(s.api_url, DEFAULT_API_URL);
        assert!(s.cache_path.ends_with("genrelist/cache/token.json"));
        assert!(s.client_secret.is_none());
    }

    #[test]
    fn missing_client_id_is_an_authentication_error() {
        let err = settings(&[("SPOTIFY_CLIENT_ID", "   ")])
            .credentials()
            .unwrap_err();
        assert!(err.is_authentication());
    }

    #[test]
    fn explicit_values_override_defaults() {
        let s = settings(&[
            ("SPOTIFY_CLIENT_ID", "abc"),
            ("SPOTIFY_CLIENT_SECRET", "shh"),
            ("SPOTIFY_CACHE_PATH", "/tmp/token.json"),
            ("SPOTIFY_API_URL", "http://localhost:9000/v1/"),
        ]);
        let creds = s.credentials().unwrap();
        assert_eq!(creds.client_id, "abc");
        assert_eq!(creds.client_secret.as_deref(), Some("shh"));
        assert_eq!(s.cache_path, PathBuf::from("/tmp/token.json"));
        assert_eq!(s.api_url, "http://localhost:9000/v1");
    }
}
