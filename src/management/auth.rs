use std::path::{Path, PathBuf};

use reqwest::Client;

use crate::{
    config::Credentials,
    error::{Error, Result},
    spotify, types::Token, utils,
};

/// Seconds before expiry at which a token is refreshed.
const EXPIRY_MARGIN_SECS: u64 = 240;

/// Owns the OAuth token and its on-disk cache file.
#[derive(Debug)]
pub struct TokenManager {
    token: Token,
    path: PathBuf,
}

impl TokenManager {
    pub fn new(token: Token, path: impl Into<PathBuf>) -> Self {
        TokenManager {
            token,
            path: path.into(),
        }
    }

    pub async fn load(path: impl AsRef<Path>) -> std::result::Result<Self, String> {
        let path = path.as_ref();
        let content = async_fs::read_to_string(path)
            .await
            .map_err(|e| e.to_string())?;
        let token: Token = serde_json::from_str(&content).map_err(|e| e.to_string())?;
        Ok(Self {
            token,
            path: path.to_path_buf(),
        })
    }

    pub async fn persist(&self) -> std::result::Result<(), String> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent)
                .await
                .map_err(|e| e.to_string())?;
        }

        let json = serde_json::to_string_pretty(&self.token).map_err(|e| e.to_string())?;
        async_fs::write(&self.path, json)
            .await
            .map_err(|e| e.to_string())
    }

    /// Returns an access token, refreshing and re-persisting it when it is about
    /// to expire.
    pub async fn get_valid_token(&mut self, http: &Client, creds: &Credentials) -> Result<String> {
        if self.is_expired() {
            if self.token.refresh_token.is_empty() {
                return Err(Error::Authentication(
                    "token expired and no refresh token is cached".to_string(),
                ));
            }
            let fresh = spotify::auth::refresh_token(http, creds, &self.token.refresh_token).await?;
            self.token = fresh;
            if let Err(e) = self.persist().await {
                tracing::warn!(error = %e, "failed to persist refreshed token");
            }
        }

        Ok(self.token.access_token.clone())
    }

    pub fn is_expired(&self) -> bool {
        let expires_at = self.token.obtained_at + self.token.expires_in;
        utils::now_secs() >= expires_at.saturating_sub(EXPIRY_MARGIN_SECS)
    }

    pub fn current_token(&self) -> &Token {
        &self.token
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
