//! OAuth 2.0 authorization code flow with PKCE against the Spotify accounts
//! service, plus token refresh.

use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::{
    api::CallbackState,
    config::Credentials,
    error::{Error, Result},
    server,
    types::{PkceToken, Token, TokenResponse},
    utils, warning,
};

/// How long to wait for the browser to hit the callback.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(60);

/// Runs the OAuth 2.0 PKCE browser flow and returns a fresh token.
///
/// The flow goes through these steps:
/// 1. Generate a PKCE code verifier and its SHA256 code challenge
/// 2. Bind the local callback server on `server_addr`
/// 3. Open the Spotify authorization URL in the default browser
/// 4. Wait for the callback handler to exchange the code for a token
/// 5. Shut the callback server down again
///
/// The server is bound before the browser opens, so a port clash fails
/// before the user is sent anywhere. The token is not persisted here; that is
/// left to the caller.
///
/// # Arguments
///
/// * `http` - HTTP client used for the code exchange
/// * `creds` - OAuth credentials and endpoints
/// * `server_addr` - Address the callback server binds to, e.g. `127.0.0.1:8888`
///
/// # Returns
///
/// The token issued by the accounts service, stamped with the time it was
/// obtained.
///
/// # Errors
///
/// Returns [`Error::Authentication`] if:
/// - The callback server cannot bind to `server_addr`
/// - The user denies access or the code exchange fails
/// - No callback arrives within 60 seconds
///
/// A browser that fails to open only produces a warning with the URL to
/// visit manually.
///
/// # Example
///
/// ```
/// let settings = Settings::from_env();
/// let creds = settings.credentials()?;
/// let token = authorize(&Client::new(), &creds, &settings.server_addr).await?;
/// ```
pub async fn authorize(http: &Client, creds: &Credentials, server_addr: &str) -> Result<Token> {
    let code_verifier = utils::generate_code_verifier();
    let code_challenge = utils::generate_code_challenge(&code_verifier);

    let shared_state = Arc::new(Mutex::new(Some(PkceToken {
        code_verifier,
        token: None,
        error: None,
    })));

    let listener = server::bind(server_addr).await?;
    let state = CallbackState {
        pkce: Arc::clone(&shared_state),
        http: http.clone(),
        creds: creds.clone(),
    };
    let server = tokio::spawn(server::serve(listener, state));

    let auth_url = authorize_url(creds, &code_challenge)?;
    if webbrowser::open(auth_url.as_str()).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            auth_url
        )
    }

    let outcome = wait_for_token(&shared_state).await;
    server.abort();
    outcome
}

/// Builds the authorization URL the user is sent to.
///
/// All query values are percent-encoded, so scopes containing spaces and
/// redirect URIs with their own query strings survive intact.
///
/// # Errors
///
/// Returns [`Error::Authentication`] if the configured authorization endpoint
/// is not a valid URL.
pub fn authorize_url(creds: &Credentials, code_challenge: &str) -> Result<Url> {
    Url::parse_with_params(
        &creds.auth_url,
        &[
            ("client_id", creds.client_id.as_str()),
            ("response_type", "code"),
            ("redirect_uri", creds.redirect_uri.as_str()),
            ("code_challenge", code_challenge),
            ("code_challenge_method", "S256"),
            ("scope", creds.scope.as_str()),
        ],
    )
    .map_err(|e| Error::Authentication(format!("invalid authorize url: {}", e)))
}

/// Polls the shared PKCE state until the callback stores a token or an error.
async fn wait_for_token(shared_state: &Mutex<Option<PkceToken>>) -> Result<Token> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < CALLBACK_TIMEOUT {
        {
            let lock = shared_state.lock().await;
            if let Some(pkce_token) = lock.as_ref() {
                if let Some(token) = &pkce_token.token {
                    return Ok(token.clone());
                }
                if let Some(error) = &pkce_token.error {
                    return Err(Error::Authentication(error.clone()));
                }
            }
        }
        tokio::time::sleep(Duration::from_millis(500)).await;
    }

    Err(Error::Authentication(
        "timed out waiting for the authorization callback".to_string(),
    ))
}

/// Exchanges an authorization code for an access token.
///
/// Called by the callback handler once Spotify redirects back with a `code`.
/// The verifier proves that the same client started the flow. When a client
/// secret is configured it is sent as HTTP basic auth.
///
/// # Arguments
///
/// * `http` - HTTP client used for the request
/// * `creds` - OAuth credentials and the token endpoint
/// * `code` - Authorization code from the callback query
/// * `verifier` - PKCE code verifier generated when the flow started
///
/// # Returns
///
/// A new [`Token`]. A missing `refresh_token` in the response is stored as an
/// empty string, which makes later refreshes fail and forces a new browser
/// flow.
///
/// # Errors
///
/// Returns [`Error::Authentication`] if the request cannot be sent, the token
/// endpoint answers with a non-success status, or the response body is not a
/// valid token response.
pub async fn exchange_code_pkce(
    http: &Client,
    creds: &Credentials,
    code: &str,
    verifier: &str,
) -> Result<Token> {
    let res = request_token(
        http,
        creds,
        &[
            ("grant_type", "authorization_code"),
            ("client_id", creds.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", creds.redirect_uri.as_str()),
        ],
    )
    .await?;

    let refresh_token = res.refresh_token.clone().unwrap_or_default();
    Ok(into_token(res, refresh_token))
}

/// Obtains a new access token using a refresh token.
///
/// Used by [`crate::management::TokenManager`] when the cached token is about
/// to expire.
///
/// # Arguments
///
/// * `http` - HTTP client used for the request
/// * `creds` - OAuth credentials and the token endpoint
/// * `refresh_token` - Refresh token from the cached token
///
/// # Returns
///
/// The refreshed [`Token`]. If Spotify does not rotate the refresh token, the
/// one passed in is kept.
///
/// # Errors
///
/// Returns [`Error::Authentication`] if the refresh is rejected (for example
/// because the refresh token was revoked) or the response cannot be parsed.
///
/// # Example
///
/// ```
/// let fresh = refresh_token(&http, &creds, &cached.refresh_token).await?;
/// assert!(fresh.expires_in > 0);
/// ```
pub async fn refresh_token(http: &Client, creds: &Credentials, refresh_token: &str) -> Result<Token> {
    let res = request_token(
        http,
        creds,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", creds.client_id.as_str()),
        ],
    )
    .await?;

    // Spotify may omit the refresh token, in which case the old one stays valid.
    let next_refresh = res
        .refresh_token
        .clone()
        .unwrap_or_else(|| refresh_token.to_string());
    Ok(into_token(res, next_refresh))
}

/// Posts a form to the token endpoint; every failure is an authentication error.
async fn request_token(
    http: &Client,
    creds: &Credentials,
    form: &[(&str, &str)],
) -> Result<TokenResponse> {
    let mut request = http.post(&creds.token_url).form(form);
    if let Some(secret) = &creds.client_secret {
        request = request.basic_auth(&creds.client_id, Some(secret));
    }

    let res = request
        .send()
        .await
        .map_err(|e| Error::Authentication(e.to_string()))?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(Error::Authentication(format!(
            "token endpoint returned {}: {}",
            status,
            body.trim()
        )));
    }

    res.json::<TokenResponse>()
        .await
        .map_err(|e| Error::Authentication(format!("malformed token response: {}", e)))
}

fn into_token(res: TokenResponse, refresh_token: String) -> Token {
    Token {
        access_token: res.access_token,
        refresh_token,
        scope: res.scope.unwrap_or_default(),
        expires_in: res.expires_in.unwrap_or(3600),
        obtained_at: utils::now_secs(),
    }
}
