use std::{collections::HashMap, sync::Arc};

use axum::{Extension, extract::Query, response::Html};
use reqwest::Client;
use tokio::sync::Mutex;

use crate::{config::Credentials, error::Error, spotify, types::PkceToken, warning};

/// State shared between the authorization flow and the callback handler.
#[derive(Clone)]
pub struct CallbackState {
    pub pkce: Arc<Mutex<Option<PkceToken>>>,
    pub http: Client,
    pub creds: Credentials,
}

pub async fn callback(
    Query(params): Query<HashMap<String, String>>,
    Extension(state): Extension<CallbackState>,
) -> Html<&'static str> {
    let mut lock = state.pkce.lock().await;
    let Some(pkce_state) = lock.as_mut() else {
        return Html("<h4>Missing PKCE code verifier.</h4>");
    };

    if let Some(error) = params.get("error") {
        pkce_state.error = Some(format!("authorization denied: {}", error));
        return Html("<h4>Login was cancelled.</h4>");
    }

    let Some(code) = params.get("code") else {
        return Html("<h4>Missing authorization code.</h4>");
    };

    let verifier = pkce_state.code_verifier.clone();
    match spotify::auth::exchange_code_pkce(&state.http, &state.creds, code, &verifier).await {
        Ok(token) => {
            pkce_state.token = Some(token);
            Html("<h2>Authentication successful.</h2><p>You can close this browser window.</p>")
        }
        Err(e) => {
            warning!("Token exchange failed: {}", e);
            pkce_state.error = Some(match e {
                Error::Authentication(msg) => msg,
                other => other.to_string(),
            });
            Html("<h4>Login failed.</h4>")
        }
    }
}
