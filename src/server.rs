use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr};
use tokio::net::TcpListener;

use crate::{
    api::{self, CallbackState},
    error::{Error, Result},
};

/// Binds the callback listener on `addr` (e.g. `127.0.0.1:8888`).
pub async fn bind(addr: &str) -> Result<TcpListener> {
    let addr = SocketAddr::from_str(addr).map_err(|e| {
        Error::Authentication(format!("failed to parse server address {}: {}", addr, e))
    })?;

    TcpListener::bind(&addr)
        .await
        .map_err(|e| Error::Authentication(format!("failed to bind {}: {}", addr, e)))
}

pub fn router(state: CallbackState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/callback", get(api::callback).layer(Extension(state)))
}

/// Serves the OAuth callback routes until the task is aborted.
pub async fn serve(listener: TcpListener, state: CallbackState) {
    if let Err(e) = axum::serve(listener, router(state)).await {
        tracing::warn!(error = %e, "callback server stopped");
    }
}
