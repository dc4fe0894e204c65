use crate::{
    config::Settings, error, info,
    spotify::{Catalog, SpotifyClient},
    success,
};

/// Authenticates and reports who we are logged in as.
///
/// With `force`, the cached token is ignored and the browser flow runs again.
pub async fn auth(settings: Settings, force: bool) {
    let client = SpotifyClient::new(settings);
    info!("Starting authentication...");

    let session = if force {
        client.authenticate_fresh().await
    } else {
        client.authenticate().await
    };
    let session = match session {
        Ok(s) => s,
        Err(e) => error!("{}", e),
    };

    match session.current_user().await {
        Ok(user) => success!("Authenticated as {}", user.label()),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

pub async fn whoami(settings: Settings) {
    let cache_path = settings.cache_path.clone();
    let session = match SpotifyClient::new(settings).authenticate().await {
        Ok(s) => s,
        Err(e) => error!("{}\nRun genrelist auth --force.", e),
    };

    match session.current_user().await {
        Ok(user) => {
            info!("User id: {}", user.id);
            info!("Display name: {}", user.display_name.as_deref().unwrap_or("-"));
            info!("Token cache: {}", cache_path.display());
        }
        Err(e) => error!("Failed to load current user: {}", e),
    }
}
