//! HTTP-level tests for the Spotify session, run against a mock server.

use genrelist::{
    config::Credentials,
    error::Error,
    management::TokenManager,
    spotify::{Catalog, Session},
    types::Token,
    utils,
};
use reqwest::Client;
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials(server: &MockServer) -> Credentials {
    Credentials {
        client_id: "client".to_string(),
        client_secret: None,
        redirect_uri: "http://127.0.0.1:8888/callback".to_string(),
        scope: "playlist-modify-public".to_string(),
        auth_url: format!("{}/authorize", server.uri()),
        token_url: format!("{}/api/token", server.uri()),
    }
}

fn session(server: &MockServer) -> Session {
    let token = Token {
        access_token: "test-token".to_string(),
        refresh_token: "refresh".to_string(),
        scope: "playlist-modify-public".to_string(),
        expires_in: 3600,
        obtained_at: utils::now_secs(),
    };
    let tokens = TokenManager::new(token, std::env::temp_dir().join("genrelist-test-token.json"));
    Session::new(Client::new(), server.uri(), credentials(server), tokens)
}

async fn mount_me(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/me"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "me", "display_name": "Me"})),
        )
        .expect(1)
        .mount(server)
        .await;
}

fn playlist_json(id: &str, name: &str, owner: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "external_urls": {"spotify": format!("https://open.spotify.com/playlist/{}", id)},
        "owner": {"id": owner}
    })
}

#[tokio::test]
async fn current_user_is_fetched_once() {
    let server = MockServer::start().await;
    mount_me(&server).await;
    let session = session(&server);

    let first = session.current_user().await.unwrap();
    let second = session.current_user().await.unwrap();

    assert_eq!(first.id, "me");
    assert_eq!(first, second);
    assert_eq!(first.label(), "Me");
}

#[tokio::test]
async fn list_user_playlists_follows_pages_and_keeps_owned_ones() {
    let server = MockServer::start().await;
    mount_me(&server).await;

    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("offset", "0"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                playlist_json("p1", "Road Trip", "me"),
                playlist_json("p2", "Followed", "someone-else")
            ],
            "next": format!("{}/me/playlists?limit=50&offset=50", server.uri())
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me/playlists"))
        .and(query_param("offset", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [playlist_json("p3", "Chill", "me")],
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let playlists = session(&server).list_user_playlists().await.unwrap();

    let ids: Vec<&str> = playlists.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["p1", "p3"]);
    assert_eq!(
        playlists[0].url.as_deref(),
        Some("https://open.spotify.com/playlist/p1")
    );
}

#[tokio::test]
async fn list_playlist_track_uris_skips_missing_tracks() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/playlists/pl/tracks"))
        .and(query_param("offset", "0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                {"track": {"uri": "spotify:track:1"}},
                {"track": null},
                {"track": {"uri": null}}
            ],
            "next": format!("{}/playlists/pl/tracks?limit=100&offset=100", server.uri())
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/playlists/pl/tracks"))
        .and(query_param("offset", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{"track": {"uri": "spotify:track:2"}}],
            "next": null
        })))
        .mount(&server)
        .await;

    let uris = session(&server).list_playlist_track_uris("pl").await.unwrap();

    assert_eq!(uris, vec!["spotify:track:1", "spotify:track:2"]);
}

#[tokio::test]
async fn add_track_uris_sends_batches_of_100_in_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/playlists/pl/tracks"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"snapshot_id": "snap"})))
        .expect(3)
        .mount(&server)
        .await;

    let uris: Vec<String> = (0..250).map(|i| format!("spotify:track:{}", i)).collect();
    session(&server).add_track_uris("pl", &uris).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let batches: Vec<Vec<String>> = requests
        .iter()
        .map(|r| {
            let body: Value = serde_json::from_slice(&r.body).unwrap();
            serde_json::from_value(body["uris"].clone()).unwrap()
        })
        .collect();

    let sizes: Vec<usize> = batches.iter().map(Vec::len).collect();
    assert_eq!(sizes, vec![100, 100, 50]);
    assert_eq!(batches.concat(), uris);
}

#[tokio::test]
async fn add_track_uris_with_nothing_to_add_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"snapshot_id": "snap"})))
        .expect(0)
        .mount(&server)
        .await;

    session(&server).add_track_uris("pl", &[]).await.unwrap();
}

#[tokio::test]
async fn search_tracks_caps_limit_and_maps_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "genre:rock"))
        .and(query_param("type", "track"))
        .and(query_param("limit", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "tracks": {
                "items": [
                    {
                        "uri": "spotify:track:a",
                        "name": "Song A",
                        "popularity": 72,
                        "artists": [{"name": "One"}, {"name": "Two"}]
                    },
                    null,
                    {"uri": "spotify:track:b", "name": "Song B", "artists": []}
                ]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let tracks = session(&server)
        .search_tracks("genre:rock", 500)
        .await
        .unwrap();

    assert_eq!(tracks.len(), 2);
    assert_eq!(tracks[0].uri, "spotify:track:a");
    assert_eq!(tracks[0].popularity, 72);
    assert_eq!(tracks[0].artists, vec!["One", "Two"]);
    assert_eq!(tracks[1].popularity, 0);
}

#[tokio::test]
async fn create_playlist_posts_settings_for_owner() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/users/me/playlists"))
        .respond_with(ResponseTemplate::new(201).set_body_json(playlist_json("new", "Road Trip", "me")))
        .expect(1)
        .mount(&server)
        .await;

    let created = session(&server)
        .create_playlist("me", "Road Trip", false, "Auto playlist: rock")
        .await
        .unwrap();
    assert_eq!(created.id, "new");

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["name"], "Road Trip");
    assert_eq!(body["public"], false);
    assert_eq!(body["description"], "Auto playlist: rock");
}

#[tokio::test]
async fn error_status_becomes_remote_service_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .expect(1)
        .mount(&server)
        .await;

    let err = session(&server).search_tracks("rock", 10).await.unwrap_err();

    match err {
        Error::RemoteService(msg) => assert!(msg.contains("502"), "{}", msg),
        other => panic!("expected RemoteService, got {:?}", other),
    }
}

#[tokio::test]
async fn expired_token_is_refreshed_before_the_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "fresh-token",
            "scope": "playlist-modify-public",
            "expires_in": 3600
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/me"))
        .and(header("authorization", "Bearer fresh-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "me"})))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let cache = dir.path().join("token.json");
    let stale = Token {
        access_token: "stale".to_string(),
        refresh_token: "refresh".to_string(),
        scope: String::new(),
        expires_in: 3600,
        obtained_at: utils::now_secs() - 7200,
    };
    let session = Session::new(
        Client::new(),
        server.uri(),
        credentials(&server),
        TokenManager::new(stale, &cache),
    );

    let user = session.current_user().await.unwrap();
    assert_eq!(user.label(), "me");

    let cached = TokenManager::load(&cache).await.unwrap();
    assert_eq!(cached.current_token().access_token, "fresh-token");
    assert_eq!(cached.current_token().refresh_token, "refresh");
}
