//! Integration tests for the HTTP code source
//!
//! A local wiremock server stands in for the code rendering service and for
//! short-link redirects. The server runs on its own thread, so the blocking
//! client is driven from the plain test thread.

mod common;

use common::{code_png, TRACK_ID};
use spotify_keychain::barcode::{CodeSource, HttpCodeSource};
use spotify_keychain::config::GeneratorConfig;
use spotify_keychain::types::{EntityKind, SpotifyLink};
use spotify_keychain::KeychainError;
use tokio::runtime::Runtime;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn source_for(server: &MockServer) -> HttpCodeSource {
    let config = GeneratorConfig {
        endpoint: format!("{}/downloadCode.php", server.uri()),
        ..GeneratorConfig::default()
    };
    HttpCodeSource::new(&config).unwrap()
}

fn track() -> SpotifyLink {
    SpotifyLink::new(EntityKind::Track, TRACK_ID)
}

#[test]
fn test_error_status_is_download_error() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloadCode.php"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        server
    });

    let result = source_for(&server).fetch(&track());
    assert!(matches!(result, Err(KeychainError::Download { status: 404 })));
}

#[test]
fn test_success_returns_image_bytes() {
    let rt = runtime();
    let body = code_png();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/downloadCode.php"))
            .and(query_param(
                "uri",
                format!("jpeg/000000/white/640/spotify:track:{}", TRACK_ID),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body.clone()))
            .mount(&server)
            .await;
        server
    });

    let bytes = source_for(&server).fetch(&track()).unwrap();
    assert_eq!(bytes, body);
}

#[test]
fn test_short_link_follows_redirect_to_landing_page() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/abc123"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("Location", format!("{}/landing", server.uri()).as_str()),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/landing"))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                r#"<html><head><meta property="og:url" content="https://open.spotify.com/track/{}"></head></html>"#,
                TRACK_ID
            )))
            .mount(&server)
            .await;
        server
    });

    let link = source_for(&server)
        .resolve(&format!("{}/abc123", server.uri()))
        .unwrap();
    assert_eq!(link, track());
}

#[test]
fn test_short_link_without_target_is_invalid() {
    let rt = runtime();
    let server = rt.block_on(async {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/dead"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>Page not found</html>"))
            .mount(&server)
            .await;
        server
    });

    let result = source_for(&server).resolve(&format!("{}/dead", server.uri()));
    assert!(matches!(result, Err(KeychainError::InvalidLink(_))));
}
