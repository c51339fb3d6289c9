//! Server Discovery Tests
//!
//! Tests the server-list endpoint against a mock provider.

use aniresolve::error::ErrorKind;
use aniresolve::models::{AudioKind, DiagnosticKind, EpisodeRef};
use aniresolve::ProviderClient;
use mockito::{Matcher, Server};
use serde_json::json;

// =============================================================================
// Fixtures
// =============================================================================

fn server_list_html() -> String {
    r#"<div class="ps_-block ps_-block-sub servers-sub">
        <div class="ps__-list">
            <div class="item server-item" data-type="sub" data-id="612345" data-server-id="4"><a href="javascript:;" class="btn">VidStreaming</a></div>
            <div class="item server-item" data-type="sub" data-id="612346" data-server-id="1"><a href="javascript:;" class="btn">MegaCloud</a></div>
        </div>
    </div>
    <div class="ps_-block ps_-block-sub servers-dub">
        <div class="ps__-list">
            <div class="item server-item" data-type="dub" data-id="612400" data-server-id="4"><a href="javascript:;" class="btn">VidStreaming</a></div>
        </div>
    </div>"#
        .to_string()
}

fn envelope(status: bool, html: &str) -> String {
    json!({ "status": status, "html": html }).to_string()
}

async fn mock_servers(server: &mut Server, episode_id: &str, body: String) -> mockito::Mock {
    server
        .mock("GET", "/ajax/v2/episode/servers")
        .match_query(Matcher::UrlEncoded("episodeId".into(), episode_id.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(body)
        .create_async()
        .await
}

// =============================================================================
// Discovery
// =============================================================================

/// Test: SUB servers are listed in page order
#[tokio::test]
async fn test_discover_sub_servers() {
    let mut server = Server::new_async().await;
    let mock = mock_servers(&mut server, "2142", envelope(true, &server_list_html())).await;

    let client = ProviderClient::with_base_url(server.url());
    let list = client
        .discover_servers(&EpisodeRef::new("2142"), false)
        .await
        .unwrap();

    mock.assert_async().await;

    assert_eq!(list.servers.len(), 2);
    assert_eq!(list.servers[0].id, "612345");
    assert_eq!(list.servers[0].display_name, "VidStreaming");
    assert_eq!(list.servers[1].display_name, "MegaCloud");
    assert!(list.servers.iter().all(|s| s.kind == AudioKind::Sub));
    assert!(list.skipped.is_empty());
}

/// Test: DUB servers follow SUB servers when requested
#[tokio::test]
async fn test_discover_includes_dub() {
    let mut server = Server::new_async().await;
    let _mock = mock_servers(&mut server, "2142", envelope(true, &server_list_html())).await;

    let client = ProviderClient::with_base_url(server.url());
    let list = client
        .discover_servers(&EpisodeRef::new("2142"), true)
        .await
        .unwrap();

    let kinds: Vec<AudioKind> = list.servers.iter().map(|s| s.kind).collect();
    assert_eq!(kinds, vec![AudioKind::Sub, AudioKind::Sub, AudioKind::Dub]);
    assert_eq!(list.servers[2].id, "612400");
}

/// Test: a watch URL resolves to the id after `ep=`
#[tokio::test]
async fn test_discover_from_watch_url() {
    let mut server = Server::new_async().await;
    let mock = mock_servers(&mut server, "2142", envelope(true, &server_list_html())).await;

    let client = ProviderClient::with_base_url(server.url());
    let episode = EpisodeRef::new("/watch/one-piece-100?ep=2142");
    let list = client.discover_servers(&episode, false).await.unwrap();

    mock.assert_async().await;
    assert_eq!(list.servers.len(), 2);
}

/// Test: server items without an id are reported, not fatal
#[tokio::test]
async fn test_missing_ids_are_skipped() {
    let html = r#"<div class="servers-sub">
        <div class="item" data-id=""><a>Ghost</a></div>
        <div class="item" data-id="7"><a>HD-1</a></div>
    </div>"#;

    let mut server = Server::new_async().await;
    let _mock = mock_servers(&mut server, "99", envelope(true, html)).await;

    let client = ProviderClient::with_base_url(server.url());
    let list = client
        .discover_servers(&EpisodeRef::new("99"), false)
        .await
        .unwrap();

    assert_eq!(list.servers.len(), 1);
    assert_eq!(list.servers[0].display_name, "HD-1");
    assert_eq!(list.skipped.len(), 1);
    assert_eq!(list.skipped[0].kind, DiagnosticKind::MissingServerId);
}

// =============================================================================
// Failures
// =============================================================================

/// Test: `status: false` means the episode is unknown
#[tokio::test]
async fn test_status_false_is_not_found() {
    let mut server = Server::new_async().await;
    let _mock = mock_servers(&mut server, "2142", envelope(false, "")).await;

    let client = ProviderClient::with_base_url(server.url());
    let err = client
        .discover_servers(&EpisodeRef::new("2142"), false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

/// Test: no request is made when no id can be derived
#[tokio::test]
async fn test_underivable_id_is_not_found() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/ajax/v2/episode/servers")
        .match_query(Matcher::Any)
        .expect(0)
        .create_async()
        .await;

    let client = ProviderClient::with_base_url(server.url());
    let err = client
        .discover_servers(&EpisodeRef::new("/watch/one-piece-100?ep="), false)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::NotFound);
    mock.assert_async().await;
}

/// Test: a non-JSON body is a decode error
#[tokio::test]
async fn test_html_body_is_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = mock_servers(
        &mut server,
        "2142",
        "<html><body>Cloudflare</body></html>".to_string(),
    )
    .await;

    let client = ProviderClient::with_base_url(server.url());
    let err = client
        .discover_servers(&EpisodeRef::new("2142"), false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Decode);
}

/// Test: upstream HTTP errors surface as remote errors
#[tokio::test]
async fn test_http_error_is_remote() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/ajax/v2/episode/servers")
        .match_query(Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let client = ProviderClient::with_base_url(server.url());
    let err = client
        .discover_servers(&EpisodeRef::new("2142"), false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Remote);
}
