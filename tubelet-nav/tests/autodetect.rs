mod common;

use common::{BASE, RecordingHost};
use serde_json::json;
use tempfile::TempDir;
use tubelet_common::Msg;
use tubelet_config::Settings;
use tubelet_nav::autodetect::{PROBE_VIDEO_ID, instance_autodetect};
use tubelet_nav::{INSTANCE_URL_KEY, NavError, Navigator};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn probe_path(prefix: &str) -> String {
    format!("/{prefix}/api/v1/videos/{PROBE_VIDEO_ID}")
}

async fn mount_directory(server: &MockServer, entries: serde_json::Value) -> String {
    Mock::given(method("GET"))
        .and(path("/instances.json"))
        .and(query_param("sort_by", "type,health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
    format!("{}/instances.json?sort_by=type,health", server.uri())
}

async fn mount_probe(server: &MockServer, prefix: &str, status: u16, expected: u64) {
    Mock::given(method("GET"))
        .and(path(probe_path(prefix)))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({"title": "probe"})))
        .expect(expected)
        .mount(server)
        .await;
}

fn auto_settings(directory: &str, profile: &std::path::Path) -> Settings {
    Settings {
        instance_url: None,
        auto_instance: true,
        instance_directory_url: directory.to_string(),
        profile_dir: Some(profile.to_path_buf()),
        request_timeout_secs: 1,
        ..Settings::default()
    }
}

#[tokio::test]
async fn first_https_api_instance_that_answers_wins() {
    common::init_test_tracing();
    let server = MockServer::start().await;
    let uri = server.uri();
    let directory = mount_directory(
        &server,
        json!([
            ["one", {"type": "http", "api": true, "uri": format!("{uri}/one")}],
            ["two", {"type": "https", "api": false, "uri": format!("{uri}/two")}],
            ["broken", {"type": "https", "api": true, "uri": format!("{uri}/broken")}],
            "not a pair",
            ["three", {"type": "https", "api": true, "uri": format!("{uri}/three")}],
            ["four", {"type": "https", "api": true, "uri": format!("{uri}/four")}]
        ]),
    )
    .await;
    mount_probe(&server, "one", 200, 0).await;
    mount_probe(&server, "two", 200, 0).await;
    mount_probe(&server, "broken", 429, 1).await;
    mount_probe(&server, "three", 200, 1).await;
    mount_probe(&server, "four", 200, 0).await;

    let picked = instance_autodetect(&directory, std::time::Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(picked, format!("{uri}/three"));
}

#[tokio::test]
async fn null_api_flag_is_accepted() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let directory = mount_directory(
        &server,
        json!([["maybe", {"type": "https", "api": null, "uri": format!("{uri}/maybe")}]]),
    )
    .await;
    mount_probe(&server, "maybe", 200, 1).await;

    let picked = instance_autodetect(&directory, std::time::Duration::from_secs(1))
        .await
        .unwrap();
    assert_eq!(picked, format!("{uri}/maybe"));
}

#[tokio::test]
async fn detected_instance_is_stored_and_used_without_credentials() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let directory = mount_directory(
        &server,
        json!([["solo", {"type": "https", "api": true, "uri": format!("{uri}/solo")}]]),
    )
    .await;
    mount_probe(&server, "solo", 200, 1).await;
    let tmp = TempDir::new().unwrap();
    let settings = Settings {
        instance_username: Some("me@example.org".into()),
        instance_password: Some("secret".into()),
        ..auto_settings(&directory, tmp.path())
    };

    let mut host = RecordingHost::default();
    let nav = Navigator::init(&settings, BASE, 1, &mut host).await.unwrap();
    assert_eq!(nav.api().instance_url(), format!("{uri}/solo/"));
    assert!(!nav.api().has_credentials());
    drop(nav);

    assert_eq!(
        host.stored,
        vec![(INSTANCE_URL_KEY.to_string(), format!("{uri}/solo"))]
    );
}

#[tokio::test]
async fn persisted_auto_instance_still_gets_no_credentials() {
    let tmp = TempDir::new().unwrap();
    let settings = Settings {
        instance_url: Some("https://picked.example.org".into()),
        instance_username: Some("me@example.org".into()),
        ..auto_settings("https://unused.example.org/instances.json", tmp.path())
    };
    let mut host = RecordingHost::default();
    let nav = Navigator::init(&settings, BASE, 1, &mut host).await.unwrap();
    assert!(!nav.api().has_credentials());
    drop(nav);
    assert!(host.stored.is_empty());
}

#[tokio::test]
async fn no_working_instance_notifies_and_aborts() {
    let server = MockServer::start().await;
    let uri = server.uri();
    let directory = mount_directory(
        &server,
        json!([
            ["down", {"type": "https", "api": true, "uri": format!("{uri}/down")}],
            ["onion", {"type": "onion", "api": true, "uri": format!("{uri}/onion")}]
        ]),
    )
    .await;
    mount_probe(&server, "down", 500, 1).await;
    let tmp = TempDir::new().unwrap();

    let mut host = RecordingHost::default();
    let result = Navigator::init(&auto_settings(&directory, tmp.path()), BASE, 1, &mut host)
        .await
        .map(|_| ());

    assert!(matches!(result, Err(NavError::AutodetectionFailed)));
    assert_eq!(host.notifications.len(), 1);
    assert_eq!(host.notifications[0].0, Msg::AutodetectFailedTitle.fallback());
    assert_eq!(host.notifications[0].1, Msg::AutodetectFailedMessage.fallback());
    assert!(host.stored.is_empty());
}

#[tokio::test]
async fn unreachable_directory_counts_as_failed_detection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/instances.json"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let result = instance_autodetect(
        &format!("{}/instances.json", server.uri()),
        std::time::Duration::from_secs(1),
    )
    .await;
    assert!(matches!(result, Err(NavError::AutodetectionFailed)));
}

#[tokio::test]
async fn missing_instance_without_autodetect_is_a_config_error() {
    let tmp = TempDir::new().unwrap();
    let settings = Settings {
        auto_instance: false,
        ..auto_settings("https://unused.example.org/", tmp.path())
    };
    let mut host = RecordingHost::default();
    let result = Navigator::init(&settings, BASE, 1, &mut host).await.map(|_| ());
    assert!(matches!(result, Err(NavError::NoServerConfigured)));
    assert!(host.untouched());
}
