use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use tempfile::TempDir;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

use takeover_common::TakeoverError;
use takeover_fingerprint::FingerprintStore;
use takeover_sync::{SyncConfig, Synchronizer};

const CONTENTS_PATH: &str = "/repos/EdOverflow/can-i-take-over-xyz/contents/fingerprints.json";

const DOCUMENT: &str = r#"[
  {"service": "ServiceA", "fingerprint": "No such app", "vulnerable": true},
  {"service": "ServiceB", "fingerprint": "There isn't a GitHub Pages site here.", "vulnerable": true},
  {"service": "ServiceC", "fingerprint": "NoSuchBucket", "vulnerable": true}
]"#;

fn envelope(document: &[u8]) -> serde_json::Value {
    let encoded = STANDARD.encode(document);
    let wrapped: Vec<&str> = encoded
        .as_bytes()
        .chunks(60)
        .map(|c| std::str::from_utf8(c).unwrap())
        .collect();
    json!({
        "name": "fingerprints.json",
        "path": "fingerprints.json",
        "content": wrapped.join("\n"),
        "encoding": "base64"
    })
}

async fn remote_serving(response: ResponseTemplate) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CONTENTS_PATH))
        .respond_with(response)
        .mount(&server)
        .await;
    server
}

fn synchronizer(server: &MockServer, dir: &TempDir) -> Synchronizer {
    let config = SyncConfig::default()
        .with_remote_url(format!("{}{}", server.uri(), CONTENTS_PATH))
        .with_config_dir(dir.path());
    Synchronizer::new(config).unwrap()
}

#[tokio::test]
async fn fetch_decodes_wrapped_base64() {
    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();

    let bytes = synchronizer(&server, &dir).fetch_remote_document().await.unwrap();
    assert_eq!(bytes, DOCUMENT.as_bytes());
}

#[tokio::test]
async fn fetch_reports_non_success_status() {
    let server = remote_serving(ResponseTemplate::new(403).set_body_string("rate limited")).await;
    let dir = TempDir::new().unwrap();

    let err = synchronizer(&server, &dir).fetch_remote_document().await.unwrap_err();
    assert!(matches!(err, TakeoverError::Network(_)), "{err:?}");
    assert!(err.to_string().contains("403"));
}

#[tokio::test]
async fn fetch_reports_bad_envelope_and_bad_base64() {
    let dir = TempDir::new().unwrap();

    let server = remote_serving(ResponseTemplate::new(200).set_body_string("<html>")).await;
    let err = synchronizer(&server, &dir).fetch_remote_document().await.unwrap_err();
    assert!(matches!(err, TakeoverError::Decode(_)), "{err:?}");

    let server = remote_serving(
        ResponseTemplate::new(200).set_body_json(json!({ "content": "%%%not-base64%%%" })),
    )
    .await;
    let err = synchronizer(&server, &dir).fetch_remote_document().await.unwrap_err();
    assert!(matches!(err, TakeoverError::Decode(_)), "{err:?}");
}

#[tokio::test]
async fn fetch_reports_unreachable_remote() {
    let dir = TempDir::new().unwrap();
    let config = SyncConfig::default()
        .with_remote_url("http://127.0.0.1:1/contents/fingerprints.json")
        .with_config_dir(dir.path());
    let err = Synchronizer::new(config)
        .unwrap()
        .fetch_remote_document()
        .await
        .unwrap_err();
    assert!(matches!(err, TakeoverError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn fetch_gives_up_after_request_timeout() {
    let server = remote_serving(
        ResponseTemplate::new(200)
            .set_body_json(envelope(DOCUMENT.as_bytes()))
            .set_delay(std::time::Duration::from_secs(3)),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let config = SyncConfig::default()
        .with_remote_url(format!("{}{}", server.uri(), CONTENTS_PATH))
        .with_config_dir(dir.path())
        .with_request_timeout(std::time::Duration::from_millis(200));

    let err = Synchronizer::new(config)
        .unwrap()
        .fetch_remote_document()
        .await
        .unwrap_err();
    assert!(matches!(err, TakeoverError::Network(_)), "{err:?}");
}

#[tokio::test]
async fn download_installs_document_loadable_by_store() {
    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();
    let sync = synchronizer(&server, &dir);

    let local = sync.local_path().unwrap();
    assert!(!local.exists());

    let report = sync.download().await.unwrap();
    assert_eq!(report.path, local);
    assert_eq!(report.bytes, DOCUMENT.len());
    assert_eq!(report.fingerprints, 3);

    let store = FingerprintStore::load(&local).await.unwrap();
    assert_eq!(store.len(), 3);
    assert_eq!(store.all()[0].service, "ServiceA");
    assert_eq!(std::fs::read(&local).unwrap(), DOCUMENT.as_bytes());
}

#[tokio::test]
async fn download_overwrites_existing_file() {
    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();
    let sync = synchronizer(&server, &dir);

    let local = sync.resolve_local_path().await.unwrap();
    std::fs::write(&local, "[]").unwrap();

    sync.download().await.unwrap();
    assert_eq!(std::fs::read_to_string(&local).unwrap(), DOCUMENT);
}

#[tokio::test]
async fn failed_download_keeps_previous_file() {
    let dir = TempDir::new().unwrap();
    let previous = r#"[{"service": "Old", "fingerprint": "old signature"}]"#;

    // decodes fine but is not a fingerprint document
    let server = remote_serving(
        ResponseTemplate::new(200).set_body_json(envelope(br#"{"unexpected": true}"#)),
    )
    .await;
    let sync = synchronizer(&server, &dir);
    let local = sync.resolve_local_path().await.unwrap();
    std::fs::write(&local, previous).unwrap();

    let err = sync.download().await.unwrap_err();
    assert!(matches!(err, TakeoverError::Parse(_)), "{err:?}");
    assert_eq!(std::fs::read_to_string(&local).unwrap(), previous);

    let server = remote_serving(ResponseTemplate::new(500)).await;
    let err = synchronizer(&server, &dir).download().await.unwrap_err();
    assert!(matches!(err, TakeoverError::Network(_)), "{err:?}");
    assert_eq!(std::fs::read_to_string(&local).unwrap(), previous);

    let leftovers = std::fs::read_dir(local.parent().unwrap()).unwrap().count();
    assert_eq!(leftovers, 1);
}

#[tokio::test]
async fn integrity_up_to_date_when_identical() {
    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();
    let sync = synchronizer(&server, &dir);
    sync.download().await.unwrap();

    let result = sync.check_integrity().await.unwrap();
    assert!(result.up_to_date);
    assert_eq!(result.local_digest, result.remote_digest);
    assert_eq!(result.local_digest, takeover_sync::digest(DOCUMENT.as_bytes()));
}

#[tokio::test]
async fn integrity_detects_single_byte_difference() {
    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();
    let sync = synchronizer(&server, &dir);
    let local = sync.resolve_local_path().await.unwrap();

    let mut tampered = DOCUMENT.as_bytes().to_vec();
    let idx = DOCUMENT.find("No such app").unwrap();
    tampered[idx] = b'n';
    std::fs::write(&local, &tampered).unwrap();

    let result = sync.check_integrity().await.unwrap();
    assert!(!result.up_to_date);
    assert_ne!(result.local_digest, result.remote_digest);
}

#[tokio::test]
async fn integrity_check_never_modifies_local_state() {
    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();
    let sync = synchronizer(&server, &dir);
    let local = sync.resolve_local_path().await.unwrap();
    let stale = r#"[{"service": "Old", "fingerprint": "old signature"}]"#;
    std::fs::write(&local, stale).unwrap();

    for _ in 0..3 {
        let result = sync.check_integrity().await.unwrap();
        assert!(!result.up_to_date);
        assert_eq!(std::fs::read_to_string(&local).unwrap(), stale);
    }
    assert_eq!(std::fs::read_dir(local.parent().unwrap()).unwrap().count(), 1);
}

#[tokio::test]
async fn integrity_without_local_file_is_io_error() {
    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();
    let sync = synchronizer(&server, &dir);

    let err = sync.check_integrity().await.unwrap_err();
    assert!(matches!(err, TakeoverError::Io { .. }), "{err:?}");
    assert!(!dir.path().join("takeover").exists());
}

#[cfg(unix)]
#[tokio::test]
async fn installed_file_is_world_readable() {
    use std::os::unix::fs::PermissionsExt;

    let server =
        remote_serving(ResponseTemplate::new(200).set_body_json(envelope(DOCUMENT.as_bytes()))).await;
    let dir = TempDir::new().unwrap();
    let report = synchronizer(&server, &dir).download().await.unwrap();

    let mode = std::fs::metadata(&report.path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o644);
}
