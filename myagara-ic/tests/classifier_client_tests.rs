//! HTTP classifier client against a fake classifier server

mod helpers;

use axum::http::StatusCode;
use helpers::{FakeClassifier, FakeResponse};
use myagara_ic::models::UNKNOWN_LABEL;
use myagara_ic::services::{ClassificationError, HttpClassifierClient, ImageClassifier};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::TempDir;

fn client(url: &str) -> HttpClassifierClient {
    HttpClassifierClient::new(url, Duration::from_secs(5)).unwrap()
}

fn staged_image(dir: &TempDir) -> PathBuf {
    let path = dir.path().join("0f3c-leaf.jpg");
    std::fs::write(&path, b"\xff\xd8\xff\xe0 fake jpeg").unwrap();
    path
}

#[tokio::test]
async fn test_classify_sends_image_field_and_parses_reply() {
    let fake = FakeClassifier::start(FakeResponse::ok(
        r#"{"label":"Corn___Common_rust","confidence":97.5}"#,
    ))
    .await;
    let dir = TempDir::new().unwrap();
    let path = staged_image(&dir);

    let result = client(&fake.url).classify(&path).await.unwrap();

    assert_eq!(result.label, "Corn___Common_rust");
    assert_eq!(result.confidence, 97.5);

    let received = fake.received();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].file_name.as_deref(), Some("0f3c-leaf.jpg"));
    assert_eq!(received[0].bytes, b"\xff\xd8\xff\xe0 fake jpeg");
}

#[tokio::test]
async fn test_missing_keys_fall_back_to_defaults() {
    let fake = FakeClassifier::start(FakeResponse::ok(r#"{"label":"X"}"#)).await;
    let dir = TempDir::new().unwrap();

    let result = client(&fake.url).classify(&staged_image(&dir)).await.unwrap();
    assert_eq!(result.label, "X");
    assert_eq!(result.confidence, 0.0);

    let fake = FakeClassifier::start(FakeResponse::ok(r#"{"confidence":0.9}"#)).await;
    let result = client(&fake.url).classify(&staged_image(&dir)).await.unwrap();
    assert_eq!(result.label, UNKNOWN_LABEL);
    assert_eq!(result.confidence, 0.9);
}

#[tokio::test]
async fn test_non_success_status() {
    let fake = FakeClassifier::start(FakeResponse::with_status(
        StatusCode::INTERNAL_SERVER_ERROR,
        r#"{"error":"model crashed"}"#,
    ))
    .await;
    let dir = TempDir::new().unwrap();

    let err = client(&fake.url)
        .classify(&staged_image(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassificationError::Status(500)), "{:?}", err);
}

#[tokio::test]
async fn test_empty_success_body() {
    let fake = FakeClassifier::start(FakeResponse::ok("")).await;
    let dir = TempDir::new().unwrap();

    let err = client(&fake.url)
        .classify(&staged_image(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassificationError::EmptyBody(_)), "{:?}", err);
}

#[tokio::test]
async fn test_non_numeric_confidence_is_malformed() {
    let fake = FakeClassifier::start(FakeResponse::ok(r#"{"label":"X","confidence":"high"}"#)).await;
    let dir = TempDir::new().unwrap();

    let err = client(&fake.url)
        .classify(&staged_image(&dir))
        .await
        .unwrap_err();

    assert!(
        matches!(
            err,
            ClassificationError::MalformedField {
                field: "confidence",
                ..
            }
        ),
        "{:?}",
        err
    );
}

#[tokio::test]
async fn test_missing_file_never_reaches_network() {
    let fake = FakeClassifier::start(FakeResponse::ok(r#"{"label":"X"}"#)).await;
    let dir = TempDir::new().unwrap();
    let client = client(&fake.url);

    let err = client
        .classify(&dir.path().join("gone.jpg"))
        .await
        .unwrap_err();
    assert!(matches!(err, ClassificationError::InvalidInput(_)));

    let err = client.classify(Path::new("")).await.unwrap_err();
    assert!(matches!(err, ClassificationError::InvalidInput(_)));

    let err = client.classify(dir.path()).await.unwrap_err();
    assert!(matches!(err, ClassificationError::InvalidInput(_)));

    assert_eq!(fake.request_count(), 0);
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let dir = TempDir::new().unwrap();
    let err = client(&format!("http://{}/classify", addr))
        .classify(&staged_image(&dir))
        .await
        .unwrap_err();

    assert!(matches!(err, ClassificationError::Transport(_)), "{:?}", err);
}

#[tokio::test]
async fn test_slow_classifier_times_out() {
    let fake = FakeClassifier::start(
        FakeResponse::ok(r#"{"label":"late"}"#).delayed(Duration::from_secs(3)),
    )
    .await;
    let dir = TempDir::new().unwrap();
    let client = HttpClassifierClient::new(fake.url.clone(), Duration::from_millis(200)).unwrap();

    let err = client.classify(&staged_image(&dir)).await.unwrap_err();

    match err {
        ClassificationError::Transport(source) => assert!(source.is_timeout()),
        other => panic!("expected transport timeout, got {:?}", other),
    }
    assert_eq!(fake.request_count(), 1);
}
