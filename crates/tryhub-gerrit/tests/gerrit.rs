//! Gerrit adapter against a mock server.

use pretty_assertions::assert_eq;
use std::time::Duration;
use tryhub_core::ports::{ChangeTracker, QueryOptions};
use tryhub_core::{ChangeInfo, Error};
use tryhub_gerrit::{GerritClient, GerritConfig};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const QUERY: &str = "label:Run-TryBot=1 label:TryBot-Result=0 status:open";

fn options() -> QueryOptions {
    QueryOptions {
        fields: vec!["CURRENT_REVISION".to_string(), "CURRENT_COMMIT".to_string()],
    }
}

fn client(server: &MockServer) -> GerritClient {
    GerritClient::new(GerritConfig::new(server.uri())).unwrap()
}

#[tokio::test]
async fn test_query_changes() {
    let server = MockServer::start().await;
    let body = r#")]}'
[
  {
    "id": "net~master~I1234",
    "project": "net",
    "branch": "master",
    "change_id": "I1234",
    "subject": "http2: fix race",
    "status": "NEW",
    "_number": 170001,
    "current_revision": "0123456789abcdef0123456789abcdef01234567",
    "revisions": {}
  },
  {
    "project": "go",
    "branch": "release-branch.go1.12",
    "change_id": "I5678",
    "_number": 170002
  }
]
"#;
    Mock::given(method("GET"))
        .and(path("/changes/"))
        .and(query_param("q", QUERY))
        .and(query_param("o", "CURRENT_REVISION"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .expect(1)
        .mount(&server)
        .await;

    let changes = client(&server)
        .query_changes(QUERY, &options())
        .await
        .unwrap();

    assert_eq!(
        changes,
        vec![
            ChangeInfo {
                project: "net".to_string(),
                branch: "master".to_string(),
                change_id: "I1234".to_string(),
                change_number: 170001,
                current_revision: Some("0123456789abcdef0123456789abcdef01234567".to_string()),
            },
            ChangeInfo {
                project: "go".to_string(),
                branch: "release-branch.go1.12".to_string(),
                change_id: "I5678".to_string(),
                change_number: 170002,
                current_revision: None,
            },
        ]
    );
}

#[tokio::test]
async fn test_body_without_prefix() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/changes/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("[]"))
        .mount(&server)
        .await;

    let changes = client(&server)
        .query_changes(QUERY, &QueryOptions::default())
        .await
        .unwrap();
    assert!(changes.is_empty());
}

#[tokio::test]
async fn test_server_error_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/changes/"))
        .respond_with(ResponseTemplate::new(503).set_body_string("backend unavailable"))
        .mount(&server)
        .await;

    let err = client(&server)
        .query_changes(QUERY, &options())
        .await
        .unwrap_err();
    match err {
        Error::Upstream(msg) => assert!(msg.contains("503"), "{msg}"),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_malformed_body_is_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/changes/"))
        .respond_with(ResponseTemplate::new(200).set_body_string(")]}'\n{\"oops\""))
        .mount(&server)
        .await;

    let err = client(&server)
        .query_changes(QUERY, &options())
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
}

#[tokio::test]
async fn test_request_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("[]")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let client = GerritClient::new(
        GerritConfig::new(server.uri()).with_request_timeout(Duration::from_millis(50)),
    )
    .unwrap();
    let err = client.query_changes(QUERY, &options()).await.unwrap_err();
    assert!(matches!(err, Error::Upstream(_)));
}
