//! Router tests, driven in-process.

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use tryhub_api::{AppState, create_router};
use tryhub_builders::BuilderRegistry;
use tryhub_cache::{CacheConfig, TryWorkCache};
use tryhub_core::corpus::{Corpus, CorpusData, GerritCl, GerritMessage, GitCommit, GitHash};
use tryhub_core::ports::{ChangeTracker, QueryOptions, SystemClock};
use tryhub_core::{ChangeInfo, Error, Result};

const SERVER: &str = "go.googlesource.com";

fn h(c: char) -> String {
    c.to_string().repeat(40)
}

fn hash(c: char) -> GitHash {
    GitHash::parse("hash", &h(c)).unwrap()
}

struct StaticTracker(Result<Vec<ChangeInfo>>);

#[async_trait]
impl ChangeTracker for StaticTracker {
    async fn query_changes(
        &self,
        _query: &str,
        _options: &QueryOptions,
    ) -> Result<Vec<ChangeInfo>> {
        match &self.0 {
            Ok(changes) => Ok(changes.clone()),
            Err(e) => Err(Error::Upstream(e.to_string())),
        }
    }
}

fn corpus(with_go: bool) -> Arc<Corpus> {
    let mut data = CorpusData::default();
    for (c, parents) in [('a', vec![]), ('b', vec!['a']), ('c', vec!['b'])] {
        data.insert_commit(GitCommit {
            hash: hash(c),
            parents: parents.into_iter().map(hash).collect(),
            msg: String::new(),
        });
    }

    if with_go {
        let go = data.project_mut(SERVER, "go");
        for (name, c) in [
            ("refs/heads/master", 'c'),
            ("refs/heads/release-branch.go1.11", '1'),
            ("refs/heads/release-branch.go1.12", '2'),
            ("refs/tags/go1.11.6", '3'),
            ("refs/tags/go1.12.1", '4'),
        ] {
            go.refs.insert(name.to_string(), hash(c));
        }
    }

    let net = data.project_mut(SERVER, "net");
    net.num_label_changes = 1;
    net.cls.insert(
        42,
        GerritCl {
            number: 42,
            change_id: "I42".to_string(),
            branch: "refs/heads/master".to_string(),
            commit: Some(GitCommit {
                hash: hash('d'),
                parents: vec![hash('c')],
                msg: "http2: fix".to_string(),
            }),
            version: 1,
            messages: vec![GerritMessage {
                version: 1,
                message: "Patch Set 1: Run-TryBot+1".to_string(),
            }],
        },
    );

    Arc::new(Corpus::new(data))
}

fn app_with(corpus: Arc<Corpus>, tracker: StaticTracker) -> Router {
    let try_work = TryWorkCache::new(
        corpus.clone(),
        Arc::new(tracker),
        Arc::new(SystemClock),
        CacheConfig::default(),
    );
    let builders = Arc::new(BuilderRegistry::builtin().unwrap());
    create_router(Arc::new(AppState::new(corpus, try_work, builders)))
}

fn app() -> Router {
    let pending = vec![ChangeInfo {
        project: "net".to_string(),
        branch: "master".to_string(),
        change_id: "I42".to_string(),
        change_number: 42,
        current_revision: None,
    }];
    app_with(corpus(true), StaticTracker(Ok(pending)))
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));
    (status, body)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Request::get(uri).body(Body::empty()).unwrap()).await
}

async fn post_json(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn test_health_and_ready() {
    let (status, body) = get(app(), "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, _) = get(app(), "/ready").await;
    assert_eq!(status, StatusCode::OK);

    let not_ready = app_with(corpus(false), StaticTracker(Ok(vec![])));
    let (status, _) = get(not_ready, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_request_id() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert!(response.headers().contains_key("x-request-id"));

    let response = app()
        .oneshot(
            Request::get("/health")
                .header("x-request-id", "abc-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "abc-123");
}

#[tokio::test]
async fn test_has_ancestor() {
    let (status, body) = post_json(
        app(),
        "/api/v1/has-ancestor",
        json!({ "commit": h('c'), "ancestor": h('a') }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "unknown_commit": false, "has_ancestor": true }));

    let (_, body) = post_json(
        app(),
        "/api/v1/has-ancestor",
        json!({ "commit": h('a'), "ancestor": h('c') }),
    )
    .await;
    assert_eq!(body, json!({ "unknown_commit": false, "has_ancestor": false }));

    let (_, body) = post_json(
        app(),
        "/api/v1/has-ancestor",
        json!({ "commit": h('e'), "ancestor": h('a') }),
    )
    .await;
    assert_eq!(body, json!({ "unknown_commit": true, "has_ancestor": false }));

    let (_, body) = post_json(
        app(),
        "/api/v1/has-ancestor",
        json!({ "commit": h('b'), "ancestor": h('b') }),
    )
    .await;
    assert_eq!(body, json!({ "unknown_commit": false, "has_ancestor": false }));
}

#[tokio::test]
async fn test_has_ancestor_validates_hashes() {
    let (status, body) = post_json(
        app(),
        "/api/v1/has-ancestor",
        json!({ "commit": "abc", "ancestor": h('a') }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().contains("commit"));

    let (status, body) = post_json(
        app(),
        "/api/v1/has-ancestor",
        json!({ "commit": h('a'), "ancestor": h('a') + "0" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap().contains("ancestor"));
}

#[tokio::test]
async fn test_get_ref() {
    let (status, body) = get(
        app(),
        "/api/v1/refs/go.googlesource.com/go?ref=refs/heads/master",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "value": h('c') }));

    let (status, body) = get(
        app(),
        "/api/v1/refs/go.googlesource.com/go?ref=refs/heads/nope",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "value": "" }));

    let (status, _) = get(
        app(),
        "/api/v1/refs/go.googlesource.com/nope?ref=refs/heads/master",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_try_work() {
    let (status, body) = get(app(), "/api/v1/try-work").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "waiting": [{
                "project": "net",
                "branch": "master",
                "change_id": "I42",
                "commit": h('d'),
                "go_version": [
                    { "major": 1, "minor": 12 },
                    { "major": 1, "minor": 12 },
                    { "major": 1, "minor": 11 },
                ],
                "go_commit": [h('c'), h('2'), h('1')],
                "go_branch": ["master", "release-branch.go1.12", "release-branch.go1.11"],
            }]
        })
    );
}

#[tokio::test]
async fn test_try_work_upstream_failure() {
    let app = app_with(
        corpus(true),
        StaticTracker(Err(Error::Upstream("gerrit down".to_string()))),
    );
    let (status, _) = get(app, "/api/v1/try-work").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn test_releases() {
    let (status, body) = get(app(), "/api/v1/releases").await;
    assert_eq!(status, StatusCode::OK);
    let tags: Vec<&str> = body["releases"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["tag_name"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["go1.12.1", "go1.11.6"]);

    let app = app_with(corpus(false), StaticTracker(Ok(vec![])));
    let (status, _) = get(app, "/api/v1/releases").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_try_bot_status() {
    let (status, body) = get(
        app(),
        "/api/v1/changes/go.googlesource.com/net/42/trybot-status",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "try_requested": true, "done": false }));

    let (status, _) = get(
        app(),
        "/api/v1/changes/go.googlesource.com/net/43/trybot-status",
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_trybots() {
    let (status, body) = get(app(), "/api/v1/trybots?repo=mobile").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "builders": ["linux-amd64-androidemu", "android-amd64-emu"] })
    );

    let (status, _) = get(app(), "/api/v1/trybots?repo=").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_builder_eligibility() {
    let (status, body) = get(
        app(),
        "/api/v1/builders/darwin-amd64-race/eligibility?repo=go",
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post_submit"], true);
    assert_eq!(body["try_bot"], false);
    assert_eq!(body["dist_tests_timeout_secs"], 1200);

    let (_, body) = get(
        app(),
        "/api/v1/builders/linux-amd64/eligibility?repo=net&go_branch=release-branch.go1.10",
    )
    .await;
    assert_eq!(body["post_submit"], false);

    let (status, _) = get(app(), "/api/v1/builders/vms-nope/eligibility?repo=go").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_builders_and_dist_tests() {
    let (status, body) = get(app(), "/api/v1/builders/js-wasm").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["goos"], "js");
    assert_eq!(body["goarch"], "wasm");
    assert_eq!(body["race"], false);
    assert_eq!(body["env"], json!([]));

    let (_, body) = get(
        app(),
        "/api/v1/builders/linux-amd64-race/dist-tests/reboot?try_bot=true",
    )
    .await;
    assert_eq!(body["run"], false);

    let (_, body) = get(app(), "/api/v1/builders/linux-amd64-race/dist-tests/reboot").await;
    assert_eq!(body["run"], true);
}

#[tokio::test]
async fn test_builder_summaries() {
    let (_, body) = get(app(), "/api/v1/builders/linux-amd64-race").await;
    assert_eq!(body["race"], true);
    assert_eq!(body["long_test"], false);

    let (_, body) = get(app(), "/api/v1/builders/linux-amd64-longtest").await;
    assert_eq!(body["race"], false);
    assert_eq!(body["long_test"], true);
    assert_eq!(body["env"], json!(["GO_TEST_TIMEOUT_SCALE=5"]));

    // Inherited from the host.
    let (_, body) = get(app(), "/api/v1/builders/linux-arm-arm5spacemonkey").await;
    assert_eq!(body["env"], json!(["GO_TEST_TIMEOUT_SCALE=5"]));

    let (status, body) = get(app(), "/api/v1/builders").await;
    assert_eq!(status, StatusCode::OK);
    let builders = body["builders"].as_array().unwrap();
    assert_eq!(body["total"], builders.len());
    assert!(builders.iter().any(|b| b["name"] == "linux-386-387"
        && b["env"] == json!(["GO386=387"])));
}
