//! GitHub source against a local mock of the REST API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use base64::Engine;
use serde_json::json;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use repo_intake::config::Config;
use repo_intake::error::IntakeError;
use repo_intake::models::SourceInfo;
use repo_intake::pipeline::ingest_github;

#[derive(Clone, Default)]
struct Mock {
    content_requests: Arc<AtomicUsize>,
}

async fn repo(Path((owner, name)): Path<(String, String)>) -> impl IntoResponse {
    if owner == "acme" && (name == "widget" || name == "slow") {
        (StatusCode::OK, Json(json!({ "default_branch": "trunk" })))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "message": "Not Found" })))
    }
}

async fn tree(
    Path((_owner, name, branch)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    assert_eq!(branch, "trunk");
    assert_eq!(query.get("recursive").map(String::as_str), Some("1"));
    if name == "slow" {
        // GitHub cut the listing short; what was listed is still usable.
        return Json(json!({
            "truncated": true,
            "tree": [
                { "path": "src/index.ts", "type": "blob", "size": 18 },
                { "path": "src/slow.ts", "type": "blob", "size": 4 }
            ]
        }));
    }
    Json(json!({
        "truncated": false,
        "tree": [
            { "path": "src", "type": "tree" },
            { "path": "src/index.ts", "type": "blob", "size": 18 },
            { "path": "src/broken.ts", "type": "blob", "size": 5 },
            { "path": "src/empty.ts", "type": "blob", "size": 0 },
            { "path": "README.md", "type": "blob", "size": 6 },
            { "path": "node_modules/x/index.js", "type": "blob", "size": 3 },
            { "path": "logo.png", "type": "blob", "size": 100 },
            { "path": "vendored", "type": "commit" }
        ]
    }))
}

async fn contents(
    State(mock): State<Mock>,
    Path((_owner, _name, path)): Path<(String, String, String)>,
    Query(query): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    mock.content_requests.fetch_add(1, Ordering::SeqCst);
    assert_eq!(query.get("ref").map(String::as_str), Some("trunk"));

    if path == "src/slow.ts" {
        // Outlives the client timeout, so the read fails at the transport level.
        tokio::time::sleep(Duration::from_secs(30)).await;
    }

    let encode = |s: &str| base64::engine::general_purpose::STANDARD.encode(s);
    match path.as_str() {
        "src/index.ts" => (
            StatusCode::OK,
            Json(json!({
                "content": encode("export const a = 1;"),
                "encoding": "base64",
                "size": 18
            })),
        ),
        "README.md" => (
            StatusCode::OK,
            // GitHub wraps base64 at 60 columns.
            Json(json!({
                "content": format!("{}\n", encode("# Demo")),
                "encoding": "base64",
                "size": 6
            })),
        ),
        "src/empty.ts" => (
            StatusCode::OK,
            Json(json!({ "content": "", "encoding": "base64", "size": 0 })),
        ),
        _ => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "boom" })),
        ),
    }
}

async fn start_mock() -> (String, Mock) {
    let mock = Mock::default();
    let app = Router::new()
        .route("/repos/{owner}/{name}", get(repo))
        .route("/repos/{owner}/{name}/git/trees/{branch}", get(tree))
        .route("/repos/{owner}/{name}/contents/{*path}", get(contents))
        .with_state(mock.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}", addr), mock)
}

fn config_for(api_base: &str) -> Config {
    let mut config = Config::default();
    config.github.api_base = api_base.to_string();
    config.github.batch_size = 2;
    config
}

#[tokio::test]
async fn ingests_valuable_files_and_drops_failures() {
    let (base, mock) = start_mock().await;
    let config = config_for(&base);

    let ingestion = ingest_github(&config, "https://github.com/acme/widget", None)
        .await
        .unwrap();

    let paths: Vec<&str> = ingestion.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/index.ts", "README.md"]);
    assert_eq!(ingestion.files[0].content, "export const a = 1;");
    assert_eq!(ingestion.files[1].content, "# Demo");

    // Only filtered paths were requested: index, broken, empty, README.
    assert_eq!(mock.content_requests.load(Ordering::SeqCst), 4);

    assert_eq!(
        ingestion.source,
        SourceInfo::GitHub {
            owner: "acme".to_string(),
            repo: "widget".to_string(),
            default_branch: "trunk".to_string(),
        }
    );

    let tree: serde_json::Value = serde_json::from_str(&ingestion.tree).unwrap();
    assert_eq!(tree, json!({ "README.md": null, "src": { "index.ts": null } }));
}

#[tokio::test]
async fn missing_repository_is_an_upstream_error() {
    let (base, _mock) = start_mock().await;
    let config = config_for(&base);

    let err = ingest_github(&config, "https://github.com/acme/nothing.git", None)
        .await
        .unwrap_err();

    match err {
        IntakeError::Upstream { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not Found");
        }
        other => panic!("expected upstream error, got {:?}", other),
    }
}

#[tokio::test]
async fn truncated_tree_and_timed_out_read_still_ingest() {
    let (base, mock) = start_mock().await;
    let mut config = config_for(&base);
    config.github.timeout_secs = 1;

    let started = Instant::now();
    let ingestion = ingest_github(&config, "https://github.com/acme/slow", None)
        .await
        .unwrap();

    let paths: Vec<&str> = ingestion.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/index.ts"]);
    assert_eq!(mock.content_requests.load(Ordering::SeqCst), 2);
    assert!(started.elapsed() < Duration::from_secs(10));
}
