#![allow(dead_code)]

use axum::{
    body::Bytes,
    extract::State,
    http::{HeaderMap, Method, StatusCode, Uri},
    response::IntoResponse,
    Json, Router,
};
use leetpush_api::{
    app,
    config::{Config, LookupPolicy},
    AppState, DEFAULT_MAX_BODY_BYTES,
};
use reqwest::Client;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use url::Url;

/// A request received by the fake GitHub server.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub headers: HashMap<String, String>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}

#[derive(Default)]
struct Upstream {
    files: HashMap<String, String>,
    requests: Vec<RecordedRequest>,
    fail_lookups: bool,
    put_status: Option<StatusCode>,
    revision: u32,
}

/// In-process stand-in for the GitHub Contents API. Files are keyed by the
/// full request path, e.g. `/repos/user/repo/contents/Two_Sum/solution.cpp`.
#[derive(Clone)]
pub struct FakeGitHub {
    inner: Arc<Mutex<Upstream>>,
    pub url: Url,
}

impl FakeGitHub {
    pub async fn start() -> Self {
        let inner = Arc::new(Mutex::new(Upstream::default()));
        let router = Router::new().fallback(handle).with_state(inner.clone());
        let addr = serve(router).await;

        Self {
            inner,
            url: Url::parse(&format!("http://{}", addr)).expect("valid fake GitHub url"),
        }
    }

    pub fn seed_file(&self, path: &str, sha: &str) {
        self.inner
            .lock()
            .unwrap()
            .files
            .insert(path.to_string(), sha.to_string());
    }

    pub fn sha_of(&self, path: &str) -> Option<String> {
        self.inner.lock().unwrap().files.get(path).cloned()
    }

    pub fn fail_lookups(&self) {
        self.inner.lock().unwrap().fail_lookups = true;
    }

    pub fn fail_writes(&self, status: StatusCode) {
        self.inner.lock().unwrap().put_status = Some(status);
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.inner.lock().unwrap().requests.clone()
    }
}

async fn handle(
    State(inner): State<Arc<Mutex<Upstream>>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let path = uri.path().to_string();
    let body: Option<Value> = serde_json::from_slice(&body).ok();
    let headers = headers
        .iter()
        .map(|(k, v)| (k.as_str().to_string(), v.to_str().unwrap_or_default().to_string()))
        .collect();

    let mut upstream = inner.lock().unwrap();
    upstream.requests.push(RecordedRequest {
        method: method.clone(),
        path: path.clone(),
        headers,
        body: body.clone(),
    });

    match method {
        Method::GET if upstream.fail_lookups => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"message": "Service unavailable"})),
        ),
        Method::GET => match upstream.files.get(&path) {
            Some(sha) => (StatusCode::OK, Json(json!({"sha": sha, "path": path}))),
            None => (StatusCode::NOT_FOUND, Json(json!({"message": "Not Found"}))),
        },
        Method::PUT => {
            if let Some(status) = upstream.put_status {
                return (status, Json(json!({"message": "Bad credentials"})));
            }

            let supplied = body
                .as_ref()
                .and_then(|b| b.get("sha"))
                .and_then(Value::as_str)
                .map(str::to_string);
            let existing = upstream.files.get(&path).cloned();

            let status = match (existing, supplied) {
                (Some(current), Some(given)) if current == given => StatusCode::OK,
                (Some(_), Some(_)) => {
                    return (
                        StatusCode::CONFLICT,
                        Json(json!({"message": "sha does not match"})),
                    )
                }
                (Some(_), None) => {
                    return (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        Json(json!({"message": "Invalid request.\n\n\"sha\" wasn't supplied."})),
                    )
                }
                (None, _) => StatusCode::CREATED,
            };

            upstream.revision += 1;
            let sha = format!("sha-{}", upstream.revision);
            upstream.files.insert(path.clone(), sha.clone());
            (status, Json(json!({"content": {"path": path, "sha": sha}})))
        }
        _ => (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({"message": "Method not allowed"})),
        ),
    }
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("listener address");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("test server failed");
    });
    addr
}

/// Relay under test plus the fake upstream it talks to.
pub struct TestApp {
    pub client: TestClient,
    pub github: FakeGitHub,
}

pub async fn spawn_app(lookup_policy: LookupPolicy) -> TestApp {
    let github = FakeGitHub::start().await;
    let config = Config {
        port: 0,
        github_api_url: github.url.clone(),
        lookup_policy,
        max_body_bytes: DEFAULT_MAX_BODY_BYTES,
    };
    let state = AppState::new(&config).expect("Failed to build app state");
    let addr = serve(app(state)).await;

    TestApp {
        client: TestClient::new(format!("http://{}", addr)),
        github,
    }
}

/// Test client wrapper with convenience methods
pub struct TestClient {
    pub client: Client,
    pub base_url: String,
}

impl TestClient {
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn push(&self, payload: &Value) -> reqwest::Result<reqwest::Response> {
        self.client.post(self.url("/push")).json(payload).send().await
    }

    /// Push and return `(status, body text)`.
    pub async fn push_text(&self, payload: &Value) -> (StatusCode, String) {
        let response = self.push(payload).await.expect("Failed to send request");
        let status = response.status();
        let body = response.text().await.expect("Failed to read body");
        (status, body)
    }
}

/// Test data generators
pub struct TestData;

impl TestData {
    pub const TOKEN: &'static str = "ghp_test_token";
    pub const REPO: &'static str = "user/repo";

    pub fn submission(title: &str, code: &str, language: &str) -> Value {
        json!({
            "title": title,
            "code": code,
            "language": language,
            "token": Self::TOKEN,
            "repo": Self::REPO,
        })
    }

    pub fn two_sum() -> Value {
        Self::submission("Two Sum", "int main(){}", "cpp")
    }

    pub fn contents_path(path: &str) -> String {
        format!("/repos/{}/contents/{}", Self::REPO, path)
    }
}
