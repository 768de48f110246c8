use axum::{extract::DefaultBodyLimit, routing::get, Json, Router};
use github_contents::{ContentStore, GitHubContents};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

pub mod config;
pub mod errors;
pub mod extractors;
pub mod routes;
pub mod submission;

use crate::config::{Config, LookupPolicy};

pub const DEFAULT_MAX_BODY_BYTES: usize = 100 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub contents: Arc<dyn ContentStore>,
    pub lookup_policy: LookupPolicy,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let contents = GitHubContents::new(config.github_api_url.clone())
            .map_err(|e| anyhow::anyhow!("Failed to create GitHub client: {}", e))?;

        Ok(Self {
            contents: Arc::new(contents),
            lookup_policy: config.lookup_policy,
            max_body_bytes: config.max_body_bytes,
        })
    }

    pub fn with_store(contents: Arc<dyn ContentStore>, lookup_policy: LookupPolicy) -> Self {
        Self {
            contents,
            lookup_policy,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": "leetpush-relay"
    }))
}

pub fn app(state: AppState) -> Router {
    let max_body_bytes = state.max_body_bytes;

    Router::new()
        .route("/health", get(health))
        .merge(routes::router())
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                        .on_response(DefaultOnResponse::new().level(Level::INFO)),
                )
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(max_body_bytes)),
        )
        .with_state(state)
}
