use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing::info;

use leetpush_api::{app, config::Config, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_target(false)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "leetpush_api=debug,github_contents=debug,tower_http=debug".into()
            }),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;

    // Create application state
    let state = AppState::new(&config)?;

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        github_api_url = %config.github_api_url,
        lookup_policy = ?config.lookup_policy,
        "LeetPush relay running on port {}",
        config.port
    );

    axum::serve(listener, app(state)).await?;

    Ok(())
}
