use axum::{routing::post, Router};

mod push;

pub fn router() -> Router<crate::AppState> {
    Router::new()
        .route("/push", post(push::handler))
}
