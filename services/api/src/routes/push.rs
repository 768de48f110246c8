use axum::extract::State;
use github_contents::{FileUpdate, Lookup};
use tracing::{error, info, warn};

use crate::{
    config::LookupPolicy,
    errors::{AppError, AppResult},
    extractors::JsonBody,
    submission::{PushRequest, Submission},
    AppState,
};

pub const PUSHED: &str = "Pushed successfully";

/// Upsert one solution file into the caller's repository.
///
/// Validation failures return 400 before any upstream call. The existing
/// file's `sha` is looked up first so an overwrite is accepted upstream; any
/// failure of the write is logged in full and reported to the caller as a
/// generic 500.
pub async fn handler(
    State(state): State<AppState>,
    JsonBody(request): JsonBody<PushRequest>,
) -> AppResult<&'static str> {
    let submission = Submission::try_from(request)?;
    let path = submission.path();
    let repo = submission.repo.as_str();
    let token = submission.token.as_str();

    let sha = match state.contents.lookup(token, repo, &path).await {
        Lookup::Found(sha) => Some(sha),
        Lookup::NotFound => None,
        Lookup::Failed(err) => match state.lookup_policy {
            LookupPolicy::Proceed => {
                warn!(
                    repo,
                    path = %path,
                    status = ?err.status(),
                    error = %err,
                    "existing file lookup failed, writing without sha"
                );
                None
            }
            LookupPolicy::Abort => {
                error!(
                    repo,
                    path = %path,
                    status = ?err.status(),
                    error = %err,
                    "existing file lookup failed, aborting push"
                );
                return Err(AppError::push_failed());
            }
        },
    };

    let update = FileUpdate {
        message: submission.commit_message(),
        content: submission.encoded_content(),
        sha,
    };

    match state.contents.put(token, repo, &path, &update).await {
        Ok(status) => {
            info!(repo, path = %path, status = %status, "GitHub push success");
            Ok(PUSHED)
        }
        Err(err) => {
            error!(
                repo,
                path = %path,
                status = ?err.status(),
                body = err.body().unwrap_or_default(),
                error = %err,
                "GitHub API error"
            );
            Err(AppError::push_failed())
        }
    }
}
