//! Answer submission endpoint.

use axum::{extract::State, http::HeaderMap, Json};
use serde::Serialize;

use super::{error, success, ApiResult};
use crate::auth::player_name;
use crate::errors::AppError;
use crate::models::SubmitAnswersRequest;
use crate::AppState;

/// Outcome of a submission.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitAnswersResult {
    /// Responses created or changed; resubmitting the same answers yields 0
    pub updated: usize,
}

/// POST /api/answers - Submit answers for the open round.
pub async fn submit_answers(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<SubmitAnswersRequest>,
) -> ApiResult<SubmitAnswersResult> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let Some(name) = player_name(&headers) else {
        return error(
            AppError::Forbidden("Log in before answering".to_string()),
            revision_id,
        );
    };

    match state
        .repo
        .submit_answers(
            &name,
            &state.config.admin_name,
            request.round,
            &request.answers,
        )
        .await
    {
        Ok(updated) => {
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            success(SubmitAnswersResult { updated }, new_revision)
        }
        Err(e) => error(e, revision_id),
    }
}
