//! Facilitator endpoints.

use axum::{extract::State, Json};

use super::{error, success, ApiResult};
use crate::models::{ControlCommand, ControlPanel, ImportQuestionsRequest, Question};
use crate::AppState;

/// GET /api/control - Current state and scoring tools.
pub async fn get_control(State(state): State<AppState>) -> ApiResult<ControlPanel> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.control_panel().await {
        Ok(panel) => success(panel, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// POST /api/control - Apply a facilitator command.
pub async fn post_control(
    State(state): State<AppState>,
    Json(command): Json<ControlCommand>,
) -> ApiResult<ControlPanel> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    if let Err(e) = state.repo.apply_command(&command).await {
        return error(e, revision_id);
    }

    let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
    match state.repo.control_panel().await {
        Ok(panel) => success(panel, new_revision),
        Err(e) => error(e, new_revision),
    }
}

/// GET /api/control/questions - The whole question bank, answers included.
pub async fn list_questions(State(state): State<AppState>) -> ApiResult<Vec<Question>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.list_questions().await {
        Ok(questions) => success(questions, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// PUT /api/control/questions - Replace the question bank.
pub async fn import_questions(
    State(state): State<AppState>,
    Json(request): Json<ImportQuestionsRequest>,
) -> ApiResult<Vec<Question>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.replace_questions(&request.questions).await {
        Ok(count) => {
            tracing::info!("Imported {} questions", count);
            let new_revision = state.repo.get_revision_id().await.unwrap_or(revision_id);
            match state.repo.list_questions().await {
                Ok(questions) => success(questions, new_revision),
                Err(e) => error(e, new_revision),
            }
        }
        Err(e) => error(e, revision_id),
    }
}
