//! Player login endpoint.

use axum::{extract::State, http::HeaderMap, Json};

use super::{error, success, ApiResult};
use crate::auth::player_name;
use crate::errors::AppError;
use crate::models::{LoginRequest, Player};
use crate::AppState;

/// POST /api/login - Join the quiz or resume a session under a name.
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<LoginRequest>,
) -> ApiResult<Player> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    let name = request.name.trim();
    if name.is_empty() {
        return error(
            AppError::Validation("Name is required".to_string()),
            revision_id,
        );
    }

    let caller = player_name(&headers);
    match state
        .repo
        .login(
            name,
            caller.as_deref(),
            &state.config.admin_name,
            state.config.login_window_secs,
        )
        .await
    {
        Ok(player) => {
            tracing::info!("Login as {}", player.name);
            success(player, revision_id)
        }
        Err(e) => error(e, revision_id),
    }
}
