//! Polling endpoints.

use axum::{extract::State, http::HeaderMap};
use chrono::Utc;

use super::{error, success, ApiResult};
use crate::auth::player_name;
use crate::models::{Player, PlayerView};
use crate::quiz::view;
use crate::AppState;

/// GET /api/view - What the calling player should render right now.
pub async fn get_view(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<PlayerView> {
    let revision_id = match state.repo.get_revision_id().await {
        Ok(revision_id) => revision_id,
        Err(e) => return error(e, 0),
    };

    let Some(name) = player_name(&headers) else {
        return success(PlayerView::NotLoggedIn, revision_id);
    };

    let now = Utc::now().timestamp();
    match state.repo.touch_player(&name, now).await {
        Ok(true) => {}
        Ok(false) => return success(PlayerView::NotLoggedIn, revision_id),
        Err(e) => return error(e, revision_id),
    }

    match view::project(&state.repo, &name, &state.config.admin_name, now).await {
        Ok(view) => success(view, revision_id),
        Err(e) => error(e, revision_id),
    }
}

/// GET /api/leaderboard - Players by score, highest first.
pub async fn get_leaderboard(State(state): State<AppState>) -> ApiResult<Vec<Player>> {
    let revision_id = state.repo.get_revision_id().await.unwrap_or(0);

    match state.repo.leaderboard(&state.config.admin_name).await {
        Ok(players) => success(players, revision_id),
        Err(e) => error(e, revision_id),
    }
}
