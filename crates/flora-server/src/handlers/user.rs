//! Per-user handlers (`/user/me`).

use axum::{Json, extract::State};
use tracing::instrument;

use crate::auth::Caller;
use crate::dictionary::{Page, UserProfile, WordEntry};
use crate::error::AppError;
use crate::extractors::Pagination;
use crate::state::AppState;

/// GET /user/me
#[instrument(skip_all, fields(user_id = %caller.id))]
pub async fn get_profile(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.dictionary().profile(&caller.id).await?))
}

/// GET /user/me/history?limit=&page=
#[instrument(skip_all, fields(user_id = %caller.id))]
pub async fn get_history(
    State(state): State<AppState>,
    caller: Caller,
    Pagination(page): Pagination,
) -> Result<Json<Page<WordEntry>>, AppError> {
    Ok(Json(state.dictionary().history(&caller.id, page).await?))
}

/// GET /user/me/favorites?limit=&page=
#[instrument(skip_all, fields(user_id = %caller.id))]
pub async fn get_favorites(
    State(state): State<AppState>,
    caller: Caller,
    Pagination(page): Pagination,
) -> Result<Json<Page<WordEntry>>, AppError> {
    Ok(Json(state.dictionary().favorites(&caller.id, page).await?))
}
