//! Dictionary entry handlers (`/entries/en`).

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::Value;
use tracing::{info, instrument};

use crate::auth::Caller;
use crate::dictionary::Page;
use crate::error::AppError;
use crate::extractors::SearchQuery;
use crate::state::AppState;

/// GET /entries/en?search=&limit=&page=
#[instrument(skip_all, fields(search = %query.search, page = query.page.page, limit = query.page.limit))]
pub async fn search_entries(
    State(state): State<AppState>,
    query: SearchQuery,
) -> Result<Json<Page<String>>, AppError> {
    let page = state
        .dictionary()
        .search(&query.search, query.page)
        .await?;

    Ok(Json(page))
}

/// GET /entries/en/{word}
///
/// Records the lookup in the caller's history. When the response is served
/// from cache this handler does not run, so repeated lookups within the TTL
/// add a single history entry.
#[instrument(skip_all, fields(word = %word, user_id = %caller.id))]
pub async fn get_entry(
    State(state): State<AppState>,
    caller: Caller,
    Path(word): Path<String>,
) -> Result<Json<Value>, AppError> {
    let dictionary = state.dictionary();

    let word_id = dictionary.word_id(&word).await?;
    let detail = dictionary.word_detail(&word).await?;
    dictionary.add_history(&caller.id, word_id).await?;

    state.invalidate_user(&caller.id).await;

    Ok(Json(detail))
}

/// POST /entries/en/{word}/favorite
#[instrument(skip_all, fields(word = %word, user_id = %caller.id))]
pub async fn add_favorite(
    State(state): State<AppState>,
    caller: Caller,
    Path(word): Path<String>,
) -> Result<StatusCode, AppError> {
    let dictionary = state.dictionary();

    let word_id = dictionary.word_id(&word).await?;
    dictionary.add_favorite(&caller.id, word_id).await?;
    info!("Word added to favorites");

    state.invalidate_user(&caller.id).await;

    Ok(StatusCode::NO_CONTENT)
}

/// DELETE /entries/en/{word}/unfavorite
#[instrument(skip_all, fields(word = %word, user_id = %caller.id))]
pub async fn remove_favorite(
    State(state): State<AppState>,
    caller: Caller,
    Path(word): Path<String>,
) -> Result<StatusCode, AppError> {
    let dictionary = state.dictionary();

    let word_id = dictionary.word_id(&word).await?;
    dictionary.remove_favorite(&caller.id, word_id).await?;
    info!("Word removed from favorites");

    state.invalidate_user(&caller.id).await;

    Ok(StatusCode::NO_CONTENT)
}
