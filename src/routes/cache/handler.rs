use axum::{extract::State, response::IntoResponse};

use crate::AppState;
use crate::utils::success_to_api_response;

#[axum::debug_handler]
pub async fn user_cache_stats(State(state): State<AppState>) -> impl IntoResponse {
    success_to_api_response(state.users.cache().stats())
}
