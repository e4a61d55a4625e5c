use axum::{
    extract::{Extension, State},
    response::IntoResponse,
};

use super::model::UnreadCountResponse;
use crate::AppState;
use crate::error::AppError;
use crate::utils::{Claims, success_to_api_response};

#[axum::debug_handler]
pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let unread_count = state.unread.unread_count_for(claims.sub).await?;
    Ok(success_to_api_response(UnreadCountResponse { unread_count }))
}
