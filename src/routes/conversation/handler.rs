use axum::{
    extract::{Extension, Path, State},
    response::IntoResponse,
};
use uuid::Uuid;

use super::model::MarkReadResponse;
use crate::AppState;
use crate::database::{ConversationOperation, ReadMarker};
use crate::error::AppError;
use crate::utils::{Claims, success_to_api_response};

async fn mark_conversation_read<M: ReadMarker>(
    marker: &M,
    conversation_id: Uuid,
    user_id: Uuid,
) -> Result<MarkReadResponse, AppError> {
    if !marker.mark_read(conversation_id, user_id).await? {
        return Err(AppError::NotFound("不在该会话中".to_string()));
    }

    tracing::debug!(%conversation_id, %user_id, "Marked conversation as read");
    Ok(MarkReadResponse { conversation_id })
}

#[axum::debug_handler]
pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(conversation_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let operation = ConversationOperation::new(state.pool.clone());
    let response = mark_conversation_read(&operation, conversation_id, claims.sub).await?;
    Ok(success_to_api_response(response))
}
