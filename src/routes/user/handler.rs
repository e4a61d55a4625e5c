use std::collections::HashSet;

use axum::{
    extract::{Extension, Json, State},
    response::IntoResponse,
};

use super::model::{LookupUsersRequest, LookupUsersResponse, MAX_LOOKUP_IDS};
use crate::AppState;
use crate::error::AppError;
use crate::utils::{Claims, success_to_api_response};

#[axum::debug_handler]
pub async fn me(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .users
        .resolve(claims.sub)
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在".to_string()))?;

    Ok(success_to_api_response(user))
}

#[axum::debug_handler]
pub async fn lookup(
    State(state): State<AppState>,
    Json(req): Json<LookupUsersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut seen = HashSet::new();
    let ids: Vec<_> = req
        .user_ids
        .into_iter()
        .filter(|id| seen.insert(*id))
        .collect();

    if ids.len() > MAX_LOOKUP_IDS {
        return Err(AppError::Validation(format!(
            "一次最多查询{}个用户",
            MAX_LOOKUP_IDS
        )));
    }

    let mut found = state.users.resolve_many(&ids).await?;
    let users = ids.iter().filter_map(|id| found.remove(id)).collect();

    Ok(success_to_api_response(LookupUsersResponse { users }))
}
