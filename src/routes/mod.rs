use axum::{
    Router,
    response::IntoResponse,
    routing::{get, post},
};

use crate::AppState;
use crate::middleware::auth_middleware;
use crate::utils::success_to_api_response;

pub mod cache;
pub mod conversation;
pub mod notification;
pub mod user;

pub async fn health() -> impl IntoResponse {
    success_to_api_response(serde_json::json!({ "status": "ok" }))
}

/// 公开路由与需认证路由
pub fn api_routes(state: AppState) -> Router<AppState> {
    let public_routes = Router::new().route("/health", get(health));

    let protected_routes = Router::new()
        .route("/users/me", get(user::me))
        .route("/users/lookup", post(user::lookup))
        .route("/notifications/unread-count", get(notification::unread_count))
        .route(
            "/conversations/{conversation_id}/read",
            post(conversation::mark_read),
        )
        .route("/cache/users/stats", get(cache::user_cache_stats))
        .layer(axum::middleware::from_fn_with_state(state, auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
