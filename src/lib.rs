use std::sync::Arc;

use axum::Router;
use sqlx::PgPool;

use cache::{UserCache, UserDirectory};
use config::Config;
use database::{ConversationOperation, UserOperation};
use unread::UnreadAggregator;

pub mod cache;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod result;
pub mod routes;
pub mod unread;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub users: Arc<UserDirectory<UserOperation>>,
    pub unread: Arc<UnreadAggregator<ConversationOperation>>,
}

impl AppState {
    pub fn new(pool: PgPool, config: Config, user_cache: Arc<UserCache>) -> Self {
        let users = UserDirectory::new(user_cache, UserOperation::new(pool.clone()));
        let unread = UnreadAggregator::new(
            ConversationOperation::new(pool.clone()),
            config.unread_fallback_concurrency,
        );

        Self {
            pool,
            config,
            users: Arc::new(users),
            unread: Arc::new(unread),
        }
    }
}

/// 组装完整路由（不含限流与 CORS，由 main 添加）
pub fn app(state: AppState) -> Router {
    let base = state.config.api_base_uri.trim_end_matches('/').to_string();
    let api = routes::api_routes(state.clone());

    // axum 不允许在根路径 nest
    let router = if base.is_empty() {
        api
    } else {
        Router::new().nest(&base, api)
    };

    router
        .layer(axum::middleware::from_fn(middleware::log_errors))
        .with_state(state)
}
