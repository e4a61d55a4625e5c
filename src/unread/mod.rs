// 未读消息统计
// 优先走服务端聚合函数，不可用时逐会话统计再求和

mod aggregator;

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::database::models::conversation::Participation;

pub use aggregator::UnreadAggregator;

/// 未读统计所需的查询接口
pub trait UnreadStore {
    /// 服务端预聚合的总未读数；返回 None 表示聚合不可用
    fn total_unread(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Option<i64>, sqlx::Error>> + Send;

    /// 用户仍在其中的会话及其已读水位
    fn active_participations(
        &self,
        user_id: Uuid,
    ) -> impl Future<Output = Result<Vec<Participation>, sqlx::Error>> + Send;

    /// 单个会话中 since 之后、他人发送且未删除的消息数
    fn count_unread_in(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> impl Future<Output = Result<i64, sqlx::Error>> + Send;
}

#[derive(Debug, thiserror::Error)]
pub enum UnreadError {
    #[error("unread count unavailable for user {user_id}: {source}")]
    Unavailable {
        user_id: Uuid,
        source: sqlx::Error,
    },
    #[error("conversation {conversation_id} reported a negative unread count {count} for user {user_id}")]
    InvalidCount {
        user_id: Uuid,
        conversation_id: Uuid,
        count: i64,
    },
}
