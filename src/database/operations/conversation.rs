// 会话参与与未读统计相关的数据库操作

use std::future::Future;

use chrono::{DateTime, Utc};
use sqlx::{Error as SqlxError, PgPool};
use uuid::Uuid;

use crate::database::models::conversation::Participation;
use crate::unread::UnreadStore;

/// 推进已读水位
pub trait ReadMarker {
    /// 只作用于未退出的参与者，返回是否有记录被更新
    fn mark_read(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> impl Future<Output = Result<bool, SqlxError>> + Send;
}

pub struct ConversationOperation {
    db: PgPool,
}

impl ConversationOperation {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

impl ReadMarker for ConversationOperation {
    // 按 (conversation_id, user_id) 冲突更新为当前时间
    async fn mark_read(&self, conversation_id: Uuid, user_id: Uuid) -> Result<bool, SqlxError> {
        let updated = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO conversation_participants (conversation_id, user_id, last_read_at)
            SELECT conversation_id, user_id, NOW()
            FROM conversation_participants
            WHERE conversation_id = $1 AND user_id = $2 AND left_at IS NULL
            ON CONFLICT (conversation_id, user_id)
            DO UPDATE SET last_read_at = EXCLUDED.last_read_at
            RETURNING conversation_id
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.db)
        .await?;

        Ok(updated.is_some())
    }
}

impl UnreadStore for ConversationOperation {
    async fn total_unread(&self, user_id: Uuid) -> Result<Option<i64>, SqlxError> {
        // 服务端聚合函数可能尚未部署，出错由上层回退
        sqlx::query_scalar::<_, Option<i64>>("SELECT get_unread_message_count($1)::BIGINT")
            .bind(user_id)
            .fetch_one(&self.db)
            .await
    }

    async fn active_participations(&self, user_id: Uuid) -> Result<Vec<Participation>, SqlxError> {
        sqlx::query_as::<_, Participation>(
            r#"
            SELECT conversation_id, last_read_at
            FROM conversation_participants
            WHERE user_id = $1 AND left_at IS NULL
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await
    }

    async fn count_unread_in(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
        since: DateTime<Utc>,
    ) -> Result<i64, SqlxError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM messages
            WHERE conversation_id = $1
                AND sender_id <> $2
                AND deleted_at IS NULL
                AND created_at > $3
            "#,
        )
        .bind(conversation_id)
        .bind(user_id)
        .bind(since)
        .fetch_one(&self.db)
        .await
    }
}
