use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// 用户在某个会话中的参与记录（未退出）
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct Participation {
    pub conversation_id: Uuid,
    /// 已读水位，为空表示从未读过
    pub last_read_at: Option<DateTime<Utc>>,
}

impl Participation {
    /// 未读统计的起点，从未读过则从纪元开始
    pub fn unread_since(&self) -> DateTime<Utc> {
        self.last_read_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
    }
}
