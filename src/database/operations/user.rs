// 用户资料查询

use sqlx::{Error as SqlxError, PgPool};
use uuid::Uuid;

use crate::cache::UserLoader;
use crate::database::models::user::User;

pub struct UserOperation {
    db: PgPool,
}

impl UserOperation {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// 批量按ID查询，不存在的ID直接忽略
    pub async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, SqlxError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, display_name, avatar_url
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(&self.db)
        .await
    }
}

impl UserLoader for UserOperation {
    async fn load_users(&self, ids: &[Uuid]) -> Result<Vec<User>, SqlxError> {
        self.find_by_ids(ids).await
    }
}
