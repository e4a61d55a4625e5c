use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::cache::Cacheable;

/// 用户资料，对应 users 表
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

impl Cacheable for User {
    type Id = Uuid;

    fn cache_id(&self) -> Uuid {
        self.id
    }
}
