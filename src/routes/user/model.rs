use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::database::models::user::User;

/// 单次批量查询的上限
pub const MAX_LOOKUP_IDS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct LookupUsersRequest {
    pub user_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct LookupUsersResponse {
    /// 按请求顺序返回，找不到的ID省略
    pub users: Vec<User>,
}
