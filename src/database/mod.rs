// 数据库模块
// 表结构与迁移由外部数据服务维护，这里只做查询

pub mod models;
pub mod operations;

pub use models::{Participation, User};
pub use operations::{ConversationOperation, ReadMarker, UserOperation};
