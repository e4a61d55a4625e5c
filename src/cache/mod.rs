// 缓存模块
// 进程内 TTL 缓存，以及基于它的用户资料查询

use std::time::Duration;

pub mod directory;
pub mod sweeper;
pub mod ttl;

pub use directory::{UserDirectory, UserLoader};
pub use sweeper::spawn_sweeper;
pub use ttl::{CacheStats, Cacheable, CachedEntry, TtlCache};

use crate::database::models::user::User;

/// 用户资料缓存有效期，固定 5 分钟
pub const USER_CACHE_TTL: Duration = Duration::from_secs(300);

pub type UserCache = TtlCache<User>;

impl UserCache {
    pub fn for_users() -> Self {
        TtlCache::new(USER_CACHE_TTL)
    }
}
