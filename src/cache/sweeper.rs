use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::ttl::{Cacheable, TtlCache};

/// 可选的后台清理任务，定期删除过期条目
///
/// 不启动时缓存仍然只在读取时惰性过期。
pub fn spawn_sweeper<T>(cache: Arc<TtlCache<T>>, every: Duration) -> JoinHandle<()>
where
    T: Cacheable + Send + 'static,
    T::Id: Send + 'static,
{
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // 第一次 tick 立即返回，跳过
        ticker.tick().await;

        loop {
            ticker.tick().await;
            let removed = cache.purge_expired();
            if removed > 0 {
                tracing::debug!(removed, "Swept expired cache entries");
            }
        }
    })
}
