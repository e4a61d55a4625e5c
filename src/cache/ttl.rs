// 进程内 TTL 缓存
// 读取时惰性判断过期，发现过期即删除；不做定时淘汰（见 sweeper）

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;

/// 可被缓存的实体，需提供唯一ID
pub trait Cacheable: Clone {
    type Id: Eq + Hash + Clone;

    fn cache_id(&self) -> Self::Id;
}

/// 缓存条目：实体 + 写入时间
#[derive(Debug, Clone)]
pub struct CachedEntry<T> {
    pub value: T,
    pub timestamp: Instant,
}

impl<T> CachedEntry<T> {
    /// now - timestamp <= ttl 视为有效
    fn is_fresh(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.timestamp) <= ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub size: usize,
    pub valid_entries: usize,
}

pub struct TtlCache<T: Cacheable> {
    ttl: Duration,
    entries: Mutex<HashMap<T::Id, CachedEntry<T>>>,
}

impl<T: Cacheable> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    // 缓存本身不会失败，锁中毒时直接沿用内部数据
    fn lock(&self) -> MutexGuard<'_, HashMap<T::Id, CachedEntry<T>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// 命中且未过期时返回实体；过期条目在此处被删除
    pub fn get(&self, id: &T::Id) -> Option<T> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(id) {
            Some(entry) if entry.is_fresh(now, self.ttl) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(id);
                None
            }
            None => None,
        }
    }

    /// 写入或覆盖，后写者胜
    pub fn put(&self, value: T) {
        let now = Instant::now();
        self.lock().insert(
            value.cache_id(),
            CachedEntry {
                value,
                timestamp: now,
            },
        );
    }

    /// 同一批次共享一个时间戳，一起过期
    pub fn put_many<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        for value in values {
            entries.insert(
                value.cache_id(),
                CachedEntry {
                    value,
                    timestamp: now,
                },
            );
        }
    }

    /// 只返回命中且未过期的部分，缺失的由调用方重新加载
    pub fn get_many<'a, I>(&self, ids: I) -> HashMap<T::Id, T>
    where
        I: IntoIterator<Item = &'a T::Id>,
        T::Id: 'a,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        let mut found = HashMap::new();

        for id in ids {
            match entries.get(id) {
                Some(entry) if entry.is_fresh(now, self.ttl) => {
                    found.insert(id.clone(), entry.value.clone());
                }
                Some(_) => {
                    entries.remove(id);
                }
                None => {}
            }
        }

        found
    }

    /// get_many 的补集：缺失或已过期的ID，保持请求顺序
    pub fn get_missing<'a, I>(&self, ids: I) -> Vec<T::Id>
    where
        I: IntoIterator<Item = &'a T::Id>,
        T::Id: 'a,
    {
        let now = Instant::now();
        let mut entries = self.lock();
        let mut missing = Vec::new();

        for id in ids {
            match entries.get(id) {
                Some(entry) if entry.is_fresh(now, self.ttl) => {}
                Some(_) => {
                    entries.remove(id);
                    missing.push(id.clone());
                }
                None => missing.push(id.clone()),
            }
        }

        missing
    }

    /// 资料变更后单独失效
    pub fn remove(&self, id: &T::Id) -> bool {
        self.lock().remove(id).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// 全量扫描，只读，不删除过期条目
    pub fn stats(&self) -> CacheStats {
        let now = Instant::now();
        let entries = self.lock();

        CacheStats {
            size: entries.len(),
            valid_entries: entries
                .values()
                .filter(|entry| entry.is_fresh(now, self.ttl))
                .count(),
        }
    }

    /// 删除所有过期条目，返回删除数量
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.is_fresh(now, self.ttl));
        before - entries.len()
    }
}
