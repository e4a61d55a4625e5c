// 带缓存的用户资料查询
// 先查缓存，缺失的ID一次性批量加载后回填

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use uuid::Uuid;

use super::UserCache;
use crate::database::models::user::User;

/// 用户资料的批量数据源
pub trait UserLoader {
    fn load_users(
        &self,
        ids: &[Uuid],
    ) -> impl Future<Output = Result<Vec<User>, sqlx::Error>> + Send;
}

pub struct UserDirectory<L> {
    cache: Arc<UserCache>,
    loader: L,
}

impl<L: UserLoader> UserDirectory<L> {
    pub fn new(cache: Arc<UserCache>, loader: L) -> Self {
        Self { cache, loader }
    }

    pub fn cache(&self) -> &Arc<UserCache> {
        &self.cache
    }

    /// 返回能找到的用户；数据库中也不存在的ID被省略
    pub async fn resolve_many(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, User>, sqlx::Error> {
        // 先取命中部分；两次调用之间若有条目过期，只会多加载一次
        let mut users = self.cache.get_many(ids);
        let missing = self.cache.get_missing(ids);

        if !missing.is_empty() {
            let loaded = self.loader.load_users(&missing).await?;
            tracing::debug!(
                requested = ids.len(),
                missing = missing.len(),
                loaded = loaded.len(),
                "Loaded users on cache miss"
            );
            self.cache.put_many(loaded.iter().cloned());
            users.extend(loaded.into_iter().map(|user| (user.id, user)));
        }

        Ok(users)
    }

    pub async fn resolve(&self, id: Uuid) -> Result<Option<User>, sqlx::Error> {
        if let Some(user) = self.cache.get(&id) {
            return Ok(Some(user));
        }

        let mut users = self.resolve_many(&[id]).await?;
        Ok(users.remove(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::cache::USER_CACHE_TTL;

    #[derive(Default)]
    struct FakeLoader {
        rows: Vec<User>,
        calls: Mutex<Vec<Vec<Uuid>>>,
    }

    impl UserLoader for FakeLoader {
        async fn load_users(&self, ids: &[Uuid]) -> Result<Vec<User>, sqlx::Error> {
            self.calls.lock().unwrap().push(ids.to_vec());
            Ok(self
                .rows
                .iter()
                .filter(|u| ids.contains(&u.id))
                .cloned()
                .collect())
        }
    }

    fn user(email: &str) -> User {
        User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            display_name: None,
            avatar_url: None,
        }
    }

    fn directory(rows: Vec<User>) -> UserDirectory<FakeLoader> {
        UserDirectory::new(
            Arc::new(UserCache::new(USER_CACHE_TTL)),
            FakeLoader {
                rows,
                ..Default::default()
            },
        )
    }

    #[tokio::test(start_paused = true)]
    async fn loads_only_missing_ids_and_backfills() {
        let a = user("a@care.test");
        let b = user("b@care.test");
        let dir = directory(vec![a.clone(), b.clone()]);
        dir.cache().put(a.clone());

        let found = dir.resolve_many(&[a.id, b.id]).await.unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found[&b.id], b);
        assert_eq!(*dir.loader.calls.lock().unwrap(), vec![vec![b.id]]);
        assert_eq!(dir.cache().get(&b.id), Some(b));
    }

    #[tokio::test(start_paused = true)]
    async fn warm_cache_skips_loader() {
        let a = user("a@care.test");
        let dir = directory(vec![a.clone()]);
        dir.resolve(a.id).await.unwrap();

        let again = dir.resolve(a.id).await.unwrap();

        assert_eq!(again, Some(a));
        assert_eq!(dir.loader.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_ids_are_omitted() {
        let dir = directory(Vec::new());
        let ghost = Uuid::new_v4();

        assert!(dir.resolve_many(&[ghost]).await.unwrap().is_empty());
        assert_eq!(dir.resolve(ghost).await.unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_reloaded() {
        let a = user("a@care.test");
        let dir = directory(vec![a.clone()]);
        dir.resolve(a.id).await.unwrap();

        tokio::time::advance(USER_CACHE_TTL + Duration::from_secs(1)).await;
        dir.resolve(a.id).await.unwrap();

        assert_eq!(dir.loader.calls.lock().unwrap().len(), 2);
    }
}
