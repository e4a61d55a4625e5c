use std::sync::Arc;

use futures_util::{StreamExt, TryStreamExt, stream};
use uuid::Uuid;

use super::{UnreadError, UnreadStore};

pub struct UnreadAggregator<S> {
    store: Arc<S>,
    fallback_concurrency: usize,
}

impl<S> UnreadAggregator<S>
where
    S: UnreadStore + Send + Sync + 'static,
{
    pub fn new(store: S, fallback_concurrency: usize) -> Self {
        Self {
            store: Arc::new(store),
            fallback_concurrency: fallback_concurrency.max(1),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// 用户在所有会话中的未读消息总数
    ///
    /// 服务端聚合失败或返回空值时回退到逐会话统计。回退过程中任一查询失败，
    /// 整体返回 [`UnreadError::Unavailable`]，不会以 0 代替。
    pub async fn unread_count_for(&self, user_id: Uuid) -> Result<u64, UnreadError> {
        match self.store.total_unread(user_id).await {
            Ok(Some(total)) if total >= 0 => {
                tracing::debug!(%user_id, count = total, "Unread count from server aggregate");
                return Ok(total as u64);
            }
            Ok(Some(total)) => {
                tracing::warn!(%user_id, count = total, "Server aggregate returned a negative count, falling back");
            }
            Ok(None) => {
                tracing::debug!(%user_id, "Server aggregate returned null, falling back");
            }
            Err(e) => {
                tracing::warn!(%user_id, error = %e, "Server aggregate failed, falling back");
            }
        }

        self.count_per_conversation(user_id).await
    }

    async fn count_per_conversation(&self, user_id: Uuid) -> Result<u64, UnreadError> {
        let unavailable = |source| UnreadError::Unavailable { user_id, source };

        let participations = self
            .store
            .active_participations(user_id)
            .await
            .map_err(unavailable)?;

        if participations.is_empty() {
            return Ok(0);
        }

        let conversations = participations.len();
        let total = stream::iter(participations)
            .map(move |p| {
                // 每个统计任务持有 store 的引用计数
                let store = Arc::clone(&self.store);
                async move {
                    let count = store
                        .count_unread_in(p.conversation_id, user_id, p.unread_since())
                        .await
                        .map_err(unavailable)?;
                    u64::try_from(count).map_err(|_| UnreadError::InvalidCount {
                        user_id,
                        conversation_id: p.conversation_id,
                        count,
                    })
                }
            })
            .buffer_unordered(self.fallback_concurrency)
            .try_fold(0u64, |acc, count| async move { Ok(acc + count) })
            .await?;

        tracing::debug!(%user_id, conversations, count = total, "Unread count from per-conversation fallback");
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{DateTime, Duration, TimeZone, Utc};

    use super::*;
    use crate::database::models::conversation::Participation;

    enum Aggregate {
        Value(i64),
        Null,
        Fails,
    }

    struct Message {
        conversation_id: Uuid,
        sender_id: Uuid,
        created_at: DateTime<Utc>,
        deleted: bool,
    }

    struct FakeStore {
        aggregate: Aggregate,
        participations: Vec<Participation>,
        messages: Vec<Message>,
        failing: HashSet<Uuid>,
        reported: HashMap<Uuid, i64>,
        participation_calls: AtomicUsize,
        count_calls: AtomicUsize,
    }

    impl FakeStore {
        fn new(aggregate: Aggregate) -> Self {
            Self {
                aggregate,
                participations: Vec::new(),
                messages: Vec::new(),
                failing: HashSet::new(),
                reported: HashMap::new(),
                participation_calls: AtomicUsize::new(0),
                count_calls: AtomicUsize::new(0),
            }
        }

        fn join(&mut self, last_read_at: Option<DateTime<Utc>>) -> Uuid {
            let conversation_id = Uuid::new_v4();
            self.participations.push(Participation {
                conversation_id,
                last_read_at,
            });
            conversation_id
        }

        fn post(&mut self, conversation_id: Uuid, sender_id: Uuid, created_at: DateTime<Utc>, deleted: bool) {
            self.messages.push(Message {
                conversation_id,
                sender_id,
                created_at,
                deleted,
            });
        }
    }

    impl UnreadStore for FakeStore {
        async fn total_unread(&self, _user_id: Uuid) -> Result<Option<i64>, sqlx::Error> {
            match self.aggregate {
                Aggregate::Value(v) => Ok(Some(v)),
                Aggregate::Null => Ok(None),
                Aggregate::Fails => Err(sqlx::Error::Protocol(
                    "function get_unread_message_count(uuid) does not exist".into(),
                )),
            }
        }

        async fn active_participations(&self, _user_id: Uuid) -> Result<Vec<Participation>, sqlx::Error> {
            self.participation_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.participations.clone())
        }

        async fn count_unread_in(
            &self,
            conversation_id: Uuid,
            user_id: Uuid,
            since: DateTime<Utc>,
        ) -> Result<i64, sqlx::Error> {
            self.count_calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(&conversation_id) {
                return Err(sqlx::Error::PoolTimedOut);
            }
            if let Some(count) = self.reported.get(&conversation_id) {
                return Ok(*count);
            }
            Ok(self
                .messages
                .iter()
                .filter(|m| {
                    m.conversation_id == conversation_id
                        && m.sender_id != user_id
                        && !m.deleted
                        && m.created_at > since
                })
                .count() as i64)
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn preferred_path_result_is_returned_as_is() {
        let mut store = FakeStore::new(Aggregate::Value(42));
        let conv = store.join(None);
        store.post(conv, Uuid::new_v4(), t0(), false);
        let aggregator = UnreadAggregator::new(store, 4);

        assert_eq!(aggregator.unread_count_for(Uuid::new_v4()).await.unwrap(), 42);
        assert_eq!(aggregator.store().participation_calls.load(Ordering::SeqCst), 0);
        assert_eq!(aggregator.store().count_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_conversations_yield_zero_without_counting() {
        let aggregator = UnreadAggregator::new(FakeStore::new(Aggregate::Fails), 4);

        assert_eq!(aggregator.unread_count_for(Uuid::new_v4()).await.unwrap(), 0);
        assert_eq!(aggregator.store().participation_calls.load(Ordering::SeqCst), 1);
        assert_eq!(aggregator.store().count_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fallback_sums_across_conversations() {
        let me = Uuid::new_v4();
        let nurse = Uuid::new_v4();
        let mut store = FakeStore::new(Aggregate::Null);

        let c1 = store.join(Some(t0()));
        store.post(c1, nurse, t0() - Duration::hours(1), false); // 已读
        store.post(c1, nurse, t0(), false); // 等于水位不算
        for i in 1..=3 {
            store.post(c1, nurse, t0() + Duration::minutes(i), false);
        }

        // 水位为空，全部算未读
        let c2 = store.join(None);
        for i in 0..5 {
            store.post(c2, nurse, t0() - Duration::days(30) + Duration::minutes(i), false);
        }

        let aggregator = UnreadAggregator::new(store, 2);
        assert_eq!(aggregator.unread_count_for(me).await.unwrap(), 8);
        assert_eq!(aggregator.store().count_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn own_and_deleted_messages_are_excluded() {
        let me = Uuid::new_v4();
        let doctor = Uuid::new_v4();
        let mut store = FakeStore::new(Aggregate::Fails);

        let conv = store.join(Some(t0()));
        store.post(conv, me, t0() + Duration::minutes(1), false);
        store.post(conv, doctor, t0() + Duration::minutes(2), true);
        store.post(conv, doctor, t0() + Duration::minutes(3), false);

        let aggregator = UnreadAggregator::new(store, 4);
        assert_eq!(aggregator.unread_count_for(me).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn negative_aggregate_falls_back() {
        let mut store = FakeStore::new(Aggregate::Value(-1));
        let conv = store.join(None);
        store.post(conv, Uuid::new_v4(), t0(), false);

        let aggregator = UnreadAggregator::new(store, 1);
        assert_eq!(aggregator.unread_count_for(Uuid::new_v4()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn fallback_failure_is_an_error_not_zero() {
        let mut store = FakeStore::new(Aggregate::Fails);
        let ok = store.join(None);
        store.post(ok, Uuid::new_v4(), t0(), false);
        let broken = store.join(None);
        store.failing.insert(broken);

        let user_id = Uuid::new_v4();
        let aggregator = UnreadAggregator::new(store, 4);

        match aggregator.unread_count_for(user_id).await {
            Err(UnreadError::Unavailable { user_id: failed, .. }) => assert_eq!(failed, user_id),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(count) => panic!("expected failure, got {count}"),
        }
    }

    #[tokio::test]
    async fn negative_conversation_count_is_an_error() {
        let mut store = FakeStore::new(Aggregate::Null);
        let ok = store.join(None);
        store.post(ok, Uuid::new_v4(), t0(), false);
        let corrupt = store.join(None);
        store.reported.insert(corrupt, -3);

        let aggregator = UnreadAggregator::new(store, 4);

        match aggregator.unread_count_for(Uuid::new_v4()).await {
            Err(UnreadError::InvalidCount {
                conversation_id,
                count,
                ..
            }) => {
                assert_eq!(conversation_id, corrupt);
                assert_eq!(count, -3);
            }
            Err(other) => panic!("unexpected error: {other}"),
            Ok(total) => panic!("negative count must not be folded into {total}"),
        }
    }
}
