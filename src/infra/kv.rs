//! In-process key-value store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::application::kv::{KvError, KvStore};

#[derive(Debug, Clone)]
struct KvEntry {
    value: String,
    expires_at: Option<Instant>,
}

impl KvEntry {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }
}

/// [`KvStore`] backed by a sharded map. Expired entries are dropped when read.
#[derive(Debug, Clone, Default)]
pub struct MemoryKvStore {
    entries: Arc<DashMap<String, KvEntry>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(key) {
            if !entry.is_expired(now) {
                return Ok(Some(entry.value.clone()));
            }
        }
        self.entries.remove_if(key, |_, entry| entry.is_expired(now));
        Ok(None)
    }

    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), KvError> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        self.entries
            .insert(key.to_string(), KvEntry { value, expires_at });
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), KvError> {
        self.entries.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn values_survive_until_ttl_elapses() {
        let store = MemoryKvStore::new();
        store
            .put("code:a@mail.test", "123456".into(), Some(Duration::from_millis(40)))
            .await
            .unwrap();

        assert_eq!(
            store.get("code:a@mail.test").await.unwrap().as_deref(),
            Some("123456")
        );

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(store.get("code:a@mail.test").await.unwrap(), None);
        assert!(store.entries.is_empty());
    }

    #[tokio::test]
    async fn entries_without_ttl_do_not_expire() {
        let store = MemoryKvStore::new();
        store.put("flag", "on".into(), None).await.unwrap();
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert_eq!(store.get("flag").await.unwrap().as_deref(), Some("on"));
    }

    #[tokio::test]
    async fn delete_removes_the_entry() {
        let store = MemoryKvStore::new();
        store.put("flag", "on".into(), None).await.unwrap();
        store.delete("flag").await.unwrap();
        store.delete("missing").await.unwrap();
        assert_eq!(store.get("flag").await.unwrap(), None);
    }
}
