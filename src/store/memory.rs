//! In-process message store.
//!
//! Keeps messages in insertion order behind a mutex. Reachability can be toggled so
//! tests can exercise the unavailable paths without a database.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;

use super::{Message, MessageStore, StoreError};

pub struct MemoryStore {
    messages: Mutex<Vec<Message>>,
    next_id: AtomicU64,
    available: AtomicBool,
    reject_writes: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            messages: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            available: AtomicBool::new(true),
            reject_writes: AtomicBool::new(false),
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate the store going down or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Simulate a store that is reachable but refuses writes.
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Number of stored messages.
    pub async fn len(&self) -> usize {
        self.messages.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("in-memory store is offline".to_string()))
        }
    }
}

#[async_trait]
impl MessageStore for MemoryStore {
    async fn insert_message(&self, text: &str) -> Result<Message, StoreError> {
        self.check_available()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Write("in-memory store rejects writes".to_string()));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let message = Message {
            id: format!("{:024x}", id),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.messages.lock().await.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        self.check_available()?;
        Ok(self.messages.lock().await.clone())
    }

    async fn ping(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_list_in_order() {
        let store = MemoryStore::new();
        let first = store.insert_message("a").await.unwrap();
        let second = store.insert_message("b").await.unwrap();
        assert_ne!(first.id, second.id);

        let listed = store.list_messages().await.unwrap();
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let store = MemoryStore::new();
        assert!(store.list_messages().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_offline_store() {
        let store = MemoryStore::new();
        store.set_available(false);
        assert!(!store.ping().await);
        assert!(matches!(
            store.list_messages().await,
            Err(StoreError::Unavailable(_))
        ));
        assert!(matches!(
            store.insert_message("x").await,
            Err(StoreError::Unavailable(_))
        ));

        store.set_available(true);
        assert!(store.ping().await);
    }

    #[tokio::test]
    async fn test_rejected_write_stores_nothing() {
        let store = MemoryStore::new();
        store.set_reject_writes(true);
        assert!(matches!(
            store.insert_message("x").await,
            Err(StoreError::Write(_))
        ));
        assert!(store.is_empty().await);
    }
}
