//! Message submission and listing.
//!
//! Validation happens here, before anything reaches the store. Store failures are
//! passed through unchanged; a failed write is reported, never retried.

use std::sync::Arc;

use tracing::instrument;

use crate::config::MAX_MESSAGE_LENGTH;
use crate::store::{Message, MessageStore, StoreError};

#[derive(Debug, Clone, thiserror::Error)]
pub enum MessageError {
    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Clone)]
pub struct MessageService {
    store: Arc<dyn MessageStore>,
}

impl MessageService {
    pub fn new(store: Arc<dyn MessageStore>) -> Self {
        Self { store }
    }

    #[instrument(name = "messages::submit", skip(self, text))]
    pub async fn submit(&self, text: &str) -> Result<Message, MessageError> {
        validate_text(text)?;
        let message = self.store.insert_message(text).await?;
        tracing::info!(id = %message.id, "Message submitted");
        Ok(message)
    }

    #[instrument(name = "messages::list", skip(self))]
    pub async fn list(&self) -> Result<Vec<Message>, MessageError> {
        Ok(self.store.list_messages().await?)
    }
}

fn validate_text(text: &str) -> Result<(), MessageError> {
    if text.trim().is_empty() {
        return Err(MessageError::Validation("Message text is required".into()));
    }
    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(MessageError::Validation(format!(
            "Message too long (max {} characters)",
            MAX_MESSAGE_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn service() -> (Arc<MemoryStore>, MessageService) {
        let store = Arc::new(MemoryStore::new());
        let service = MessageService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_blank_text_is_rejected_without_writing() {
        let (store, messages) = service();
        for text in ["", "   ", "\n\t"] {
            let err = messages.submit(text).await.unwrap_err();
            assert!(matches!(err, MessageError::Validation(_)));
        }
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_overlong_text_is_rejected() {
        let (store, messages) = service();
        let text = "x".repeat(MAX_MESSAGE_LENGTH + 1);
        assert!(matches!(
            messages.submit(&text).await,
            Err(MessageError::Validation(_))
        ));
        assert!(store.is_empty().await);

        let text = "x".repeat(MAX_MESSAGE_LENGTH);
        assert!(messages.submit(&text).await.is_ok());
    }

    #[tokio::test]
    async fn test_submit_then_list() {
        let (_, messages) = service();
        let stored = messages.submit("hello").await.unwrap();
        assert_eq!(stored.text, "hello");

        let listed = messages.list().await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].text, "hello");
    }

    #[tokio::test]
    async fn test_list_preserves_insertion_order() {
        let (_, messages) = service();
        let a = messages.submit("a").await.unwrap();
        let b = messages.submit("b").await.unwrap();
        assert_eq!(messages.list().await.unwrap(), vec![a, b]);
    }

    #[tokio::test]
    async fn test_store_failures_are_surfaced() {
        let (store, messages) = service();

        store.set_reject_writes(true);
        assert!(matches!(
            messages.submit("hello").await,
            Err(MessageError::Store(StoreError::Write(_)))
        ));

        store.set_available(false);
        assert!(matches!(
            messages.list().await,
            Err(MessageError::Store(StoreError::Unavailable(_)))
        ));
    }
}
