//! Document store adapter.
//!
//! Messages live in an external document database. The rest of the service talks to
//! it only through [`MessageStore`], so handlers and services never see the driver.
//! [`mongo::MongoStore`] is the production backend; [`memory::MemoryStore`] keeps
//! everything in process and is used by tests and local runs without a database.

pub mod memory;
pub mod mongo;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub use memory::MemoryStore;
pub use mongo::MongoStore;

/// A stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Opaque identifier assigned by the store
    pub id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Error type for store operations
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    /// The store could not be reached or did not answer in time
    #[error("Document store unavailable: {0}")]
    Unavailable(String),

    /// The store was reached but rejected the write
    #[error("Failed to write message: {0}")]
    Write(String),
}

#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a new message and return the stored record.
    async fn insert_message(&self, text: &str) -> Result<Message, StoreError>;

    /// All messages, oldest first. Empty when nothing has been stored.
    async fn list_messages(&self) -> Result<Vec<Message>, StoreError>;

    /// Reachability check for readiness probes. Never fails; any error is `false`.
    async fn ping(&self) -> bool;
}
