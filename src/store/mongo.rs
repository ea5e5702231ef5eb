//! MongoDB-backed message store.
//!
//! The driver owns a connection pool; every operation is bounded by the configured
//! request timeout so a slow or partitioned database turns into
//! `StoreError::Unavailable` instead of a hung request.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, DateTime as BsonDateTime};
use mongodb::error::ErrorKind;
use mongodb::options::{ClientOptions, Credential, ServerAddress};
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::instrument;

use crate::config::StoreConfig;

use super::{Message, MessageStore, StoreError};

const APP_NAME: &str = "tritier";

/// Document layout in the messages collection
#[derive(Debug, Serialize, Deserialize)]
struct MessageDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    text: String,
    created_at: BsonDateTime,
}

impl From<MessageDocument> for Message {
    fn from(doc: MessageDocument) -> Self {
        Self {
            id: doc.id.to_hex(),
            text: doc.text,
            created_at: DateTime::<Utc>::from_timestamp_millis(doc.created_at.timestamp_millis())
                .unwrap_or_default(),
        }
    }
}

/// Pooled MongoDB client scoped to one database and collection
#[derive(Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    messages: Collection<MessageDocument>,
    connect_timeout: Duration,
    request_timeout: Duration,
}

impl MongoStore {
    /// Build the client without touching the network.
    ///
    /// The driver connects lazily, so this succeeds even while the database is down.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        let connect_timeout = Duration::from_secs(config.settings.connect_timeout_seconds);
        let request_timeout = Duration::from_secs(config.settings.request_timeout_seconds);

        let mut options = ClientOptions::default();
        options.hosts = vec![ServerAddress::Tcp {
            host: config.host.clone(),
            port: Some(config.port),
        }];
        options.app_name = Some(APP_NAME.to_string());
        options.connect_timeout = Some(connect_timeout);
        options.server_selection_timeout = Some(connect_timeout);

        if let Some(credentials) = &config.credentials {
            let mut credential = Credential::default();
            credential.username = Some(credentials.username.clone());
            credential.password = Some(credentials.password.clone());
            options.credential = Some(credential);
        }

        let client = Client::with_options(options)
            .map_err(|e| StoreError::Unavailable(format!("Invalid client options: {}", e)))?;
        let database = client.database(&config.settings.database);
        let messages = database.collection::<MessageDocument>(&config.settings.collection);

        Ok(Self {
            client,
            database,
            messages,
            connect_timeout,
            request_timeout,
        })
    }

    /// Build the client and verify the database answers within the connect timeout.
    #[instrument(name = "store::connect", skip(config), fields(host = %config.host, port = config.port))]
    pub async fn connect(config: &StoreConfig) -> Result<Self, StoreError> {
        let store = Self::new(config)?;

        match timeout(store.connect_timeout, store.ping_command()).await {
            Ok(Ok(())) => {
                tracing::info!("Connected to document store");
                Ok(store)
            }
            Ok(Err(e)) => Err(StoreError::Unavailable(e.to_string())),
            Err(_) => Err(StoreError::Unavailable(format!(
                "No answer from {}:{} within {}s",
                config.host,
                config.port,
                store.connect_timeout.as_secs()
            ))),
        }
    }

    /// Close pooled connections. Call once the HTTP server has drained.
    pub async fn shutdown(&self) {
        self.client.clone().shutdown().await;
        tracing::info!("Document store connections closed");
    }

    async fn ping_command(&self) -> mongodb::error::Result<()> {
        self.database.run_command(doc! { "ping": 1 }).await.map(|_| ())
    }

    /// Run a store operation under the request timeout
    async fn bounded<T, F>(&self, operation: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        timeout(self.request_timeout, operation)
            .await
            .unwrap_or_else(|_| {
                Err(StoreError::Unavailable(format!(
                    "Operation timed out after {}s",
                    self.request_timeout.as_secs()
                )))
            })
    }
}

/// Connectivity failures are `Unavailable`; anything the server rejected is a write error.
fn classify_write_error(err: mongodb::error::Error) -> StoreError {
    if is_connectivity_error(&err) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::Write(err.to_string())
    }
}

fn is_connectivity_error(err: &mongodb::error::Error) -> bool {
    matches!(
        *err.kind,
        ErrorKind::ServerSelection { .. } | ErrorKind::Io(_)
    )
}

#[async_trait]
impl MessageStore for MongoStore {
    #[instrument(name = "store::insert_message", skip(self, text), fields(len = text.len()))]
    async fn insert_message(&self, text: &str) -> Result<Message, StoreError> {
        let document = MessageDocument {
            id: ObjectId::new(),
            text: text.to_string(),
            created_at: BsonDateTime::now(),
        };

        self.bounded(async {
            self.messages
                .insert_one(&document)
                .await
                .map_err(classify_write_error)
        })
        .await?;

        tracing::debug!(id = %document.id, "Message stored");
        Ok(document.into())
    }

    #[instrument(name = "store::list_messages", skip(self))]
    async fn list_messages(&self) -> Result<Vec<Message>, StoreError> {
        let documents: Vec<MessageDocument> = self
            .bounded(async {
                let cursor = self
                    .messages
                    .find(doc! {})
                    .sort(doc! { "created_at": 1, "_id": 1 })
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))?;
                cursor
                    .try_collect()
                    .await
                    .map_err(|e| StoreError::Unavailable(e.to_string()))
            })
            .await?;

        Ok(documents.into_iter().map(Message::from).collect())
    }

    async fn ping(&self) -> bool {
        match timeout(self.request_timeout, self.ping_command()).await {
            Ok(Ok(())) => true,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Document store ping failed");
                false
            }
            Err(_) => {
                tracing::warn!(
                    timeout_secs = self.request_timeout.as_secs(),
                    "Document store ping timed out"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{StoreCredentials, StoreSettings};

    fn config() -> StoreConfig {
        StoreConfig {
            host: "127.0.0.1".to_string(),
            port: 1,
            credentials: Some(StoreCredentials {
                username: "admin".to_string(),
                password: "secret".to_string(),
            }),
            settings: StoreSettings {
                connect_timeout_seconds: 1,
                request_timeout_seconds: 1,
                ..StoreSettings::default()
            },
        }
    }

    #[test]
    fn test_document_converts_to_message() {
        let id = ObjectId::new();
        let created_at = BsonDateTime::from_millis(1_700_000_000_123);
        let message = Message::from(MessageDocument {
            id,
            text: "hello".to_string(),
            created_at,
        });
        assert_eq!(message.id, id.to_hex());
        assert_eq!(message.text, "hello");
        assert_eq!(message.created_at.timestamp_millis(), 1_700_000_000_123);
    }

    #[tokio::test]
    async fn test_new_does_not_require_a_reachable_server() {
        assert!(MongoStore::new(&config()).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let err = MongoStore::connect(&config()).await.err().unwrap();
        assert!(matches!(err, StoreError::Unavailable(_)));

        let store = MongoStore::new(&config()).unwrap();
        assert!(!store.ping().await);
        assert!(matches!(
            store.list_messages().await,
            Err(StoreError::Unavailable(_))
        ));
    }
}
