//! Opening the store and the handle shared by request handlers.

use crate::{
    CardStore, ConnectionError, DeleteAck, InsertAck, MemoryStore, Result, StorageError,
    UpdateAck,
};
use cardbox_types::{Card, CardDimensions, CardId};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default per-operation budget when none is configured.
const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);

/// A connection bound to one database/collection pair.
///
/// Cloning is cheap; all clones share the same backend. Every operation is
/// bounded by the handle's operation timeout.
#[derive(Clone)]
pub struct StoreHandle {
    store: Arc<dyn CardStore>,
    database: String,
    collection: String,
    operation_timeout: Duration,
}

impl std::fmt::Debug for StoreHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreHandle")
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("operation_timeout", &self.operation_timeout)
            .finish_non_exhaustive()
    }
}

impl StoreHandle {
    /// Wraps an already opened backend.
    pub fn new(
        store: Arc<dyn CardStore>,
        database: impl Into<String>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            store,
            database: database.into(),
            collection: collection.into(),
            operation_timeout: DEFAULT_OPERATION_TIMEOUT,
        }
    }

    /// A fresh, empty in-memory collection.
    pub fn in_memory(database: impl Into<String>, collection: impl Into<String>) -> Self {
        Self::new(Arc::new(MemoryStore::new()), database, collection)
    }

    /// Sets the budget applied to each store operation.
    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = timeout;
        self
    }

    /// Database name this handle is bound to.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Collection name this handle is bound to.
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Per-operation budget.
    pub fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    async fn bounded<T>(&self, operation: impl Future<Output = Result<T>>) -> Result<T> {
        tokio::time::timeout(self.operation_timeout, operation)
            .await
            .unwrap_or(Err(StorageError::Timeout))
    }

    /// Probes the backend for liveness.
    pub async fn ping(&self) -> Result<()> {
        self.bounded(self.store.ping()).await
    }

    /// Returns every card in the collection.
    pub async fn find_all(&self) -> Result<Vec<Card>> {
        self.bounded(self.store.find_all()).await
    }

    /// Returns the card with the given id.
    pub async fn find_one(&self, id: CardId) -> Result<Card> {
        self.bounded(self.store.find_one(id)).await
    }

    /// Inserts a card that already carries its id.
    pub async fn insert_one(&self, card: Card) -> Result<InsertAck> {
        self.bounded(self.store.insert_one(card)).await
    }

    /// Overwrites width and height of the card with the given id.
    pub async fn update_dimensions(
        &self,
        id: CardId,
        dimensions: CardDimensions,
    ) -> Result<UpdateAck> {
        self.bounded(self.store.update_dimensions(id, dimensions))
            .await
    }

    /// Deletes the card with the given id.
    pub async fn delete_one(&self, id: CardId) -> Result<DeleteAck> {
        self.bounded(self.store.delete_one(id)).await
    }

    /// Releases backend resources.
    pub async fn close(&self) {
        self.store.close().await;
    }
}

/// Opens the store at `uri` and probes it within `timeout`.
///
/// The backend is chosen from the URI scheme. Every failure, including an
/// unknown scheme, collapses into [`ConnectionError`].
pub async fn connect(
    uri: &str,
    database: &str,
    collection: &str,
    timeout: Duration,
) -> std::result::Result<StoreHandle, ConnectionError> {
    let attempt = async {
        let store = open_backend(uri, database, collection, timeout).await?;
        store.ping().await?;
        Ok::<_, StorageError>(store)
    };

    let store = match tokio::time::timeout(timeout, attempt).await {
        Ok(Ok(store)) => store,
        Ok(Err(e)) => {
            tracing::debug!(uri = %uri, error = %e, "Store connection failed");
            return Err(ConnectionError);
        }
        Err(_) => {
            tracing::debug!(uri = %uri, timeout = ?timeout, "Store connection timed out");
            return Err(ConnectionError);
        }
    };

    tracing::info!(uri = %uri, database = %database, collection = %collection, "Store connected");
    Ok(StoreHandle::new(store, database, collection))
}

#[cfg_attr(not(feature = "mongodb-backend"), allow(unused_variables))]
async fn open_backend(
    uri: &str,
    database: &str,
    collection: &str,
    timeout: Duration,
) -> Result<Arc<dyn CardStore>> {
    let scheme = uri.split_once("://").map(|(scheme, _)| scheme);
    match scheme {
        Some("memory") => Ok(Arc::new(MemoryStore::new())),
        #[cfg(feature = "mongodb-backend")]
        Some("mongodb") | Some("mongodb+srv") => {
            let store = crate::MongoStore::open(uri, database, collection, timeout).await?;
            Ok(Arc::new(store))
        }
        _ => Err(StorageError::Backend(format!("unsupported store uri: {uri}"))),
    }
}
