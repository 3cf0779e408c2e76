//! Store backend trait.
//!
//! Defines the interface that every card collection backend implements.

use crate::{DeleteAck, InsertAck, Result, UpdateAck};
use async_trait::async_trait;
use cardbox_types::{Card, CardDimensions, CardId};
use std::sync::Arc;

/// A card collection in a document store.
///
/// Implementations must be safe for concurrent use; handlers share one
/// instance without additional locking.
#[async_trait]
pub trait CardStore: Send + Sync {
    /// Probes the backend for liveness.
    async fn ping(&self) -> Result<()>;

    /// Returns every card in the collection.
    async fn find_all(&self) -> Result<Vec<Card>>;

    /// Returns the card with the given id, or [`StorageError::NotFound`].
    ///
    /// [`StorageError::NotFound`]: crate::StorageError::NotFound
    async fn find_one(&self, id: CardId) -> Result<Card>;

    /// Inserts a card. The card must already carry its id.
    async fn insert_one(&self, card: Card) -> Result<InsertAck>;

    /// Sets `width` and `height` on the card with the given id.
    ///
    /// An unknown id matches nothing and is not an error.
    async fn update_dimensions(&self, id: CardId, dimensions: CardDimensions)
        -> Result<UpdateAck>;

    /// Deletes the card with the given id.
    ///
    /// An unknown id deletes nothing and is not an error.
    async fn delete_one(&self, id: CardId) -> Result<DeleteAck>;

    /// Releases backend resources.
    async fn close(&self) {}
}

#[async_trait]
impl<T: CardStore + ?Sized> CardStore for Arc<T> {
    async fn ping(&self) -> Result<()> {
        (**self).ping().await
    }

    async fn find_all(&self) -> Result<Vec<Card>> {
        (**self).find_all().await
    }

    async fn find_one(&self, id: CardId) -> Result<Card> {
        (**self).find_one(id).await
    }

    async fn insert_one(&self, card: Card) -> Result<InsertAck> {
        (**self).insert_one(card).await
    }

    async fn update_dimensions(
        &self,
        id: CardId,
        dimensions: CardDimensions,
    ) -> Result<UpdateAck> {
        (**self).update_dimensions(id, dimensions).await
    }

    async fn delete_one(&self, id: CardId) -> Result<DeleteAck> {
        (**self).delete_one(id).await
    }

    async fn close(&self) {
        (**self).close().await
    }
}
