//! In-memory card collection.

use crate::{CardStore, DeleteAck, InsertAck, Result, StorageError, UpdateAck};
use async_trait::async_trait;
use cardbox_types::{Card, CardDimensions, CardId};
use parking_lot::RwLock;

/// Process-local card collection, kept in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    cards: RwLock<Vec<Card>>,
}

impl MemoryStore {
    /// Creates a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored cards.
    pub fn len(&self) -> usize {
        self.cards.read().len()
    }

    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.cards.read().is_empty()
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn find_all(&self) -> Result<Vec<Card>> {
        Ok(self.cards.read().clone())
    }

    async fn find_one(&self, id: CardId) -> Result<Card> {
        self.cards
            .read()
            .iter()
            .find(|card| card.id == id)
            .cloned()
            .ok_or(StorageError::NotFound)
    }

    async fn insert_one(&self, card: Card) -> Result<InsertAck> {
        let mut cards = self.cards.write();
        if cards.iter().any(|existing| existing.id == card.id) {
            return Err(StorageError::Backend(format!(
                "duplicate key error: _id {}",
                card.id
            )));
        }

        let inserted_id = card.id;
        cards.push(card);
        Ok(InsertAck { inserted_id })
    }

    async fn update_dimensions(
        &self,
        id: CardId,
        dimensions: CardDimensions,
    ) -> Result<UpdateAck> {
        let mut cards = self.cards.write();
        let Some(card) = cards.iter_mut().find(|card| card.id == id) else {
            return Ok(UpdateAck::default());
        };

        let changed = card.width != dimensions.width || card.height != dimensions.height;
        card.set_dimensions(dimensions);

        Ok(UpdateAck {
            matched_count: 1,
            modified_count: u64::from(changed),
            ..Default::default()
        })
    }

    async fn delete_one(&self, id: CardId) -> Result<DeleteAck> {
        let mut cards = self.cards.write();
        let before = cards.len();
        cards.retain(|card| card.id != id);

        Ok(DeleteAck {
            deleted_count: (before - cards.len()) as u64,
        })
    }
}
