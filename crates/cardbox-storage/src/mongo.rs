//! MongoDB card collection.

use crate::{CardStore, DeleteAck, InsertAck, Result, StorageError, UpdateAck};
use async_trait::async_trait;
use cardbox_types::{Card, CardDimensions, CardId};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection, Database};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Persisted layout of a card: `{_id, name, width, height}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CardDocument {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    width: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    height: String,
}

impl From<Card> for CardDocument {
    fn from(card: Card) -> Self {
        Self {
            id: ObjectId::from_bytes(card.id.bytes()),
            name: card.name,
            width: card.width,
            height: card.height,
        }
    }
}

impl From<CardDocument> for Card {
    fn from(doc: CardDocument) -> Self {
        Card {
            id: CardId::from_bytes(doc.id.bytes()),
            name: doc.name,
            width: doc.width,
            height: doc.height,
        }
    }
}

fn id_filter(id: CardId) -> Document {
    doc! { "_id": ObjectId::from_bytes(id.bytes()) }
}

fn backend(err: mongodb::error::Error) -> StorageError {
    StorageError::Backend(err.to_string())
}

/// A card collection in MongoDB.
#[derive(Debug, Clone)]
pub struct MongoStore {
    client: Client,
    database: Database,
    collection: Collection<CardDocument>,
}

impl MongoStore {
    /// Builds a client for `uri` bound to `database.collection`.
    ///
    /// No I/O happens here; call [`CardStore::ping`] to probe the server.
    pub async fn open(
        uri: &str,
        database: &str,
        collection: &str,
        timeout: Duration,
    ) -> Result<Self> {
        let mut options = ClientOptions::parse(uri).await.map_err(backend)?;
        options.connect_timeout = Some(timeout);
        options.server_selection_timeout = Some(timeout);
        options.app_name = Some("cardbox".to_string());

        let client = Client::with_options(options).map_err(backend)?;
        let database = client.database(database);
        let collection = database.collection::<CardDocument>(collection);

        Ok(Self {
            client,
            database,
            collection,
        })
    }
}

#[async_trait]
impl CardStore for MongoStore {
    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map(|_| ())
            .map_err(backend)
    }

    async fn find_all(&self) -> Result<Vec<Card>> {
        let cursor = self.collection.find(doc! {}).await.map_err(backend)?;
        let docs: Vec<CardDocument> = cursor
            .try_collect()
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?;
        Ok(docs.into_iter().map(Card::from).collect())
    }

    async fn find_one(&self, id: CardId) -> Result<Card> {
        self.collection
            .find_one(id_filter(id))
            .await
            .map_err(|e| StorageError::Decode(e.to_string()))?
            .map(Card::from)
            .ok_or(StorageError::NotFound)
    }

    async fn insert_one(&self, card: Card) -> Result<InsertAck> {
        let inserted_id = card.id;
        self.collection
            .insert_one(CardDocument::from(card))
            .await
            .map_err(backend)?;
        Ok(InsertAck { inserted_id })
    }

    async fn update_dimensions(
        &self,
        id: CardId,
        dimensions: CardDimensions,
    ) -> Result<UpdateAck> {
        let update = doc! {
            "$set": {
                "width": dimensions.width,
                "height": dimensions.height,
            }
        };
        let result = self
            .collection
            .update_one(id_filter(id), update)
            .await
            .map_err(backend)?;

        Ok(UpdateAck {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: None,
        })
    }

    async fn delete_one(&self, id: CardId) -> Result<DeleteAck> {
        let result = self
            .collection
            .delete_one(id_filter(id))
            .await
            .map_err(backend)?;
        Ok(DeleteAck {
            deleted_count: result.deleted_count,
        })
    }

    async fn close(&self) {
        self.client.clone().shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_conversion_keeps_id_bytes() {
        let card = Card::new(CardId::generate(), "Card", "111px", "222px");
        let doc = CardDocument::from(card.clone());
        assert_eq!(doc.id.to_hex(), card.id.to_hex());
        assert_eq!(Card::from(doc), card);
    }

    #[test]
    fn test_id_filter_uses_object_id() {
        let id = CardId::from_bytes([0xab; 12]);
        let filter = id_filter(id);
        let oid = filter.get_object_id("_id").unwrap();
        assert_eq!(oid.to_hex(), "abababababababababababab");
    }

    #[tokio::test]
    async fn test_open_rejects_malformed_uri() {
        let result = MongoStore::open(
            "postgres://localhost:5432/",
            "testDb",
            "cards",
            Duration::from_secs(1),
        )
        .await;
        assert!(matches!(result, Err(StorageError::Backend(_))));
    }
}
