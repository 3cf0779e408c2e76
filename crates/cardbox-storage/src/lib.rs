//! Document store adapter for Cardbox.
//!
//! This crate exposes the card collection through the [`CardStore`] trait
//! and opens it with [`connect`]. Two backends are provided:
//!
//! - [`MemoryStore`]: process-local, selected by `memory://` URIs
//! - `MongoStore`: MongoDB, selected by `mongodb://` and `mongodb+srv://`
//!   URIs (feature `mongodb-backend`)
//!
//! Every handle returned by [`connect`] is bound to one database and one
//! collection.

mod ack;
mod error;
mod handle;
mod memory;
#[cfg(feature = "mongodb-backend")]
mod mongo;
mod traits;

pub use ack::{DeleteAck, InsertAck, UpdateAck};
pub use error::{ConnectionError, StorageError};
pub use handle::{connect, StoreHandle};
pub use memory::MemoryStore;
#[cfg(feature = "mongodb-backend")]
pub use mongo::MongoStore;
pub use traits::CardStore;

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;
