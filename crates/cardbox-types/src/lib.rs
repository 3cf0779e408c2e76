//! Common types used throughout `cardbox`.
//!
//! This crate provides the card model shared by the storage adapter,
//! the HTTP handlers and the detail view:
//!
//! - [`CardId`]: the 12-byte identifier assigned when a card is created
//! - [`Card`]: a stored card as it appears on the wire and in the store
//! - [`NewCard`] and [`CardDimensions`]: create and update payloads
//! - [`validate_new_card`]: the create-time validation rule

mod card;
mod id;

pub use card::{validate_new_card, Card, CardDimensions, InvalidCard, NewCard, MIN_FIELD_LENGTH};
pub use id::{CardId, IdError};
