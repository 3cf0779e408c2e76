//! Cardbox Web View
//!
//! Server-rendered HTML for a single card:
//! - `GET /template/{id}` renders the card detail page
//! - Errors before rendering use the JSON `{"error": ...}` envelope

pub mod error;
pub mod routes;
pub mod templates;

pub use error::WebError;
pub use routes::{web_routes, WebState};
pub use templates::CardTemplate;
