//! # Cardbox Node
//!
//! HTTP service storing cards (a name plus a CSS width and height) in a
//! document store.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │                 Cardbox Node                  │
//! ├───────────────────────────────────────────────┤
//! │  HTTP API      /test, /cards, /cards/{id}     │
//! │  Web Gateway   /template/{id} (HTML)          │
//! ├───────────────────────────────────────────────┤
//! │  StoreHandle   per-operation timeouts         │
//! ├───────────────────────────────────────────────┤
//! │  CardStore     MongoDB or in-memory           │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! cargo run --bin cardbox-node -- --store-uri memory:// --listen-addr 127.0.0.1:8080
//! ```
//!
//! ## Modules
//!
//! - [`api`] - JSON endpoints and the router
//! - [`config`] - Layered configuration (defaults, YAML, environment)
//! - [`lifecycle`] - Startup, serving and graceful shutdown
//! - [`observability`] - Structured logging and request ids
//!
//! ## Example: Serving an in-memory collection
//!
//! ```rust,no_run
//! use cardbox_node::api::{create_router, AppState};
//! use cardbox_node::config::HttpConfig;
//! use cardbox_storage::StoreHandle;
//!
//! let store = StoreHandle::in_memory("devDb", "cards");
//! let router = create_router(AppState::new(store), &HttpConfig::default());
//! ```

pub mod api;
pub mod config;
pub mod lifecycle;
pub mod observability;
