//! # Observability Module
//!
//! Logging and request tracing for the Cardbox node:
//!
//! - **Structured Logging**: pretty or JSON output filtered by `EnvFilter`
//! - **Request Tracing**: `x-request-id` propagation into a per-request span
//!
//! ## Usage
//!
//! ```rust,ignore
//! use axum::Router;
//! use cardbox_node::observability::{init_logging, request_id_middleware, LogFormat};
//!
//! init_logging("info", LogFormat::Json);
//!
//! let app: Router<()> = Router::new()
//!     .layer(axum::middleware::from_fn(request_id_middleware));
//! ```

mod logging;
pub mod middleware;

pub use logging::{init_logging, LogFormat};
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
