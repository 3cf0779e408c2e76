//! HTTP API for the Cardbox node.
//!
//! Each handler parses its input, calls the store and maps the outcome to a
//! status code and a JSON body. Success bodies are the stored document(s)
//! or the store's acknowledgment; failures use `{"error": "<message>"}`.

use axum::{
    body::Bytes,
    extract::{FromRef, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use cardbox_storage::{DeleteAck, InsertAck, StorageError, StoreHandle, UpdateAck};
use cardbox_types::{validate_new_card, Card, CardDimensions, CardId, IdError, InvalidCard, NewCard};
use cardbox_web::{web_routes, WebState};
use serde::{de::DeserializeOwned, Serialize};
use tower_http::timeout::{RequestBodyTimeoutLayer, TimeoutLayer};
use tower_http::trace::TraceLayer;

use crate::config::HttpConfig;
use crate::observability::request_id_middleware;

/// Id of the diagnostic fixture card served at `/test`.
pub const FIXTURE_CARD_ID: CardId = CardId::from_bytes([9, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Card collection.
    pub store: StoreHandle,
}

impl AppState {
    pub fn new(store: StoreHandle) -> Self {
        Self { store }
    }
}

impl FromRef<AppState> for WebState {
    fn from_ref(state: &AppState) -> Self {
        WebState {
            store: state.store.clone(),
        }
    }
}

/// API error type.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidId(#[from] IdError),
    #[error("{0}")]
    InvalidBody(String),
    #[error(transparent)]
    Validation(#[from] InvalidCard),
    #[error("No records found")]
    NoRecords,
    #[error(transparent)]
    NotFound(StorageError),
    #[error(transparent)]
    Store(StorageError),
    #[error("store operation timed out")]
    Timeout,
}

impl ApiError {
    /// Maps a failed write or listing; every failure but a timeout is a 400.
    fn store(err: StorageError) -> Self {
        match err {
            StorageError::Timeout => ApiError::Timeout,
            other => ApiError::Store(other),
        }
    }

    /// Maps a failed single-document read; every failure but a timeout is a 404.
    fn lookup(err: StorageError) -> Self {
        match err {
            StorageError::Timeout => ApiError::Timeout,
            other => ApiError::NotFound(other),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidId(_)
            | ApiError::InvalidBody(_)
            | ApiError::Validation(_)
            | ApiError::Store(_) => StatusCode::BAD_REQUEST,
            ApiError::NoRecords | ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::GATEWAY_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status(),
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Creates the API router.
pub fn create_router(state: AppState, http: &HttpConfig) -> Router {
    Router::new()
        .route("/test", get(diagnostic_fixture))
        .route("/cards", get(list_cards).post(create_card))
        .route(
            "/cards/{id}",
            get(get_card).put(update_card).delete(delete_card),
        )
        .merge(web_routes::<AppState>())
        .layer(TimeoutLayer::new(http.write_timeout()))
        .layer(RequestBodyTimeoutLayer::new(http.read_timeout()))
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state)
}

fn parse_id(raw: &str, operation: &'static str) -> Result<CardId, ApiError> {
    CardId::parse_hex(raw).map_err(|e| {
        tracing::warn!(operation, id = %raw, error = %e, "Rejected card id");
        ApiError::from(e)
    })
}

/// Decodes the first JSON value of a body irrespective of the request's
/// content type. Bytes after that value are ignored; an empty body is an
/// error.
fn decode<T: DeserializeOwned>(body: &[u8], operation: &'static str) -> Result<T, ApiError> {
    let first = serde_json::Deserializer::from_slice(body)
        .into_iter::<T>()
        .next();

    match first {
        Some(Ok(value)) => Ok(value),
        Some(Err(e)) => {
            tracing::warn!(operation, error = %e, "Rejected request body");
            Err(ApiError::InvalidBody(e.to_string()))
        }
        None => {
            tracing::warn!(operation, "Empty request body");
            Err(ApiError::InvalidBody("EOF".to_string()))
        }
    }
}

/// Fixed single-card payload for smoke tests.
async fn diagnostic_fixture() -> Json<Vec<Card>> {
    tracing::debug!("Serving diagnostic fixture");
    Json(vec![Card::new(FIXTURE_CARD_ID, "", "111px", "222px")])
}

/// Lists all cards.
async fn list_cards(State(state): State<AppState>) -> Result<Json<Vec<Card>>, ApiError> {
    let cards = state.store.find_all().await.map_err(|e| {
        tracing::warn!(operation = "list", error = %e, "Listing cards failed");
        ApiError::store(e)
    })?;

    if cards.is_empty() {
        tracing::warn!(operation = "list", "No cards found");
        return Err(ApiError::NoRecords);
    }

    tracing::info!(operation = "list", count = cards.len(), "Listed cards");
    Ok(Json(cards))
}

/// Gets one card.
async fn get_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Card>, ApiError> {
    let id = parse_id(&id, "get")?;

    let card = state.store.find_one(id).await.map_err(|e| {
        tracing::warn!(operation = "get", id = %id, error = %e, "Card lookup failed");
        ApiError::lookup(e)
    })?;

    tracing::info!(operation = "get", id = %card.id, "Found card");
    Ok(Json(card))
}

/// Creates a card under a freshly assigned id.
async fn create_card(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<InsertAck>, ApiError> {
    let new_card: NewCard = decode(&body, "create")?;

    validate_new_card(&new_card).map_err(|e| {
        tracing::warn!(operation = "create", fields = ?e.fields, "Card failed validation");
        ApiError::from(e)
    })?;

    let card = new_card.into_card(CardId::generate());
    let ack = state.store.insert_one(card).await.map_err(|e| {
        tracing::warn!(operation = "create", error = %e, "Card insert failed");
        ApiError::store(e)
    })?;

    tracing::info!(operation = "create", id = %ack.inserted_id, "Added card");
    Ok(Json(ack))
}

/// Overwrites width and height. The payload is not validated.
async fn update_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Json<UpdateAck>, ApiError> {
    let id = parse_id(&id, "update")?;
    let dimensions: CardDimensions = decode(&body, "update")?;

    let ack = state
        .store
        .update_dimensions(id, dimensions)
        .await
        .map_err(|e| {
            tracing::warn!(operation = "update", id = %id, error = %e, "Card update failed");
            ApiError::store(e)
        })?;

    tracing::info!(
        operation = "update",
        id = %id,
        matched = ack.matched_count,
        modified = ack.modified_count,
        "Updated card"
    );
    Ok(Json(ack))
}

/// Deletes a card. Deleting an unknown id reports a zero count.
async fn delete_card(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteAck>, ApiError> {
    let id = parse_id(&id, "delete")?;

    let ack = state.store.delete_one(id).await.map_err(|e| {
        tracing::warn!(operation = "delete", id = %id, error = %e, "Card delete failed");
        ApiError::store(e)
    })?;

    tracing::info!(operation = "delete", id = %id, deleted = ack.deleted_count, "Deleted card");
    Ok(Json(ack))
}
