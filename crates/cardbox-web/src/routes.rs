//! Web route handlers for the card detail view.

use askama::Template;
use axum::{
    extract::{FromRef, Path, State},
    response::{Html, IntoResponse},
    routing::get,
    Router,
};
use cardbox_storage::StoreHandle;
use cardbox_types::CardId;

use crate::error::WebError;
use crate::templates::CardTemplate;

/// Shared state for web routes.
#[derive(Clone)]
pub struct WebState {
    pub store: StoreHandle,
}

/// Create the web router.
pub fn web_routes<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    WebState: FromRef<S>,
{
    Router::new().route("/template/{id}", get(card_detail))
}

/// Card detail page.
async fn card_detail(
    State(state): State<WebState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, WebError> {
    let id = CardId::parse_hex(&id).inspect_err(|e| {
        tracing::warn!(id = %id, error = %e, "Detail view rejected id");
    })?;

    let card = state.store.find_one(id).await.inspect_err(|e| {
        tracing::warn!(id = %id, error = %e, "Detail view lookup failed");
    })?;

    tracing::info!(id = %card.id, "Rendering card detail");
    let template = CardTemplate::new(card);
    Ok(Html(template.render()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, http::StatusCode};
    use cardbox_types::Card;
    use tower::ServiceExt;

    async fn app_with_card() -> (Router, CardId) {
        let store = StoreHandle::in_memory("testDb", "cards");
        let card = Card::new(CardId::generate(), "Detail", "111px", "222px");
        let id = card.id;
        store.insert_one(card).await.unwrap();
        (web_routes().with_state(WebState { store }), id)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_detail_renders_html() {
        let (app, id) = app_with_card().await;
        let (status, body) = get(app, &format!("/template/{id}")).await;

        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<html"));
        assert!(body.contains(&id.to_hex()));
    }

    #[tokio::test]
    async fn test_detail_bad_id() {
        let (app, _) = app_with_card().await;
        let (status, body) = get(app, "/template/123123123").await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("not a valid card id"));
    }

    #[tokio::test]
    async fn test_detail_missing_card() {
        let (app, _) = app_with_card().await;
        let (status, body) = get(app, &format!("/template/{}", CardId::generate())).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["error"], "no documents in result");
    }
}
