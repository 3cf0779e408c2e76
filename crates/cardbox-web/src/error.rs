//! Error types for the web view.

use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use cardbox_storage::StorageError;
use cardbox_types::IdError;
use thiserror::Error;

/// Web view errors.
#[derive(Debug, Error)]
pub enum WebError {
    /// The path id is not a valid card id.
    #[error(transparent)]
    BadRequest(#[from] IdError),

    /// The card could not be fetched.
    #[error(transparent)]
    NotFound(StorageError),

    /// The store did not answer within its budget.
    #[error(transparent)]
    Timeout(StorageError),

    /// Template rendering error.
    #[error("template error: {0}")]
    Template(String),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebError::BadRequest(_) => StatusCode::BAD_REQUEST,
            WebError::NotFound(_) => StatusCode::NOT_FOUND,
            WebError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            WebError::Template(msg) => {
                let html = format!(
                    r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Error - Cardbox</title>
</head>
<body>
    <h1>500</h1>
    <p>{}</p>
</body>
</html>"#,
                    msg
                );
                return (StatusCode::INTERNAL_SERVER_ERROR, Html(html)).into_response();
            }
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<askama::Error> for WebError {
    fn from(err: askama::Error) -> Self {
        WebError::Template(err.to_string())
    }
}

impl From<StorageError> for WebError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::Timeout => WebError::Timeout(err),
            other => WebError::NotFound(other),
        }
    }
}
