use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::agents::EnrichError;
use crate::sheets::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid rating: {0}")]
    BadRating(String),

    #[error("row store error: {0}")]
    Store(#[from] StoreError),

    #[error("enrichment error: {0}")]
    Enrich(#[from] EnrichError),

    #[error("template error: {0}")]
    Template(#[from] tera::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::BadRating(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::Store(_) | AppError::Enrich(_) => {
                tracing::error!("upstream failure: {}", self);
                (
                    StatusCode::BAD_GATEWAY,
                    "An upstream service failed; your feedback was not recorded.".to_string(),
                )
            }
            AppError::Template(_) => {
                tracing::error!("render failure: {}", self);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to render the page.".to_string(),
                )
            }
        };
        (status, message).into_response()
    }
}
