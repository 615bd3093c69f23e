mod auth;
mod client;

pub use auth::ServiceAccountKey;
pub use client::SheetsRowStore;

use async_trait::async_trait;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("credential error: {0}")]
    Auth(String),

    #[error("row store returned {status}: {message}")]
    Api { status: u16, message: String },
}

/// Append-only sink for submission rows. Column order is the contract;
/// nothing is ever read back.
#[async_trait]
pub trait RowStore: Send + Sync {
    async fn append_row(&self, cells: &[String]) -> Result<(), StoreError>;
}
