use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::info;

use super::auth::{self, ServiceAccountKey, TokenResponse};
use super::{RowStore, StoreError};
use async_trait::async_trait;

#[derive(Debug, Serialize)]
struct AppendRequest {
    values: Vec<Vec<String>>,
}

struct CachedToken {
    value: String,
    expires_at: i64,
}

/// Sheets v4 `values:append` client. One handle is constructed at startup
/// and shared across requests; the cached bearer token is refreshed under a
/// mutex shortly before it expires.
pub struct SheetsRowStore {
    client: Client,
    key: ServiceAccountKey,
    spreadsheet_id: String,
    range: String,
    token: Mutex<Option<CachedToken>>,
}

impl SheetsRowStore {
    pub fn new(key: ServiceAccountKey, spreadsheet_id: String, range: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            key,
            spreadsheet_id,
            range,
            token: Mutex::new(None),
        }
    }

    async fn bearer_token(&self) -> Result<String, StoreError> {
        let mut cached = self.token.lock().await;

        if let Some(token) = cached.as_ref() {
            // Refresh a minute before expiry.
            if Utc::now().timestamp() < token.expires_at - 60 {
                return Ok(token.value.clone());
            }
        }

        let assertion = auth::signed_assertion(&self.key)?;
        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        let parsed: TokenResponse = serde_json::from_str(&text)
            .map_err(|e| StoreError::Auth(format!("bad token response: {e}")))?;

        let value = parsed.access_token.clone();
        *cached = Some(CachedToken {
            value: parsed.access_token,
            expires_at: Utc::now().timestamp() + parsed.expires_in,
        });

        Ok(value)
    }
}

#[async_trait]
impl RowStore for SheetsRowStore {
    async fn append_row(&self, cells: &[String]) -> Result<(), StoreError> {
        let token = self.bearer_token().await?;

        let url = format!(
            "https://sheets.googleapis.com/v4/spreadsheets/{}/values/{}:append",
            self.spreadsheet_id, self.range
        );
        let body = AppendRequest {
            values: vec![cells.to_vec()],
        };

        let response = self
            .client
            .post(&url)
            .query(&[("valueInputOption", "RAW")])
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message: text,
            });
        }

        info!("Appended {}-cell row to {}", cells.len(), self.range);
        Ok(())
    }
}
