use std::sync::Arc;

use resena::agents::{Enricher, OpenAiAgent};
use resena::config::Config;
use resena::routes;
use resena::sheets::{RowStore, ServiceAccountKey, SheetsRowStore};
use resena::state::AppState;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resena=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    let key = ServiceAccountKey::from_json(&config.google_credentials_json)
        .map_err(|e| format!("GOOGLE_APPLICATION_CREDENTIALS_JSON is not a valid key blob: {e}"))?;

    let rows: Arc<dyn RowStore> = Arc::new(SheetsRowStore::new(
        key,
        config.spreadsheet_id.clone(),
        config.sheet_range.clone(),
    ));
    let enricher: Arc<dyn Enricher> = Arc::new(OpenAiAgent::new(config.openai_api_key.clone()));

    let state = Arc::new(AppState {
        rows,
        enricher,
        config: Arc::new(config),
    });

    let app = routes::router(state.clone());

    let addr = format!("{}:{}", state.config.host, state.config.port);
    tracing::info!("Resena listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
