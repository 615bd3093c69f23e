use crate::agents::Enricher;
use crate::config::Config;
use crate::sheets::RowStore;
use std::sync::Arc;

/// Shared per-process state. The service handles are constructed once in
/// `main` and injected; tests swap in doubles.
#[derive(Clone)]
pub struct AppState {
    pub rows: Arc<dyn RowStore>,
    pub enricher: Arc<dyn Enricher>,
    pub config: Arc<Config>,
}
