use std::sync::Arc;

use crate::config::Config;
use crate::gateway::AnalysisBackend;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// The external analysis service. Default: `BackendGateway` over HTTP.
    pub backend: Arc<dyn AnalysisBackend>,
    pub config: Config,
}
