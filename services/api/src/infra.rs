use metrics_exporter_prometheus::PrometheusHandle;
use screener::config::AppConfig;
use screener::error::AppError;
use screener::screening::{AnthropicClient, InMemorySessionStore, ScreeningService};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type ApiScreeningService = ScreeningService<InMemorySessionStore, AnthropicClient>;

/// Wire the session store, model client, and orchestrator from loaded
/// configuration. The store is returned separately so the server can hand it
/// to the background prune task.
pub(crate) fn build_screening_service(
    config: &AppConfig,
) -> Result<(Arc<InMemorySessionStore>, Arc<ApiScreeningService>), AppError> {
    let store = Arc::new(InMemorySessionStore::with_ttl_hours(
        config.sessions.ttl_hours,
    ));
    let client = Arc::new(AnthropicClient::new(&config.gateway)?);
    let service = Arc::new(ScreeningService::new(store.clone(), client));
    Ok((store, service))
}
