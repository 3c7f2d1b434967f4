use crate::cli::ServeArgs;
use crate::infra::{build_screening_service, AppState};
use crate::routes::screening_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use screener::config::AppConfig;
use screener::error::AppError;
use screener::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Sweep cadence for expired sessions; eviction is also enforced lazily on
/// every read, so this only bounds how long dead entries occupy memory.
const SESSION_PRUNE_INTERVAL: Duration = Duration::from_secs(60 * 60);

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (store, service) = build_screening_service(&config)?;

    let prune_store = store.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SESSION_PRUNE_INTERVAL);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = prune_store.prune_expired();
            if removed > 0 {
                info!(removed, "expired screening sessions pruned");
            }
        }
    });

    let app = screening_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        api_key_configured = config.gateway.api_key.is_some(),
        "screening service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
