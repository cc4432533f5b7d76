use crate::cli::ServeArgs;
use crate::infra::{build_navigator, AppState};
use crate::routes::with_navigator_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use service_navigator::config::AppConfig;
use service_navigator::error::AppError;
use service_navigator::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if args.degraded {
        config.assistant.degraded = true;
    }

    telemetry::init(&config.telemetry, config.environment)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let navigator = build_navigator(&config);

    let app = with_navigator_routes(navigator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        degraded = config.assistant.degraded,
        model_enabled = config.assistant.model_enabled(),
        "citizen service navigator ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
