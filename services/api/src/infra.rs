use metrics_exporter_prometheus::PrometheusHandle;
use service_navigator::config::AppConfig;
use service_navigator::navigator::{
    select_model, select_retriever, InMemorySessionRepository, NavigatorService,
    NavigatorSettings, PdfSummaryEmitter,
};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

pub(crate) type ApiNavigator = NavigatorService<InMemorySessionRepository, PdfSummaryEmitter>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Wires the navigator from configuration. The model and retriever are chosen once here.
pub(crate) fn build_navigator(config: &AppConfig) -> Arc<ApiNavigator> {
    let model = select_model(&config.assistant);
    let retriever = select_retriever(&config.retrieval);

    Arc::new(NavigatorService::new(
        Arc::new(InMemorySessionRepository::new()),
        Arc::new(PdfSummaryEmitter::new(&config.output.forms_dir)),
        retriever,
        model,
        NavigatorSettings {
            degraded: config.assistant.degraded,
            top_k: config.retrieval.top_k,
        },
    ))
}

/// Parses a `key=value` answer given on the command line.
pub(crate) fn parse_answer_pair(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, found '{raw}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("missing field name in '{raw}'"));
    }
    Ok((key.to_string(), value.trim().to_string()))
}
