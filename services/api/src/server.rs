use crate::cli::ServeArgs;
use crate::infra::{load_default_settings, AppState};
use crate::routes::bonus_router;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use commission_engine::config::AppConfig;
use commission_engine::error::AppError;
use commission_engine::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
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

    telemetry::init(&config.telemetry)?;

    let default_settings = load_default_settings(config.rates.settings_csv.as_deref())?;
    info!(
        keys = default_settings.len(),
        "default rate settings loaded"
    );

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        default_settings: Arc::new(default_settings),
    };

    let app = bonus_router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "commission engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}
