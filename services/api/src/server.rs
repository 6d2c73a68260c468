use crate::cli::ServeArgs;
use crate::infra::{AppState, LoggingObserver};
use crate::routes::with_engine_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use credit_engine::config::AppConfig;
use credit_engine::corridor::CorridorState;
use credit_engine::error::AppError;
use credit_engine::http::EngineService;
use credit_engine::telemetry;
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let corridor = Arc::new(CorridorState::default());
    corridor.subscribe(Arc::new(LoggingObserver));
    let engine = Arc::new(EngineService::with_corridor(config.engine, corridor));

    let app = with_engine_routes(engine)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        revoked_consent = ?config.engine.revoked_consent,
        utilization_target = config.engine.utilization_target,
        "credit engine ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
