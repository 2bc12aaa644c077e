use crate::cli::ServeArgs;
use crate::infra::{build_service, AppState};
use crate::routes::with_evaluation_routes;
use adap::config::{AppConfig, ServerConfig};
use adap::error::AppError;
use adap::telemetry;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use tracing::info;

/// CLI flags take precedence over the environment.
fn apply_overrides(server: &mut ServerConfig, args: ServeArgs) {
    if let Some(host) = args.host {
        server.host = host;
    }
    if let Some(port) = args.port {
        server.port = port;
    }
}

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config.server, args);
    telemetry::init(&config.telemetry)?;

    let (metrics_layer, metrics_handle) = PrometheusMetricLayer::pair();
    let state = AppState::new(metrics_handle);
    let (service, _) = build_service(&config);
    let questions = service.catalog().len();

    let app = with_evaluation_routes(service)
        .layer(Extension(state.clone()))
        .layer(metrics_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    state.mark_ready();
    info!(environment = ?config.environment, %addr, questions, "evaluation service listening");

    axum::serve(listener, app).await?;
    Ok(())
}
