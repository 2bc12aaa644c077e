use crate::infra::AppState;
use adap::evaluation::{evaluation_router, EvaluationRepository, EvaluationService};
use adap::identity::IdentityProvider;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use serde_json::json;
use std::sync::Arc;

pub(crate) fn with_evaluation_routes<R, I>(service: Arc<EvaluationService<R, I>>) -> axum::Router
where
    R: EvaluationRepository + 'static,
    I: IdentityProvider + 'static,
{
    evaluation_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.is_ready() {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "starting" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::build_service;
    use adap::config::{AppConfig, AppEnvironment, AuthConfig, ServerConfig, TelemetryConfig};
    use axum::body::Body;
    use axum::http::Request;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use tower::ServiceExt;

    fn config() -> AppConfig {
        AppConfig {
            environment: AppEnvironment::Test,
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            telemetry: TelemetryConfig {
                log_level: "info".to_string(),
            },
            auth: AuthConfig {
                token_secret: "routes-test".to_string(),
                token_ttl_minutes: 30,
            },
        }
    }

    fn app(ready: bool) -> axum::Router {
        let (service, _) = build_service(&config());
        let state = AppState::new(PrometheusBuilder::new().build_recorder().handle());
        if ready {
            state.mark_ready();
        }
        with_evaluation_routes(service).layer(Extension(state))
    }

    async fn status_of(router: axum::Router, uri: &str) -> StatusCode {
        router
            .oneshot(Request::get(uri).body(Body::empty()).unwrap())
            .await
            .expect("route executes")
            .status()
    }

    #[tokio::test]
    async fn healthcheck_reports_ok() {
        let Json(body) = healthcheck().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(status_of(app(false), "/health").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn readiness_follows_the_flag() {
        assert_eq!(
            status_of(app(false), "/ready").await,
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(status_of(app(true), "/ready").await, StatusCode::OK);
    }

    #[tokio::test]
    async fn evaluation_routes_are_mounted() {
        assert_eq!(status_of(app(true), "/metrics").await, StatusCode::OK);
        assert_eq!(
            status_of(app(true), "/user/companies").await,
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(app(true), "/evaluation/assigned").await,
            StatusCode::UNAUTHORIZED
        );
    }
}
