use adap::config::AppConfig;
use adap::evaluation::scoring::WeightTable;
use adap::evaluation::{Catalog, EvaluationService, InMemoryEvaluationRepository};
use adap::identity::TokenAuthority;
use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::warn;

pub(crate) type ApiService = EvaluationService<InMemoryEvaluationRepository, TokenAuthority>;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

impl AppState {
    /// Starts out not ready; the server flips it once the listener is bound.
    pub(crate) fn new(metrics: PrometheusHandle) -> Self {
        Self {
            readiness: Arc::new(AtomicBool::new(false)),
            metrics: Arc::new(metrics),
        }
    }

    pub(crate) fn mark_ready(&self) {
        self.readiness.store(true, Ordering::Release);
    }

    pub(crate) fn is_ready(&self) -> bool {
        self.readiness.load(Ordering::Acquire)
    }
}

/// In-memory service wired with the configured token authority.
pub(crate) fn build_service(
    config: &AppConfig,
) -> (Arc<ApiService>, Arc<InMemoryEvaluationRepository>) {
    let catalog = Catalog::standard();
    let missing = catalog.missing_codes(WeightTable::standard());
    if !missing.is_empty() {
        warn!(?missing, "weighted question codes absent from the catalog score as zero");
    }

    let repository = Arc::new(InMemoryEvaluationRepository::new());
    let authority = Arc::new(TokenAuthority::from_config(&config.auth));
    let service = Arc::new(EvaluationService::new(
        repository.clone(),
        authority,
        Arc::new(catalog),
    ));
    (service, repository)
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}
