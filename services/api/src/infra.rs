use academy::workflows::recruitment::{MemoryStore, RecruitmentService, ScoringConfig};
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Service backed by a fresh in-process store.
pub(crate) fn in_memory_service(config: ScoringConfig) -> Arc<RecruitmentService<MemoryStore>> {
    Arc::new(RecruitmentService::new(Arc::new(MemoryStore::new()), config))
}
