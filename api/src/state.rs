use std::sync::Arc;

use common::config::Settings;
use common::db::{DbPool, Session};
use common::db::repositories::EventRepository;
use metrics_exporter_prometheus::PrometheusHandle;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: DbPool,
    pub config: Arc<Settings>,
    pub metrics: PrometheusHandle,
}

impl AppState {
    pub fn new(db_pool: DbPool, config: Settings, metrics: PrometheusHandle) -> Self {
        Self {
            db_pool,
            config: Arc::new(config),
            metrics,
        }
    }

    /// Repository over a fresh pooled session for one request
    pub fn events(&self) -> EventRepository {
        EventRepository::new(Session::new(&self.db_pool))
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("db_pool", &self.db_pool)
            .field("app_name", &self.config.app_name)
            .finish()
    }
}
