use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;

use crate::handlers::ErrorResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub app_name: String,
    pub pool_size: u32,
    pub pool_idle: usize,
}

/// Health check endpoint
///
/// Runs a trivial query through the pool; 503 when the database is unreachable.
#[tracing::instrument(skip(state))]
pub async fn health_check(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<HealthResponse>), ErrorResponse> {
    state.db_pool.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Health check failed");
        ErrorResponse::new("service_unavailable", "database unavailable, try later")
    })?;

    Ok((
        StatusCode::OK,
        Json(HealthResponse {
            status: "ok",
            app_name: state.config.app_name.clone(),
            pool_size: state.db_pool.size(),
            pool_idle: state.db_pool.num_idle(),
        }),
    ))
}
