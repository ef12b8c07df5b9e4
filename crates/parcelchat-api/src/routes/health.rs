use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use utoipa::ToSchema;

use crate::{config::StorageBackend, state::AppState};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: BTreeMap<String, String>,
}

/// Health check endpoint
///
/// Returns the health status of the API and its storage backend
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service status", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let backend = match state.config.storage.backend {
        StorageBackend::Memory => "memory",
        StorageBackend::Mongodb => "mongodb",
    };

    let storage_ok = match state.store.ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(backend, error = %e, "Storage health check failed");
            false
        }
    };

    let mut services = BTreeMap::new();
    services.insert(
        backend.to_string(),
        if storage_ok { "connected" } else { "disconnected" }.to_string(),
    );

    Json(HealthResponse {
        status: if storage_ok { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        services,
    })
}
