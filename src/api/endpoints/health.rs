//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
    /// Revision of the published knowledge, `null` before the first load.
    pub revision: Option<u64>,
}

/// `GET /health`: liveness plus the active knowledge revision.
pub async fn check(
    State(ctx): State<ApiContext>,
) -> Result<Json<HealthResponse>, ApiError> {
    Ok(Json(HealthResponse {
        status: "ok",
        version: crate::config::APP_VERSION,
        revision: ctx.engine.revision(),
    }))
}
