//! Diagnostic analysis endpoint.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::{AnalyzeRequest, AnalyzeResponse, ApiContext};
use crate::engine::AnalyzeQuery;

/// `POST /analyze`: rank candidate conditions for reported symptoms.
pub async fn analyze(
    State(ctx): State<ApiContext>,
    payload: Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let query = AnalyzeQuery::from(request);

    let candidates = ctx.engine.analyze(&query)?;

    Ok(Json(AnalyzeResponse {
        results: candidates.into_iter().map(Into::into).collect(),
    }))
}
