//! Knowledge-management endpoints. Mounted behind the admin token check.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::ingest::{parse_document, Report};
use crate::knowledge::{KnowledgeStore, KnowledgeUpdate, MergeUpdate};

const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|e| ApiError::BadRequest(e.body_text()))
}

/// `GET /admin/kb`: the store behind the active index.
pub async fn get_knowledge(
    State(ctx): State<ApiContext>,
) -> Result<Json<KnowledgeStore>, ApiError> {
    Ok(Json(ctx.engine.knowledge()?))
}

/// `POST /admin/kb`: replace the whole store.
pub async fn replace_knowledge(
    State(ctx): State<ApiContext>,
    payload: Result<Json<KnowledgeStore>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let store = json_body(payload)?;
    ctx.engine.apply(KnowledgeUpdate::Replace(store))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/merge`: fold structured condition updates into the store.
pub async fn merge_knowledge(
    State(ctx): State<ApiContext>,
    payload: Result<Json<MergeUpdate>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let update = json_body(payload)?;
    ctx.engine.apply(KnowledgeUpdate::Merge(update))?;
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /admin/export`: active index as ruleset text.
pub async fn export_ruleset(
    State(ctx): State<ApiContext>,
) -> Result<impl IntoResponse, ApiError> {
    let text = ctx.engine.export()?;
    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], text))
}

/// `POST /admin/ruleset`: replace the active index with ruleset text.
pub async fn import_ruleset(
    State(ctx): State<ApiContext>,
    body: String,
) -> Result<StatusCode, ApiError> {
    ctx.engine.load_ruleset(&body)?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /admin/ingest`: merge a free-text document and return its report.
///
/// The report is also handed to the configured sink; a delivery failure
/// is logged and does not fail the request.
pub async fn ingest_document(
    State(ctx): State<ApiContext>,
    body: String,
) -> Result<impl IntoResponse, ApiError> {
    let update = parse_document(&body);
    let conditions = update.conditions.len();
    let report = Report::for_update(&update);

    let revision = ctx.engine.apply(KnowledgeUpdate::Merge(update))?;
    tracing::info!(revision, conditions, "Ingestion document applied");

    if let Err(e) = ctx.reports.deliver(&report) {
        tracing::warn!(error = %e, report_id = %report.id, "Report delivery failed");
    }

    Ok(([(header::CONTENT_TYPE, TEXT_PLAIN)], report.text))
}
