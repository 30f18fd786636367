//! Admin token check for knowledge-management routes.
//!
//! The token is read from the `X-Admin-Token` header and from a `token`
//! query parameter for clients that cannot set headers. A match in either
//! one is enough.

use std::collections::HashMap;

use axum::extract::Query;
use axum::http::{HeaderValue, Request};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use crate::api::error::ApiError;
use crate::api::types::ApiContext;

pub const ADMIN_TOKEN_HEADER: &str = "X-Admin-Token";

/// Require the configured admin token.
///
/// Accesses `ApiContext` from request extensions (injected by Extension layer).
pub async fn require_admin(req: Request<axum::body::Body>, next: Next) -> Response {
    match require_admin_inner(req, next).await {
        Ok(resp) => resp,
        Err(err) => err.into_response(),
    }
}

async fn require_admin_inner(
    req: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let ctx: ApiContext = req
        .extensions()
        .get::<ApiContext>()
        .cloned()
        .ok_or(ApiError::Internal("missing API context".into()))?;

    let header = req
        .headers()
        .get(ADMIN_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    let query = Query::<HashMap<String, String>>::try_from_uri(req.uri())
        .ok()
        .and_then(|Query(mut params)| params.remove("token"));

    if header.is_none() && query.is_none() {
        return Err(ApiError::Unauthorized);
    }

    // A match in either source is enough.
    let accepted = [header, query]
        .iter()
        .flatten()
        .any(|token| token.as_str() == &*ctx.admin_token);
    if !accepted {
        tracing::warn!(path = %req.uri().path(), "Admin request with wrong token");
        return Err(ApiError::Unauthorized);
    }

    let mut response = next.run(req).await;
    response
        .headers_mut()
        .insert("Cache-Control", HeaderValue::from_static("no-store"));
    Ok(response)
}
