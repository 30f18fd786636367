//! HTTP router.
//!
//! Public routes: `/health`, `/analyze`. Knowledge management lives under
//! `/admin/` behind the admin token check. CORS is permissive so browser
//! front-ends on other origins can call the service.

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use crate::api::endpoints;
use crate::api::middleware;
use crate::api::types::ApiContext;

/// Build the service router.
///
/// Middleware uses `Extension<ApiContext>` (injected as the outermost admin layer).
/// Endpoint handlers use `State<ApiContext>` (provided via `with_state`).
pub fn api_router(ctx: ApiContext) -> Router {
    let admin = Router::new()
        .route(
            "/kb",
            get(endpoints::admin::get_knowledge).post(endpoints::admin::replace_knowledge),
        )
        .route("/merge", post(endpoints::admin::merge_knowledge))
        .route("/export", get(endpoints::admin::export_ruleset))
        .route("/ruleset", post(endpoints::admin::import_ruleset))
        .route("/ingest", post(endpoints::admin::ingest_document))
        .with_state(ctx.clone())
        .layer(axum::middleware::from_fn(middleware::admin::require_admin))
        // Extension must be outermost so middleware can extract ApiContext
        .layer(axum::Extension(ctx.clone()));

    let public = Router::new()
        .route("/health", get(endpoints::health::check))
        .route("/analyze", post(endpoints::analyze::analyze))
        .with_state(ctx);

    Router::new()
        .merge(public)
        .nest("/admin", admin)
        .layer(CorsLayer::permissive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    use crate::api::middleware::admin::ADMIN_TOKEN_HEADER;
    use crate::engine::Engine;
    use crate::ingest::DiskReportSink;
    use crate::knowledge::{default_knowledge, KnowledgeUpdate};

    const TOKEN: &str = "test-token";

    fn test_ctx() -> (ApiContext, tempfile::TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let engine = Arc::new(Engine::with_seed().unwrap());
        let ctx = ApiContext::new(
            engine,
            TOKEN,
            Arc::new(DiskReportSink::new(tmp.path().to_path_buf())),
        );
        (ctx, tmp)
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, String) {
        let response = app.clone().oneshot(req).await.unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    fn json(body: &str) -> serde_json::Value {
        serde_json::from_str(body).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("Content-Type", "application/json")
            .header("X-Admin-Token", TOKEN)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn admin_get(uri: &str) -> Request<Body> {
        Request::get(uri)
            .header("X-Admin-Token", TOKEN)
            .body(Body::empty())
            .unwrap()
    }

    fn admin_post_text(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("Content-Type", "text/plain")
            .header("X-Admin-Token", TOKEN)
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    const FLU_QUERY: &str =
        r#"{"symptoms":[{"name":"fever","severity":"severe"},{"name":"cough","severity":"moderate"}]}"#;

    #[tokio::test]
    async fn health_reports_revision() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let req = Request::get("/health").body(Body::empty()).unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
        let body = json(&body);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["revision"], 1);
    }

    #[tokio::test]
    async fn analyze_ranks_candidates() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let (status, body) = send(&app, post_json("/analyze", FLU_QUERY)).await;
        assert_eq!(status, StatusCode::OK);

        let results = &json(&body)["results"];
        assert_eq!(results[0]["condition"], "influenza");
        assert_eq!(results[0]["affinity"], 48);
        assert_eq!(results[0]["medication"], "paracetamol");
        assert_eq!(results[0]["urgency"], "immediate_consultation");
        assert_eq!(
            results[0]["urgency_label"],
            "Immediate medical consultation suggested"
        );
        assert_eq!(results[1]["condition"], "common_cold");
        assert_eq!(results.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn analyze_accepts_spanish_fields() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let body = r#"{"sintomas":[{"nombre":"Headache","severidad":"Severe"}],"alergias":["NSAIDs"],"cronicos":[]}"#;
        let (status, body) = send(&app, post_json("/analyze", body)).await;
        assert_eq!(status, StatusCode::OK);
        let results = &json(&body)["results"];
        assert_eq!(results[0]["condition"], "migraine");
        assert_eq!(results[0]["affinity"], 50);
        assert_eq!(results[0]["medication"], "paracetamol");
    }

    #[tokio::test]
    async fn analyze_reports_none_when_all_treaters_unsafe() {
        let (ctx, _tmp) = test_ctx();
        let mut store = default_knowledge();
        store.medications.retain(|m| m.name == "ibuprofen");
        ctx.engine.apply(KnowledgeUpdate::Replace(store)).unwrap();

        let app = api_router(ctx);
        let body = r#"{"symptoms":[{"name":"headache","severity":"mild"}],"allergies":["nsaids"]}"#;
        let (_, body) = send(&app, post_json("/analyze", body)).await;
        assert_eq!(json(&body)["results"][0]["medication"], "none");
    }

    #[tokio::test]
    async fn analyze_with_no_matches_is_empty_ok() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let body = r#"{"symptoms":[{"name":"rash","severity":"severe"}]}"#;
        let (status, body) = send(&app, post_json("/analyze", body)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["results"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn analyze_rejects_malformed_json() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let (status, body) = send(&app, post_json("/analyze", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json(&body)["error"]["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn analyze_before_any_load_is_503() {
        let tmp = tempfile::tempdir().unwrap();
        let ctx = ApiContext::new(
            Arc::new(Engine::new()),
            TOKEN,
            Arc::new(DiskReportSink::new(tmp.path().to_path_buf())),
        );
        let app = api_router(ctx);
        let (status, body) = send(&app, post_json("/analyze", FLU_QUERY)).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json(&body)["error"]["code"], "ENGINE_UNINITIALIZED");
    }

    #[tokio::test]
    async fn admin_routes_require_token() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let req = Request::get("/admin/kb").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let req = Request::get("/admin/kb")
            .header("X-Admin-Token", "wrong")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json(&body)["error"]["code"], "AUTH_REQUIRED");
    }

    #[tokio::test]
    async fn admin_token_accepted_from_header_or_query() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let (status, body) = send(&app, admin_get("/admin/kb")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json(&body)["conditions"].as_array().unwrap().len(), 3);

        let req = Request::get(format!("/admin/kb?token={TOKEN}"))
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn query_token_accepted_despite_stale_header() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let req = Request::get(format!("/admin/kb?token={TOKEN}"))
            .header(ADMIN_TOKEN_HEADER, "stale")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let req = Request::get("/admin/kb?token=stale")
            .header(ADMIN_TOKEN_HEADER, TOKEN)
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::OK);

        let req = Request::get("/admin/kb?token=stale")
            .header(ADMIN_TOKEN_HEADER, "also-stale")
            .body(Body::empty())
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn analyze_accepts_legacy_request_shape() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);

        let query = r#"{"sintomas":[{"nombre":"Fever","severidad":"severo"},
                                    {"nombre":"Cough","severidad":"moderado"}],
                        "alergias":[],"cronicos":[]}"#;
        let (status, body) = send(&app, post_json("/analyze", query)).await;
        assert_eq!(status, StatusCode::OK);
        let results = &json(&body)["results"];
        assert_eq!(results[0]["condition"], "influenza");
        assert_eq!(results[0]["affinity"], 48);
        assert_eq!(results[0]["urgency"], "immediate_consultation");
    }

    #[tokio::test]
    async fn replace_knowledge_then_analyze() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx.clone());

        let store = r#"{
            "symptoms": [{"name": "itch"}],
            "conditions": [{"name": "Eczema", "kind": "chronic", "system": "skin",
                            "characteristics": [{"symptom": "itch", "weight": 3}]}],
            "medications": [{"name": "Emollient", "treats": ["eczema"]}]
        }"#;
        let (status, _) = send(&app, post_json("/admin/kb", store)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(ctx.engine.revision(), Some(2));

        let query = r#"{"symptoms":[{"name":"Itch","severity":"moderate"}]}"#;
        let (_, body) = send(&app, post_json("/analyze", query)).await;
        let results = &json(&body)["results"];
        assert_eq!(results[0]["condition"], "eczema");
        assert_eq!(results[0]["affinity"], 67);
        assert_eq!(results[0]["medication"], "emollient");
        assert_eq!(results[0]["urgency"], "possible_self_management");
    }

    #[tokio::test]
    async fn rejected_knowledge_keeps_serving_previous() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx.clone());

        let store = r#"{"conditions": [{"name": "flu"}, {"name": "FLU"}]}"#;
        let (status, body) = send(&app, post_json("/admin/kb", store)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json(&body)["error"]["code"], "COMPILE_FAILED");
        assert_eq!(ctx.engine.revision(), Some(1));

        let (_, body) = send(&app, post_json("/analyze", FLU_QUERY)).await;
        assert_eq!(json(&body)["results"][0]["affinity"], 48);
    }

    #[tokio::test]
    async fn merge_endpoint_extends_knowledge() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx.clone());

        let merge = r#"{"conditions": [{"name": "Strep Throat", "kind": "bacterial",
            "system": "respiratory", "symptoms": [{"symptom": "sore throat", "weight": 3}],
            "treats": ["amoxicillin"]}]}"#;
        let (status, _) = send(&app, post_json("/admin/merge", merge)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let store = ctx.engine.knowledge().unwrap();
        assert!(store.condition("strep_throat").is_some());
        assert_eq!(store.medication("amoxicillin").unwrap().treats, vec!["strep_throat"]);

        let (status, _) = send(&app, post_json("/admin/merge", r#"{"conditions": []}"#)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn export_returns_ruleset_text() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let response = app.clone().oneshot(admin_get("/admin/export")).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get("content-type").unwrap(),
            "text/plain; charset=utf-8"
        );
        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("condition(influenza, kind(viral), system(respiratory))."));
        assert!(text.contains("characterizes(influenza, fever, 3)."));
    }

    #[tokio::test]
    async fn ruleset_import_round_trip_and_rejection() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx.clone());

        let (status, body) =
            send(&app, admin_post_text("/admin/ruleset", "symptom(Bad Atom).")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(json(&body)["error"]["message"]
            .as_str()
            .unwrap()
            .contains("Ruleset line 1"));
        assert_eq!(ctx.engine.revision(), Some(1));

        let (_, exported) = send(&app, admin_get("/admin/export")).await;
        let (status, _) = send(&app, admin_post_text("/admin/ruleset", &exported)).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(ctx.engine.revision(), Some(2));

        let (_, body) = send(&app, post_json("/analyze", FLU_QUERY)).await;
        assert_eq!(json(&body)["results"][0]["affinity"], 48);
    }

    #[tokio::test]
    async fn ingest_merges_document_and_saves_report() {
        let (ctx, tmp) = test_ctx();
        let app = api_router(ctx);

        let doc = "nombre: Otitis\ntipo: bacteriana\nsistema: auditivo\n\
                   sintomas: ear pain:3, fever:1\ntrata: amoxicillin\n";
        let (status, report) = send(&app, admin_post_text("/admin/ingest", doc)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(report.contains("- Condition: otitis (kind=bacteriana, system=auditivo)"));
        assert!(report.contains("Symptoms: ear_pain:3, fever:1"));

        let saved: Vec<_> = std::fs::read_dir(tmp.path()).unwrap().collect();
        assert_eq!(saved.len(), 1);

        let query = r#"{"symptoms":[{"name":"ear pain","severity":"severe"}]}"#;
        let (_, body) = send(&app, post_json("/analyze", query)).await;
        let results = &json(&body)["results"];
        assert_eq!(results[0]["condition"], "otitis");
        assert_eq!(results[0]["medication"], "amoxicillin");
    }

    #[tokio::test]
    async fn ingest_without_conditions_is_rejected() {
        let (ctx, tmp) = test_ctx();
        let app = api_router(ctx);
        let (status, _) = send(&app, admin_post_text("/admin/ingest", "kind: orphan")).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(std::fs::read_dir(tmp.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn cors_allows_any_origin() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let req = Request::get("/health")
            .header("Origin", "http://example.test")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }

    #[tokio::test]
    async fn unknown_route_returns_404() {
        let (ctx, _tmp) = test_ctx();
        let app = api_router(ctx);
        let req = Request::get("/nonexistent").body(Body::empty()).unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
