pub mod api; // HTTP surface
pub mod config;
pub mod engine; // Compiler, evaluator, reload coordination
pub mod ingest; // Free-text ingestion + change reports
pub mod knowledge; // Medical facts + normalizer

use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Service entry point: logging, seeded engine, HTTP server until Ctrl-C.
pub async fn run() -> Result<(), String> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();

    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);

    let config = config::ServerConfig::from_env();
    let engine = engine::Engine::with_seed()
        .map_err(|e| format!("Built-in knowledge failed to compile: {e}"))?;
    let ctx = api::ApiContext::from_config(Arc::new(engine), &config);

    let mut server = api::start_server(ctx, config.bind).await?;
    tracing::info!(
        addr = %server.session.server_addr,
        reports_dir = %config.reports_dir.display(),
        "Listening"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Cannot listen for shutdown signal: {e}");
    }
    server.shutdown();
    server.stopped().await;
    Ok(())
}
