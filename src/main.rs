use std::sync::Arc;

use chat_priority::api::{AppState, router};
use chat_priority::config::ServiceConfig;
use chat_priority::model::ModelState;
use chat_priority::pipeline::Analyzer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = ServiceConfig::from_env()?;
    let addr = config.bind_addr()?;

    eprintln!("Chat Priority v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Analyze: http://{}/analyze", addr);
    eprintln!("   Health:  http://{}/health", addr);
    eprintln!("   Model:   {}", config.model_path.display());

    // ── Model ────────────────────────────────────────────────────────────
    let state = Arc::new(ModelState::load_or_fallback(&config.model_path).await);
    if state.is_available() {
        eprintln!("   Mode:    trained model");
    } else {
        eprintln!("   Mode:    rule-based fallback");
    }

    // ── HTTP ─────────────────────────────────────────────────────────────
    let analyzer = Arc::new(Analyzer::new(state, config.default_top_k));
    let app = router(AppState {
        analyzer,
        config: Arc::new(config),
    });

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Priority service started");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Priority service stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
