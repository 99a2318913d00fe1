use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use smartmeeting::config::Settings;
use smartmeeting::routes::create_router;
use smartmeeting::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("smartmeeting=info,tower_http=info")),
        )
        .init();

    let settings = Settings::from_env().context("Failed to load configuration")?;

    if !settings.has_api_key() {
        warn!("OPENAI_API_KEY is not set; proxy endpoints will answer 500");
    }
    if settings.app_token.is_some() {
        info!("Shared-secret check enabled for proxy endpoints");
    }

    let addr = settings.bind_addr();
    let state = AppState::new(settings).context("Failed to set up upstream client")?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("SmartMeeting server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
