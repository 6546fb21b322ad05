use collectchat_bitrix_relay::bitrix_client::BitrixClient;
use collectchat_bitrix_relay::config::Config;
use collectchat_bitrix_relay::handlers::AppState;
use collectchat_bitrix_relay::routes::build_router;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration (aborting if the Bitrix24 webhook
/// URL is missing), builds the Bitrix24 client and starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "collectchat_bitrix_relay=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let bitrix = BitrixClient::new(config.bitrix_webhook_url.clone())?;
    tracing::info!("✓ Bitrix24 client initialized ({} mapping)", config.lead_mapping);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        bitrix,
    });

    let app = build_router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
