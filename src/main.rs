use std::sync::Arc;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use steam_library_proxy::api::{ApiServer, ApiServerConfig, AppState};
use steam_library_proxy::config::AppConfig;
use steam_library_proxy::credentials::EnvCredentials;
use steam_library_proxy::steam::SteamClient;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "steam_library_proxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load environment variables
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env()?;
    let steam = Arc::new(SteamClient::new(&config)?);
    let credentials = Arc::new(EnvCredentials::from_env()?);

    let state = AppState::new(steam, credentials, &config);
    let server = ApiServer::with_state(ApiServerConfig::from_env_or_default(), state);

    let cancel_token = server.cancel_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Received Ctrl-C, shutting down");
            cancel_token.cancel();
        }
    });

    server.run().await?;
    Ok(())
}
