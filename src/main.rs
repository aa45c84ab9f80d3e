use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lead_scoring_dashboard::config::Config;
use lead_scoring_dashboard::handlers::{self, AppState};
use lead_scoring_dashboard::scoring_client::ScoringApiClient;

/// Main entry point for the application.
///
/// Initializes tracing, loads configuration, builds the scoring API client
/// and the per-session dashboard cache, then serves the dashboard with Axum.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "lead_scoring_dashboard=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let client = ScoringApiClient::new(&config.scoring_api_base_url, config.request_timeout())?;
    tracing::info!("✓ Scoring API client initialized: {}", client.base_url());

    let app_state = Arc::new(AppState::new(&config, client));
    let app = handlers::router(app_state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Dashboard listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
