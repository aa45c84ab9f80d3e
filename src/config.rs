use serde::Deserialize;
use std::time::Duration;
use url::Url;

/// Default scoring service address used when `SCORING_API_BASE_URL` is unset.
pub const DEFAULT_SCORING_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// Dashboard sessions idle longer than this are dropped.
pub const DEFAULT_SESSION_IDLE_SECS: u64 = 1800;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    pub scoring_api_base_url: String,
    /// `None` leaves the transport's default behaviour in place.
    pub request_timeout_secs: Option<u64>,
    pub session_idle_secs: u64,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            scoring_api_base_url: validate_base_url(
                std::env::var("SCORING_API_BASE_URL")
                    .unwrap_or_else(|_| DEFAULT_SCORING_API_BASE_URL.to_string()),
            )?,
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| {
                    s.trim().parse::<u64>().map_err(|_| {
                        anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be a whole number of seconds")
                    })
                })
                .transpose()?,
            session_idle_secs: std::env::var("SESSION_IDLE_SECS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| s.trim().parse::<u64>())
                .transpose()
                .map_err(|_| anyhow::anyhow!("SESSION_IDLE_SECS must be a whole number of seconds"))?
                .unwrap_or(DEFAULT_SESSION_IDLE_SECS),
        };

        tracing::info!("Configuration loaded successfully");
        tracing::debug!("Scoring API Base URL: {}", config.scoring_api_base_url);
        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Session idle timeout: {}s", config.session_idle_secs);
        if let Some(secs) = config.request_timeout_secs {
            tracing::debug!("Request timeout: {}s", secs);
        }

        Ok(config)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    pub fn session_idle(&self) -> Duration {
        Duration::from_secs(self.session_idle_secs)
    }
}

/// Checks that a scoring API base URL is non-empty, uses http(s) and parses.
pub fn validate_base_url(url: String) -> anyhow::Result<String> {
    let trimmed = url.trim();
    if trimmed.is_empty() {
        anyhow::bail!("SCORING_API_BASE_URL cannot be empty");
    }
    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        anyhow::bail!("SCORING_API_BASE_URL must start with http:// or https://");
    }
    Url::parse(trimmed)
        .map_err(|e| anyhow::anyhow!("SCORING_API_BASE_URL is not a valid URL: {}", e))?;
    Ok(trimmed.to_string())
}
