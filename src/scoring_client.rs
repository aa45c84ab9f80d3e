use crate::errors::{AppError, FetchFailure, SubmitFailure};
use crate::models::{LeadPayload, ScoredLead};
use serde::Deserialize;
use std::time::Duration;
use tracing;
use url::Url;

const LEADS_PATH: &str = "api/v1/leads";
const SCORE_PATH: &str = "api/v1/score";

/// Error body returned by the scoring API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: Option<serde_json::Value>,
}

/// Client for the external lead scoring API.
#[derive(Clone)]
pub struct ScoringApiClient {
    client: reqwest::Client,
    base_url: Url,
}

impl ScoringApiClient {
    /// Creates a new `ScoringApiClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the scoring API, e.g. `http://127.0.0.1:8000`.
    /// * `timeout` - Optional request timeout; `None` keeps the transport default.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, AppError> {
        let mut base_url = Url::parse(base_url)
            .map_err(|e| AppError::Config(format!("Invalid scoring API URL: {}", e)))?;
        // Url::join replaces the last segment unless the path ends in '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            AppError::Config(format!("Failed to create scoring API client: {}", e))
        })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> Url {
        // Both paths are static relative references, which always join.
        self.base_url
            .join(path)
            .unwrap_or_else(|_| self.base_url.clone())
    }

    /// Fetches every scored lead, in server order.
    pub async fn fetch_leads(&self) -> Result<Vec<ScoredLead>, FetchFailure> {
        let url = self.endpoint(LEADS_PATH);
        tracing::info!("Fetching scored leads: {}", url);

        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            return Err(FetchFailure::Status(response.status().as_u16()));
        }

        let leads: Vec<ScoredLead> = response
            .json()
            .await
            .map_err(|e| FetchFailure::Decode(e.to_string()))?;

        tracing::debug!("Fetched {} scored leads", leads.len());
        Ok(leads)
    }

    /// Submits a lead for scoring. The success body is ignored.
    pub async fn submit_lead(&self, payload: &LeadPayload) -> Result<(), SubmitFailure> {
        let url = self.endpoint(SCORE_PATH);
        tracing::info!("Submitting lead for scoring: {}", url);

        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::info!("✓ Lead scored ({})", status);
            return Ok(());
        }

        let status = status.as_u16();
        let bytes = response.bytes().await?;
        Err(parse_error_body(status, &bytes))
    }
}

/// Maps a non-2xx body to a `SubmitFailure`.
///
/// A string `detail` is used verbatim; any other JSON `detail` is kept in its
/// JSON text form. A body that is not JSON is a parse failure.
pub fn parse_error_body(status: u16, body: &[u8]) -> SubmitFailure {
    match serde_json::from_slice::<ErrorBody>(body) {
        Ok(ErrorBody { detail }) => {
            let detail = detail.and_then(|d| match d {
                serde_json::Value::Null => None,
                serde_json::Value::String(s) => Some(s),
                other => Some(other.to_string()),
            });
            SubmitFailure::Rejected { status, detail }
        }
        Err(e) => SubmitFailure::MalformedErrorBody {
            status,
            reason: e.to_string(),
        },
    }
}
