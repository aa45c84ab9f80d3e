use std::fmt;

/// Alert shown for every failure on the read path.
pub const FETCH_FAILURE_ALERT: &str = "Could not fetch leads from the server.";

/// Message used when a rejected submission carries no `detail`.
pub const UNKNOWN_SUBMIT_ERROR: &str = "An unknown error occurred.";

/// Failure on the read path (`GET /api/v1/leads`).
#[derive(Debug, Clone, PartialEq)]
pub enum FetchFailure {
    /// The request never produced a response.
    Transport(String),
    /// The scoring API answered with a non-2xx status.
    Status(u16),
    /// The response body was not a list of scored leads.
    Decode(String),
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchFailure::Transport(msg) => write!(f, "Transport error: {}", msg),
            FetchFailure::Status(status) => write!(f, "HTTP error! status: {}", status),
            FetchFailure::Decode(msg) => write!(f, "Failed to parse leads response: {}", msg),
        }
    }
}

impl From<reqwest::Error> for FetchFailure {
    fn from(err: reqwest::Error) -> Self {
        FetchFailure::Transport(err.to_string())
    }
}

/// Failure on the write path (`POST /api/v1/score`).
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitFailure {
    /// The request never produced a response.
    Transport(String),
    /// Non-2xx with a JSON error body; `detail` is `None` when the body lacks one.
    Rejected { status: u16, detail: Option<String> },
    /// Non-2xx whose error body could not be parsed as JSON.
    MalformedErrorBody { status: u16, reason: String },
}

impl SubmitFailure {
    /// The text that follows `Failed to score lead: ` in the user alert.
    pub fn message(&self) -> String {
        match self {
            SubmitFailure::Transport(msg) => msg.clone(),
            SubmitFailure::Rejected {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => detail.clone(),
            SubmitFailure::Rejected { .. } => UNKNOWN_SUBMIT_ERROR.to_string(),
            SubmitFailure::MalformedErrorBody { status, reason } => format!(
                "could not parse error response (HTTP {}): {}",
                status, reason
            ),
        }
    }

    pub fn alert_text(&self) -> String {
        format!("Failed to score lead: {}", self.message())
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            SubmitFailure::Transport(_) => None,
            SubmitFailure::Rejected { status, .. }
            | SubmitFailure::MalformedErrorBody { status, .. } => Some(*status),
        }
    }
}

impl fmt::Display for SubmitFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl From<reqwest::Error> for SubmitFailure {
    fn from(err: reqwest::Error) -> Self {
        SubmitFailure::Transport(err.to_string())
    }
}

/// Application-level error type.
#[derive(Debug, Clone)]
pub enum AppError {
    Fetch(FetchFailure),
    Submit(SubmitFailure),
    /// Client or server could not be set up.
    Config(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Fetch(e) => write!(f, "Failed to fetch leads: {}", e),
            AppError::Submit(e) => write!(f, "Error submitting lead: {}", e),
            AppError::Config(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<FetchFailure> for AppError {
    fn from(err: FetchFailure) -> Self {
        AppError::Fetch(err)
    }
}

impl From<SubmitFailure> for AppError {
    fn from(err: SubmitFailure) -> Self {
        AppError::Submit(err)
    }
}
