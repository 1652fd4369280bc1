use std::time::Duration;

use rmcp::model::ErrorData;

#[derive(Debug, thiserror::Error)]
pub enum OrgReposError {
    #[error("empty arguments: provide an organization name or url")]
    EmptyArguments,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("GitHub request failed: {}", github_cause(.0))]
    GitHub(#[from] octocrab::Error),

    #[error("GitHub request timed out after {0:?}")]
    Timeout(Duration),

    #[error("GitHub API error (status {status}): {body}")]
    Upstream { status: u16, body: String },

    #[error("failed to parse response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("request cancelled")]
    Cancelled,
}

/// octocrab's own `Display` appends a backtrace, so report the underlying cause.
fn github_cause(e: &octocrab::Error) -> String {
    match std::error::Error::source(e) {
        Some(cause) => cause.to_string(),
        None => e.to_string(),
    }
}

impl OrgReposError {
    pub fn to_mcp_error(&self) -> ErrorData {
        match self {
            OrgReposError::EmptyArguments | OrgReposError::InvalidRequest(_) => {
                ErrorData::invalid_params(self.to_string(), None)
            }
            OrgReposError::GitHub(_)
            | OrgReposError::Timeout(_)
            | OrgReposError::Upstream { .. }
            | OrgReposError::Decode(_)
            | OrgReposError::Cancelled => ErrorData::internal_error(self.to_string(), None),
        }
    }
}
