use crate::util::is_local_endpoint_url;
use thiserror::Error;

/// Failures talking to the generation backend.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Failed to start generation: {reason}")]
    StartFailed { status: u16, reason: String },

    #[error("cannot reach local API endpoint '{url}': {source}. Start the backend or update QUILL_API_URL.")]
    LocalUnreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("cannot reach API endpoint '{url}': {source}")]
    Unreachable {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API request to '{url}' timed out: {source}")]
    Timeout {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("API endpoint '{url}' returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("API request to '{url}' failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("invalid response body from '{url}': {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

impl ClientError {
    pub fn from_reqwest(error: reqwest::Error, url: &str) -> Self {
        let url = url.to_string();
        if error.is_connect() && is_local_endpoint_url(&url) {
            return ClientError::LocalUnreachable { url, source: error };
        }
        if error.is_connect() {
            return ClientError::Unreachable { url, source: error };
        }
        if error.is_timeout() {
            return ClientError::Timeout { url, source: error };
        }
        if let Some(status) = error.status() {
            return ClientError::Status {
                url,
                status: status.as_u16(),
            };
        }
        ClientError::Request { url, source: error }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::StartFailed { status, .. } | ClientError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}
