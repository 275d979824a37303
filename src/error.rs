//! Transport error type
//!
//! The only failure the cache engine models. It is stored inside failed
//! request state, so it must be cheap to clone.

/// Failure reported by a [`Transport`](crate::transport::Transport) call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// Server answered with a non-success status.
    #[error("API request failed: {status} ({url})")]
    Status { status: u16, url: String },

    /// Request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// Response body was not the expected JSON shape.
    #[error("Failed to parse response: {0}")]
    Decode(String),

    /// A slug lookup matched no entity.
    #[error("No entity found for slug '{slug}'")]
    Empty { slug: String },
}

impl TransportError {
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        match err.status() {
            Some(status) => Self::Status {
                status: status.as_u16(),
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            },
            None => Self::Network(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(err: serde_json::Error) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Format a transport error for display
/// Security: avoids echoing raw server payloads back to the user
pub fn format_transport_error(error: &TransportError) -> String {
    match error {
        TransportError::Status { status: 401, .. } => {
            "Authentication failed. Check the API credentials.".to_string()
        }
        TransportError::Status { status: 403, .. } => {
            "Permission denied for this resource.".to_string()
        }
        TransportError::Status { status: 404, .. } => "Resource not found.".to_string(),
        TransportError::Status { status: 429, .. } => {
            "Rate limit exceeded. Please try again later.".to_string()
        }
        TransportError::Status { status: 400, .. } => {
            "Invalid request. Check your query parameters.".to_string()
        }
        TransportError::Status { status, .. } if *status >= 500 => {
            "Server temporarily unavailable. Please try again.".to_string()
        }
        TransportError::Status { status, .. } => format!("Request failed with status {}.", status),
        TransportError::Network(_) => {
            "Request failed. Check your network connection and try again.".to_string()
        }
        TransportError::Decode(_) => "Unexpected response from the server.".to_string(),
        TransportError::Empty { slug } => format!("Nothing found for '{}'.", slug),
    }
}
