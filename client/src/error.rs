//! Errors produced by the network layer.
//!
//! These never cross the store boundary: stores log them, turn them into UI
//! events, and hand callers an `Option`/`bool` sentinel instead.

/// Errors produced by [`crate::net::api::ApiClient`] operations.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status other than 401.
    #[error("server returned status {status}")]
    Status { status: u16, body: String },

    /// The backend answered 401, or no usable token was available.
    #[error("not authenticated")]
    Unauthorized,

    /// The response body did not match the expected schema.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    /// Input rejected locally before any request was issued.
    #[error("{0}")]
    Validation(String),

    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),
}

impl ApiError {
    /// Stable machine-readable code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Status { .. } => "E_STATUS",
            Self::Unauthorized => "E_UNAUTHORIZED",
            Self::Decode(_) => "E_DECODE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
            Self::Validation(_) => "E_VALIDATION",
            Self::Config(_) => "E_CONFIG",
        }
    }

    #[must_use]
    pub fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Status { status: 429 | 500..=599, .. })
    }

    /// Text for a toast body.
    ///
    /// Prefers the backend's own `detail`/`message` field when the error body
    /// carries one.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status, body } => {
                detail_from_body(body).unwrap_or_else(|| format!("Server responded with status {status}"))
            }
            Self::Transport(_) => "Could not reach the server. Check your connection.".to_owned(),
            Self::Unauthorized => "Your session has expired. Please sign in again.".to_owned(),
            Self::Decode(_) => "The server sent an unexpected response.".to_owned(),
            other => other.to_string(),
        }
    }
}

impl From<wire::WireError> for ApiError {
    fn from(err: wire::WireError) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Extract a human-readable message from a JSON error body.
///
/// Accepts `{"detail": "..."}`, `{"message": "..."}` and `{"error": "..."}`.
pub(crate) fn detail_from_body(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["detail", "message", "error"]
        .iter()
        .find_map(|key| value.get(*key).and_then(serde_json::Value::as_str))
        .filter(|text| !text.trim().is_empty())
        .map(str::to_owned)
}

#[cfg(test)]
#[path = "error_test.rs"]
mod tests;
