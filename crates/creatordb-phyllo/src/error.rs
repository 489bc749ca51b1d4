use thiserror::Error;

/// Errors returned by the Phyllo API client.
#[derive(Debug, Error)]
pub enum PhylloError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-2xx status.
    #[error("Phyllo API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The client-credentials token exchange failed.
    #[error("{0}")]
    Auth(String),

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid Phyllo base URL '{0}'")]
    InvalidBaseUrl(String),
}

impl PhylloError {
    /// HTTP status reported by the API, if the failure came from a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            PhylloError::Api { status, .. } => Some(*status),
            PhylloError::Http(e) => e.status().map(|s| s.as_u16()),
            PhylloError::Auth(_)
            | PhylloError::Deserialize { .. }
            | PhylloError::InvalidBaseUrl(_) => None,
        }
    }
}

/// Pull the most useful message out of an error response body.
///
/// Phyllo error bodies look like `{"error": {"message": "..."}}`; other
/// shapes fall back to a top-level `message`, a string `error`, or the raw
/// body text.
pub(crate) fn upstream_message(body: &str) -> String {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return body.trim().to_string();
    };
    json.get("error")
        .and_then(|e| e.get("message"))
        .or_else(|| json.get("message"))
        .or_else(|| json.get("error"))
        .and_then(serde_json::Value::as_str)
        .map_or_else(|| body.trim().to_string(), ToOwned::to_owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upstream_message_prefers_nested_error_message() {
        let body = r#"{"error": {"message": "user not found", "code": "404"}}"#;
        assert_eq!(upstream_message(body), "user not found");
    }

    #[test]
    fn upstream_message_uses_top_level_message() {
        assert_eq!(upstream_message(r#"{"message": "bad request"}"#), "bad request");
    }

    #[test]
    fn upstream_message_uses_string_error() {
        assert_eq!(upstream_message(r#"{"error": "invalid_client"}"#), "invalid_client");
    }

    #[test]
    fn upstream_message_falls_back_to_raw_text() {
        assert_eq!(upstream_message("  gateway timeout \n"), "gateway timeout");
    }

    #[test]
    fn api_error_exposes_status() {
        let err = PhylloError::Api {
            status: 503,
            message: "down".to_string(),
        };
        assert_eq!(err.status(), Some(503));
        assert_eq!(err.to_string(), "Phyllo API error (503): down");
    }
}
