use http::StatusCode;
use switchboard_core::HttpError;
use thiserror::Error;

/// Errors produced while serving a chat completion
#[derive(Debug, Error)]
pub enum LlmError {
    /// Connection to the backend could not be established or broke mid-request
    #[error("backend unreachable: {0}")]
    BackendUnreachable(String),

    /// Backend did not answer within the configured timeout
    #[error("backend timed out: {0}")]
    BackendTimeout(String),

    /// Backend answered with a non-success status
    #[error("backend returned {status}: {body}")]
    BackendRejected { status: StatusCode, body: String },

    /// Backend answered 2xx with a body that does not decode
    #[error("malformed backend payload: {0}")]
    MalformedBackendPayload(String),

    /// Client sent a malformed or invalid request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Unexpected internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl LlmError {
    /// Classify a transport failure from the HTTP client
    pub fn from_transport(error: &reqwest::Error) -> Self {
        if error.is_timeout() {
            Self::BackendTimeout(error.to_string())
        } else if error.is_decode() {
            Self::MalformedBackendPayload(error.to_string())
        } else {
            Self::BackendUnreachable(error.to_string())
        }
    }
}

impl HttpError for LlmError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::BackendUnreachable(_) | Self::BackendRejected { .. } | Self::MalformedBackendPayload(_) => {
                StatusCode::BAD_GATEWAY
            }
            Self::BackendTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            Self::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_type(&self) -> &str {
        match self {
            Self::BackendUnreachable(_) | Self::BackendTimeout(_) => "upstream_unavailable",
            Self::BackendRejected { .. } => "upstream_error",
            Self::MalformedBackendPayload(_) => "upstream_payload_error",
            Self::InvalidRequest(_) => "invalid_request_error",
            Self::Internal(_) => "internal_error",
        }
    }

    fn client_message(&self) -> String {
        match self {
            Self::Internal(_) => "an internal error occurred".to_owned(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejection_surfaces_status_and_body() {
        let error = LlmError::BackendRejected {
            status: StatusCode::TOO_MANY_REQUESTS,
            body: r#"{"error":"slow down"}"#.to_owned(),
        };

        assert_eq!(error.status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(error.error_type(), "upstream_error");
        assert!(error.client_message().contains("429"));
        assert!(error.client_message().contains("slow down"));
    }

    #[test]
    fn timeout_maps_to_gateway_timeout() {
        let error = LlmError::BackendTimeout("no response headers within 30s".to_owned());
        assert_eq!(error.status_code(), StatusCode::GATEWAY_TIMEOUT);
    }

    #[test]
    fn internal_details_are_hidden() {
        let error = LlmError::Internal("poisoned channel".to_owned());
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(error.client_message(), "an internal error occurred");
    }
}
