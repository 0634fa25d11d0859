use http::StatusCode;

/// Trait for domain errors that can be converted to HTTP responses
///
/// The gatekeeper layer renders implementors as an OpenAI-style error body,
/// so domain crates never depend on axum response types.
pub trait HttpError: std::error::Error {
    /// HTTP status code for this error
    fn status_code(&self) -> StatusCode;

    /// Machine-readable error type (e.g. `invalid_request_error`)
    fn error_type(&self) -> &str;

    /// Message safe to expose to API consumers
    fn client_message(&self) -> String;
}
