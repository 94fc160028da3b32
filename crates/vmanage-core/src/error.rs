// ── Core error types ──
//
// User-facing errors from vmanage-core. The `From<vmanage_api::Error>` impl
// translates transport-layer errors into domain-appropriate variants; the
// controller attaches the endpoint to shape errors itself.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to controller at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Request timed out: {message}")]
    Timeout { message: String },

    #[error("TLS error: {message}")]
    Tls { message: String },

    // ── Response errors ──────────────────────────────────────────────
    #[error("HTTP {status} from controller: {message}")]
    Http { status: u16, message: String },

    #[error("Unexpected {endpoint} response format: {preview}")]
    UnexpectedShape { endpoint: String, preview: String },

    #[error("Invalid controller payload: {message}")]
    InvalidPayload { message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Invalid IP prefix '{value}': {reason}")]
    InvalidPrefix { value: String, reason: String },

    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    /// Attach the endpoint to a shape error raised without one.
    pub(crate) fn at_endpoint(self, endpoint: &str) -> Self {
        match self {
            Self::UnexpectedShape { preview, .. } => Self::UnexpectedShape {
                endpoint: endpoint.to_owned(),
                preview,
            },
            other => other,
        }
    }
}

impl From<vmanage_api::Error> for CoreError {
    fn from(err: vmanage_api::Error) -> Self {
        use vmanage_api::Error as ApiError;

        match err {
            ApiError::Authentication { message } => Self::AuthenticationFailed { message },
            ApiError::Transport(ref e) if e.is_timeout() => Self::Timeout {
                message: e.to_string(),
            },
            ApiError::Transport(e) => Self::ConnectionFailed {
                url: e.url().map(ToString::to_string).unwrap_or_default(),
                reason: e.to_string(),
            },
            ApiError::InvalidUrl(e) => Self::Config {
                message: format!("invalid controller URL: {e}"),
            },
            ApiError::Tls(message) => Self::Tls { message },
            ApiError::Http { status, body } => Self::Http {
                status,
                message: body,
            },
            ApiError::Shape { preview } => Self::UnexpectedShape {
                endpoint: "controller".into(),
                preview,
            },
            ApiError::Deserialization { message, .. } => Self::InvalidPayload { message },
        }
    }
}
