//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` variants into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use vmanage_config::ConfigError;
use vmanage_core::CoreError;

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────
    #[error("Could not connect to controller at {url}")]
    #[diagnostic(
        code(vmanage::connection_failed),
        help(
            "Check that the controller is reachable.\n\
             Cause: {reason}\n\
             For an internally-signed certificate try --insecure (-k) or --ca-cert."
        )
    )]
    ConnectionFailed { url: String, reason: String },

    #[error("TLS setup failed: {message}")]
    #[diagnostic(
        code(vmanage::tls_error),
        help("Check the CA certificate path, or use --insecure (-k) for lab controllers.")
    )]
    TlsError { message: String },

    // ── Authentication ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    #[diagnostic(
        code(vmanage::auth_failed),
        help(
            "Verify the username and password for this controller.\n\
             Store a new password with: vmanage config set-password"
        )
    )]
    AuthFailed { message: String },

    #[error("{message}")]
    #[diagnostic(
        code(vmanage::no_credentials),
        help(
            "Configure a profile with: vmanage config init\n\
             Or set VMANAGE_HOST, VMANAGE_USERNAME and VMANAGE_PASSWORD."
        )
    )]
    NoCredentials { message: String },

    #[error("Permission denied (HTTP {status})")]
    #[diagnostic(
        code(vmanage::permission_denied),
        help("The account may lack the role required for this endpoint.\n{body}")
    )]
    PermissionDenied { status: u16, body: String },

    // ── Resources ────────────────────────────────────────────────────
    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(code(vmanage::not_found), help("{hint}"))]
    NotFound {
        resource_type: String,
        identifier: String,
        hint: String,
    },

    // ── Controller responses ─────────────────────────────────────────
    #[error("Controller returned HTTP {status}")]
    #[diagnostic(code(vmanage::http_error), help("{body}"))]
    Http { status: u16, body: String },

    #[error("Unexpected {endpoint} response format")]
    #[diagnostic(
        code(vmanage::unexpected_response),
        help("Response began with: {preview}")
    )]
    UnexpectedResponse { endpoint: String, preview: String },

    #[error("Controller rejected the update (HTTP {status})")]
    #[diagnostic(
        code(vmanage::push_rejected),
        help("The response body is shown above. No changes were applied.")
    )]
    PushRejected { status: u16 },

    // ── Validation ───────────────────────────────────────────────────
    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(vmanage::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────
    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(vmanage::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: vmanage config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error(transparent)]
    #[diagnostic(code(vmanage::config))]
    Config(ConfigError),

    // ── Interactive ──────────────────────────────────────────────────
    #[error("Operation '{action}' requires confirmation")]
    #[diagnostic(
        code(vmanage::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── Timeout ──────────────────────────────────────────────────────
    #[error("Request timed out")]
    #[diagnostic(
        code(vmanage::timeout),
        help("Increase the timeout with --timeout or check controller responsiveness.\n{message}")
    )]
    Timeout { message: String },

    // ── IO / Serialization ───────────────────────────────────────────
    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(vmanage::serialize))]
    Serialize(String),

    #[error("CSV export failed: {0}")]
    #[diagnostic(code(vmanage::csv))]
    Csv(#[from] csv::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::AuthFailed { .. } | Self::NoCredentials { .. } => exit_code::AUTH,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::Timeout { .. } => exit_code::TIMEOUT,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ConnectionFailed { url, reason } => Self::ConnectionFailed { url, reason },
            CoreError::AuthenticationFailed { message } => Self::AuthFailed { message },
            CoreError::Timeout { message } => Self::Timeout { message },
            CoreError::Tls { message } => Self::TlsError { message },

            CoreError::Http {
                status: status @ (401 | 403),
                message,
            } => Self::PermissionDenied {
                status,
                body: message,
            },
            CoreError::Http {
                status: 404,
                message,
            } => Self::NotFound {
                resource_type: "Endpoint".into(),
                identifier: "HTTP 404".into(),
                hint: message,
            },
            CoreError::Http { status, message } => Self::Http {
                status,
                body: message,
            },

            CoreError::UnexpectedShape { endpoint, preview } => {
                Self::UnexpectedResponse { endpoint, preview }
            }
            CoreError::InvalidPayload { message } => Self::UnexpectedResponse {
                endpoint: "controller".into(),
                preview: message,
            },

            CoreError::InvalidPrefix { value, reason } => Self::Validation {
                field: "prefix".into(),
                reason: format!("'{value}': {reason}"),
            },

            CoreError::NotFound {
                entity_type,
                identifier,
            } => Self::NotFound {
                resource_type: entity_type,
                identifier,
                hint: "Check the list command for available entries.".into(),
            },

            CoreError::Config { message } => Self::Validation {
                field: "config".into(),
                reason: message,
            },
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { .. } => Self::NoCredentials {
                message: err.to_string(),
            },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_statuses_map_to_distinct_exit_codes() {
        let code = |status| {
            CliError::from(CoreError::Http {
                status,
                message: String::new(),
            })
            .exit_code()
        };
        assert_eq!(code(401), exit_code::PERMISSION);
        assert_eq!(code(403), exit_code::PERMISSION);
        assert_eq!(code(404), exit_code::NOT_FOUND);
        assert_eq!(code(500), exit_code::GENERAL);
    }

    #[test]
    fn transport_failures_map_to_connection_and_timeout() {
        let conn = CliError::from(CoreError::ConnectionFailed {
            url: "https://x".into(),
            reason: "refused".into(),
        });
        assert_eq!(conn.exit_code(), exit_code::CONNECTION);

        let timeout = CliError::from(CoreError::Timeout {
            message: "30s".into(),
        });
        assert_eq!(timeout.exit_code(), exit_code::TIMEOUT);
    }

    #[test]
    fn auth_and_missing_credentials_share_the_auth_code() {
        let auth = CliError::from(CoreError::AuthenticationFailed {
            message: "no cookie".into(),
        });
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let missing = CliError::from(ConfigError::NoCredentials {
            profile: "default".into(),
            missing: "password".into(),
        });
        assert_eq!(missing.exit_code(), exit_code::AUTH);
        assert_eq!(
            missing.to_string(),
            "no password configured for profile 'default'"
        );
    }

    #[test]
    fn bad_prefix_is_a_usage_error() {
        let err = CliError::from(CoreError::InvalidPrefix {
            value: "nope".into(),
            reason: "not an IP address".into(),
        });
        assert_eq!(err.exit_code(), exit_code::USAGE);
    }
}
