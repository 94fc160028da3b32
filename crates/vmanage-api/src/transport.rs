// Transport configuration for building the session's reqwest::Client.
//
// TLS, timeout and cookie settings live here so the session client only
// deals with URL construction and the login handshake.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use reqwest::cookie::Jar;
use tracing::warn;

use crate::error::Error;

/// Default per-request timeout. Requests never wait unbounded.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TLS verification mode.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsMode {
    /// Use the built-in root certificate store.
    #[default]
    Verify,
    /// Trust an additional CA certificate from the given PEM file.
    CustomCa(PathBuf),
    /// Skip certificate verification entirely (internally-signed controllers).
    InsecureSkipVerify,
}

/// Transport configuration for the session's HTTP client.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub tls: TlsMode,
    pub timeout: Duration,
    pub cookie_jar: Option<Arc<Jar>>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            tls: TlsMode::Verify,
            timeout: DEFAULT_TIMEOUT,
            cookie_jar: None,
        }
    }
}

impl TransportConfig {
    /// Toggle certificate verification. `true` disables it.
    pub fn with_insecure_skip_verify(mut self, insecure_skip_verify: bool) -> Self {
        if insecure_skip_verify {
            self.tls = TlsMode::InsecureSkipVerify;
        } else if self.tls == TlsMode::InsecureSkipVerify {
            self.tls = TlsMode::Verify;
        }
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create a config with a fresh cookie jar (for session auth).
    pub fn with_cookie_jar(mut self) -> Self {
        self.cookie_jar = Some(Arc::new(Jar::default()));
        self
    }

    /// Whether certificate verification is disabled.
    pub fn insecure_skip_verify(&self) -> bool {
        self.tls == TlsMode::InsecureSkipVerify
    }

    /// Build a `reqwest::Client` from this config.
    pub fn build_client(&self) -> Result<reqwest::Client, Error> {
        let mut builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(concat!("vmanage-cli/", env!("CARGO_PKG_VERSION")));

        match &self.tls {
            TlsMode::Verify => {}
            TlsMode::CustomCa(path) => {
                let cert_pem = std::fs::read(path)
                    .map_err(|e| Error::Tls(format!("failed to read CA cert: {e}")))?;
                let cert = reqwest::Certificate::from_pem(&cert_pem)
                    .map_err(|e| Error::Tls(format!("invalid CA cert: {e}")))?;
                builder = builder.add_root_certificate(cert);
            }
            TlsMode::InsecureSkipVerify => {
                warn!("TLS certificate verification is disabled");
                builder = builder.danger_accept_invalid_certs(true);
            }
        }

        if let Some(ref jar) = self.cookie_jar {
            builder = builder.cookie_provider(Arc::clone(jar));
        }

        builder
            .build()
            .map_err(|e| Error::Tls(format!("failed to build HTTP client: {e}")))
    }
}
