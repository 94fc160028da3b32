// ── Runtime connection configuration ──
//
// Describes how to reach one controller. Carries credentials and transport
// tuning but never touches disk: the binary resolves profiles, environment
// and vault files, then hands a `ControllerConfig` in.

use std::time::Duration;

use url::Url;
use vmanage_api::transport::DEFAULT_TIMEOUT;
use vmanage_api::{Credentials, TlsMode, TransportConfig};

/// Configuration for connecting to a single controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Controller root URL (e.g. `https://vmanage.example.net:8443`).
    pub url: Url,
    pub credentials: Credentials,
    pub tls: TlsMode,
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn new(url: Url, credentials: Credentials) -> Self {
        Self {
            url,
            credentials,
            tls: TlsMode::default(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_tls(mut self, tls: TlsMode) -> Self {
        self.tls = tls;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            cookie_jar: None,
        }
        .with_cookie_jar()
    }
}
