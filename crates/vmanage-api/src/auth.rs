use secrecy::SecretString;

/// Name of the session cookie set by a successful form login.
pub const SESSION_COOKIE: &str = "JSESSIONID";

/// Header carrying the anti-forgery token on authenticated calls.
pub const XSRF_HEADER: &str = "X-XSRF-TOKEN";

/// Form login endpoint, relative to the bare host.
pub(crate) const LOGIN_PATH: &str = "j_security_check";

/// Token endpoint, relative to the API base path.
pub(crate) const TOKEN_PATH: &str = "client/token";

/// API base path under the controller host.
pub(crate) const API_BASE_PATH: &str = "dataservice";

/// Username/password pair for the controller's form login.
///
/// Resolution of these values (flags, profiles, keyring, vault) happens
/// outside this crate; the client only consumes the pair.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
        }
    }
}
