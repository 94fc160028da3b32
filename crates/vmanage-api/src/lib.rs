//! Async client for the vManage SD-WAN controller REST API.
//!
//! [`SessionClient`] owns the authenticated session: form login against
//! `j_security_check`, the `JSESSIONID` cookie (kept in the client's jar) and
//! the optional anti-forgery token echoed back as `X-XSRF-TOKEN`. Responses
//! are returned as raw JSON; [`normalize`] hides the controller's
//! `{ "data": [...] }` versus bare-array envelope inconsistency.

pub mod auth;
pub mod client;
pub mod envelope;
pub mod error;
pub mod transport;

pub use auth::Credentials;
pub use client::{PutResponse, ResponseBody, SessionClient};
pub use envelope::{normalize, normalize_or_empty};
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
