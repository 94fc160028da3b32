// Session client for the vManage REST API
//
// Wraps `reqwest::Client` with the controller's form login, session cookie
// capture, anti-forgery token handling and `dataservice` URL construction.
// The client is owned by exactly one caller; the token only changes during
// `login`, which takes `&mut self`.

use std::sync::Arc;

use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::ACCEPT;
use secrecy::ExposeSecret;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::auth::{
    API_BASE_PATH, Credentials, LOGIN_PATH, SESSION_COOKIE, TOKEN_PATH, XSRF_HEADER,
};
use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest body excerpt carried in error messages.
const PREVIEW_LEN: usize = 200;

/// Body of a PUT response: parsed JSON when possible, raw text otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Json(Value),
    Text(String),
}

impl ResponseBody {
    pub fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(v) => Some(v),
            Self::Text(_) => None,
        }
    }
}

/// Outcome of a PUT. A non-2xx status is reported here, not raised.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PutResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl PutResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Authenticated channel to a single vManage controller.
///
/// Created once per process, logged in once, then used for every read and
/// write. All calls carry the session cookie through the cookie jar and the
/// anti-forgery token (when the controller issued one) as `X-XSRF-TOKEN`.
pub struct SessionClient {
    http: reqwest::Client,
    /// Controller root without a trailing slash (e.g. `https://vmanage:8443`).
    host: String,
    /// Anti-forgery token fetched after login. Absent on deployments that
    /// don't issue one.
    token: Option<String>,
    /// Cookie jar reference for inspecting the session cookie.
    cookie_jar: Option<Arc<Jar>>,
}

impl SessionClient {
    /// Create a client for `host` from a `TransportConfig`.
    ///
    /// If the config doesn't already include a cookie jar, one is created
    /// automatically (the session lives in a cookie).
    pub fn new(host: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let config = if transport.cookie_jar.is_some() {
            transport.clone()
        } else {
            transport.clone().with_cookie_jar()
        };
        let cookie_jar = config.cookie_jar.clone();
        let http = config.build_client()?;
        Ok(Self {
            http,
            host: normalize_host(host)?,
            token: None,
            cookie_jar,
        })
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// The client must have a cookie store enabled for the session to
    /// survive past `login`.
    pub fn with_client(http: reqwest::Client, host: &str) -> Result<Self, Error> {
        Ok(Self {
            http,
            host: normalize_host(host)?,
            token: None,
            cookie_jar: None,
        })
    }

    /// Build a client and log in. The usual entry point.
    pub async fn connect(
        host: &str,
        credentials: &Credentials,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut client = Self::new(host, transport)?;
        client.login(credentials).await?;
        Ok(client)
    }

    /// The controller root URL.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The anti-forgery token, if the controller issued one.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// The `Cookie` header the jar would send to the controller.
    pub fn cookie_header(&self) -> Option<String> {
        let jar = self.cookie_jar.as_ref()?;
        let url = Url::parse(&self.host).ok()?;
        let cookies = jar.cookies(&url)?;
        cookies.to_str().ok().map(String::from)
    }

    // ── Authentication ───────────────────────────────────────────────

    /// Authenticate with the controller's form login.
    ///
    /// Posts `j_username` / `j_password` to `{host}/j_security_check`. The
    /// controller answers failed logins with HTTP 200 and an HTML page, so
    /// success additionally requires a `JSESSIONID` cookie. Afterwards the
    /// anti-forgery token is fetched best-effort.
    pub async fn login(&mut self, credentials: &Credentials) -> Result<(), Error> {
        let url = self.host_url(LOGIN_PATH)?;
        debug!("logging in at {}", url);

        let form = [
            ("j_username", credentials.username.as_str()),
            ("j_password", credentials.password.expose_secret()),
        ];

        let resp = self.http.post(url).form(&form).send().await?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Authentication {
                message: format!("login failed (HTTP {status})"),
            });
        }

        let cookie_in_response = resp.cookies().any(|c| c.name() == SESSION_COOKIE);
        if !cookie_in_response && !self.jar_has_session() {
            return Err(Error::Authentication {
                message: format!("no {SESSION_COOKIE} cookie in login response"),
            });
        }

        debug!("login successful");
        self.fetch_token().await;
        Ok(())
    }

    /// Fetch the anti-forgery token. Failures leave the token absent.
    async fn fetch_token(&mut self) {
        let url = match self.api_url(TOKEN_PATH) {
            Ok(url) => url,
            Err(e) => {
                debug!(error = %e, "cannot build token URL");
                return;
            }
        };

        debug!("GET {}", url);
        match self.http.get(url).send().await {
            Ok(resp) if resp.status().is_success() => match resp.text().await {
                Ok(text) if !text.trim().is_empty() => {
                    debug!("storing anti-forgery token");
                    self.token = Some(text.trim().to_owned());
                }
                Ok(_) => debug!("token endpoint returned an empty body"),
                Err(e) => debug!(error = %e, "failed to read token body"),
            },
            Ok(resp) => {
                debug!(status = %resp.status(), "no anti-forgery token issued");
            }
            Err(e) => debug!(error = %e, "token request failed"),
        }
    }

    fn jar_has_session(&self) -> bool {
        self.cookie_header()
            .is_some_and(|header| has_cookie(&header, SESSION_COOKIE))
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// `{host}/{path}` for endpoints outside the API base (login).
    fn host_url(&self, path: &str) -> Result<Url, Error> {
        let path = path.trim_matches('/');
        Ok(Url::parse(&format!("{}/{path}", self.host))?)
    }

    /// `{host}/dataservice/{path}`, with the relative path's leading and
    /// trailing slashes stripped so no double slash can appear.
    pub fn api_url(&self, path: &str) -> Result<Url, Error> {
        let path = path.trim_matches('/');
        Ok(Url::parse(&format!("{}/{API_BASE_PATH}/{path}", self.host))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    fn apply_token(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.token.as_deref() {
            Some(token) => builder.header(XSRF_HEADER, token),
            None => builder,
        }
    }

    /// GET a JSON document. Any non-2xx status is an [`Error::Http`].
    pub async fn get(&self, path: &str) -> Result<Value, Error> {
        let url = self.api_url(path)?;
        debug!("GET {}", url);

        let builder = self
            .apply_token(self.http.get(url))
            .header(ACCEPT, "application/json");
        let resp = builder.send().await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                body,
            });
        }

        serde_json::from_str(&body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&body)),
            body: body.clone(),
        })
    }

    /// PUT a JSON body.
    ///
    /// Unlike [`get`](Self::get), a non-2xx status is logged and returned
    /// with whatever body the controller sent, so the caller can inspect
    /// error payloads. A body that isn't JSON comes back as text.
    pub async fn put<B>(&self, path: &str, body: &B) -> Result<PutResponse, Error>
    where
        B: Serialize + ?Sized,
    {
        let url = self.api_url(path)?;
        debug!("PUT {}", url);

        let builder = self
            .apply_token(self.http.put(url))
            .header(ACCEPT, "application/json")
            .json(body);
        let resp = builder.send().await?;

        let status = resp.status();
        let text = resp.text().await?;

        if !status.is_success() {
            warn!(status = status.as_u16(), "PUT {path} returned HTTP {status}");
        }

        let body = match serde_json::from_str::<Value>(&text) {
            Ok(json) => ResponseBody::Json(json),
            Err(e) => {
                debug!(error = %e, "PUT response is not JSON; returning raw text");
                ResponseBody::Text(text)
            }
        };

        Ok(PutResponse {
            status: status.as_u16(),
            body,
        })
    }
}

fn normalize_host(host: &str) -> Result<String, Error> {
    let url = Url::parse(host.trim())?;
    Ok(url.as_str().trim_end_matches('/').to_owned())
}

fn has_cookie(header: &str, name: &str) -> bool {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .any(|(key, _)| key == name)
}

pub(crate) fn preview(body: &str) -> &str {
    let mut end = body.len().min(PREVIEW_LEN);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
