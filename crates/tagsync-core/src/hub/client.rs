//! XML-RPC client for a single Koji hub.

use std::cell::Cell;
use std::fmt;
use std::time::Duration;

use reqwest::blocking::{Client, ClientBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::{debug, info};
use url::Url;

use super::{KojiSession, PackageEntry};
use crate::error::HubError;
use crate::xmlrpc::{Value, decode_response, encode_call};

const SESSION_ID_HEADER: &str = "Koji-Session-Id";
const SESSION_KEY_HEADER: &str = "Koji-Session-Key";
const CALLNUM_HEADER: &str = "Koji-Session-Callnum";

/// Session credentials handed out by `sslLogin`.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionTokens {
    pub id: i64,
    pub key: String,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("id", &self.id)
            .field("key", &"<redacted>")
            .finish()
    }
}

/// Blocking XML-RPC client bound to one hub URL.
///
/// Calls made after a successful login carry the session headers and a
/// per-session call counter.
#[derive(Debug)]
pub struct HubClient {
    http: Client,
    url: Url,
    session: Option<SessionTokens>,
    callnum: Cell<u64>,
}

impl HubClient {
    /// Wrap a prepared HTTP client; no login is performed.
    pub fn new(http: Client, url: Url) -> Self {
        Self {
            http,
            url,
            session: None,
            callnum: Cell::new(0),
        }
    }

    /// Anonymous client with default TLS settings.
    pub fn anonymous(url: Url, timeout: Duration) -> Result<Self, HubError> {
        let http = Self::builder(timeout).build()?;
        Ok(Self::new(http, url))
    }

    /// HTTP client builder with the settings every hub client shares.
    pub fn builder(timeout: Duration) -> ClientBuilder {
        Client::builder()
            .user_agent(concat!("tagsync/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn session(&self) -> Option<&SessionTokens> {
        self.session.as_ref()
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_some()
    }

    /// Call `method` on the hub.
    pub fn call(&self, method: &str, params: &[Value]) -> Result<Value, HubError> {
        self.post(&self.url, method, params, None)
    }

    /// Obtain a session with `sslLogin` at `login_url`.
    ///
    /// The client certificate (if any) is part of the HTTP client;
    /// `authorization` carries a `Negotiate` token for Kerberos logins.
    pub fn ssl_login(
        &mut self,
        login_url: &Url,
        authorization: Option<&str>,
    ) -> Result<(), HubError> {
        self.session = None;
        let result = self.post(login_url, "sslLogin", &[], authorization)?;

        let id = result.get("session-id").and_then(Value::as_i64);
        let key = result.get("session-key").and_then(Value::as_str);
        match (id, key) {
            (Some(id), Some(key)) => {
                info!(session_id = id, hub = %self.url, "Logged in to hub");
                self.session = Some(SessionTokens {
                    id,
                    key: key.to_string(),
                });
                self.callnum.set(0);
                Ok(())
            }
            _ => Err(HubError::Login(format!(
                "hub at {login_url} did not return a session"
            ))),
        }
    }

    fn post(
        &self,
        url: &Url,
        method: &str,
        params: &[Value],
        authorization: Option<&str>,
    ) -> Result<Value, HubError> {
        debug!(method, url = %url, "Calling hub");

        let mut request = self
            .http
            .post(url.clone())
            .header(CONTENT_TYPE, "text/xml")
            .body(encode_call(method, params));

        if let Some(value) = authorization {
            request = request.header(AUTHORIZATION, value);
        }
        if let Some(session) = &self.session {
            let callnum = self.callnum.get();
            self.callnum.set(callnum + 1);
            request = request
                .header(SESSION_ID_HEADER, session.id.to_string())
                .header(SESSION_KEY_HEADER, session.key.as_str())
                .header(CALLNUM_HEADER, callnum.to_string());
        }

        let response = request.send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(HubError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text()?;
        decode_response(&body)
    }
}

impl KojiSession for HubClient {
    fn list_packages(&self, tag: &str) -> Result<Vec<PackageEntry>, HubError> {
        let result = self.call(
            "listPackages",
            &[Value::kwargs([("tagID", Value::from(tag))])],
        )?;

        let items = result
            .as_array()
            .ok_or_else(|| HubError::decode("listPackages did not return a list"))?;
        items.iter().map(PackageEntry::from_value).collect()
    }

    fn package_list_add(
        &self,
        tag: &str,
        package: &str,
        owner: &str,
        blocked: bool,
    ) -> Result<(), HubError> {
        self.call(
            "packageListAdd",
            &[
                Value::from(tag),
                Value::from(package),
                Value::kwargs([("owner", Value::from(owner)), ("block", Value::Bool(blocked))]),
            ],
        )?;
        Ok(())
    }
}
