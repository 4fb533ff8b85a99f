//! # API Proxy
//!
//! Forwards API traffic to a backend so the component under development can
//! talk to it from the same origin. A request is forwarded when its URL
//! matches [`API_PATTERN`] and it is not a static asset (`.html`, `.js`,
//! `.css`, `.png`), except the login landing page which always goes upstream.
//!
//! The check runs against the full request target, query string included,
//! so it is a heuristic: a package named `user-card` would have its own files
//! proxied.

use crate::error::ProxyError;
use crate::server::ParsedRequest;
use http::Method;
use regex::Regex;
use std::time::Duration;

/// Keywords that mark a request as API traffic.
pub const API_PATTERN: &str = "api|auth|screener|user|logout|session";

const STATIC_MARKERS: [&str; 4] = [".html", ".js", ".css", ".png"];
const LOGIN_SUCCESS_PAGE: &str = "login-success.html";

/// Headers that describe a single connection and are never forwarded.
const HOP_BY_HOP: [&str; 10] = [
    "connection",
    "keep-alive",
    "proxy-authenticate",
    "proxy-authorization",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
    "content-length",
];

/// Backend the API proxy forwards to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyTarget {
    pub host: String,
    pub port: u16,
}

impl Default for ProxyTarget {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8421,
        }
    }
}

impl ProxyTarget {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn origin(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

/// Upstream response, ready to be written back to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

/// Whether `name` may cross the proxy in either direction.
pub fn is_forwardable_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name != "host" && !HOP_BY_HOP.contains(&name.as_str())
}

/// Matches API requests and forwards them to one backend.
#[derive(Debug, Clone)]
pub struct ApiProxy {
    target: ProxyTarget,
    pattern: Regex,
    client: reqwest::blocking::Client,
}

impl ApiProxy {
    pub fn new(target: ProxyTarget) -> Result<Self, ProxyError> {
        let client = reqwest::blocking::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            target,
            pattern: Regex::new(API_PATTERN)?,
            client,
        })
    }

    pub fn target(&self) -> &ProxyTarget {
        &self.target
    }

    /// Whether the request target `url` belongs to the backend.
    pub fn matches(&self, url: &str) -> bool {
        if !self.pattern.is_match(url) {
            return false;
        }
        let is_static = STATIC_MARKERS.iter().any(|marker| url.contains(marker));
        !is_static || url.contains(LOGIN_SUCCESS_PAGE)
    }

    /// Send `request` to the backend and collect its full response.
    pub fn forward(&self, request: &ParsedRequest) -> Result<ProxiedResponse, ProxyError> {
        let method = Method::from_bytes(request.method.as_bytes())
            .map_err(|_| ProxyError::InvalidMethod(request.method.clone()))?;
        let url = format!("{}{}", self.target.origin(), request.url);
        let mut builder = self.client.request(method, url);
        for (name, value) in &request.headers {
            if is_forwardable_header(name) {
                builder = builder.header(name.as_str(), value.as_str());
            }
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter(|(name, _)| is_forwardable_header(name.as_str()))
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response.bytes()?.to_vec();
        Ok(ProxiedResponse {
            status,
            headers,
            body,
        })
    }
}
