use may_minihttp::Request;
use std::io::Read;
use tracing::{debug, info};

/// Parsed HTTP request data used by `PolyserveService`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,
    /// Request target including the query string
    pub url: String,
    /// Request path without query string or fragment
    pub pathname: String,
    /// HTTP headers in arrival order (lowercase names)
    pub headers: Vec<(String, String)>,
    /// Raw request body
    pub body: Vec<u8>,
}

impl ParsedRequest {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    pub fn is_get_or_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET") || self.method.eq_ignore_ascii_case("HEAD")
    }

    pub fn is_head(&self) -> bool {
        self.method.eq_ignore_ascii_case("HEAD")
    }
}

/// Strip the query string and fragment from a request target.
pub fn pathname_of(url: &str) -> &str {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    match &url[..end] {
        "" => "/",
        path => path,
    }
}

/// Parse an incoming HTTP request into a [`ParsedRequest`].
pub fn parse_request(req: Request) -> ParsedRequest {
    let method = req.method().to_string();
    let url = req.path().to_string();
    let pathname = pathname_of(&url).to_string();

    let headers: Vec<(String, String)> = req
        .headers()
        .iter()
        .map(|h| {
            (
                h.name.to_ascii_lowercase(),
                String::from_utf8_lossy(h.value).to_string(),
            )
        })
        .collect();
    debug!(header_count = headers.len(), "Headers extracted");

    let mut body = Vec::new();
    if let Err(err) = req.body().read_to_end(&mut body) {
        debug!(error = %err, "Request body unreadable");
        body.clear();
    }

    info!(
        method = %method,
        path = %pathname,
        body_size_bytes = body.len(),
        "HTTP request parsed"
    );

    ParsedRequest {
        method,
        url,
        pathname,
        headers,
        body,
    }
}
