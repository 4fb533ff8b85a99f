//! Startup options for [`crate::start::start_server`].

use crate::proxy::ProxyTarget;
use std::path::PathBuf;

/// Host bound when none is configured.
pub const DEFAULT_HOST: &str = "localhost";

/// Page opened in the browser once the server is listening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    /// The package's `index.html`
    Index,
    /// A page path relative to the package's base URL
    Path(String),
}

impl Page {
    pub fn as_path(&self) -> &str {
        match self {
            Page::Index => "index.html",
            Page::Path(path) => path.trim_start_matches('/'),
        }
    }
}

/// Options for one server invocation.
///
/// Treated as immutable input: port negotiation returns a new value with the
/// port filled in instead of mutating the caller's copy.
#[derive(Debug, Clone)]
pub struct ServerOptions {
    pub port: Option<u16>,
    pub host: Option<String>,
    pub page: Option<Page>,
    /// Browsers to open `page` in; empty means the system default
    pub browser: Vec<String>,
    pub component_dir: Option<String>,
    pub package_name: Option<String>,
    /// Package root; the working directory when unset
    pub root: Option<PathBuf>,
    /// Extra headers attached to every served file
    pub headers: Vec<(String, String)>,
    /// API backend; `None` disables forwarding
    pub proxy: Option<ProxyTarget>,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            port: None,
            host: None,
            page: None,
            browser: Vec::new(),
            component_dir: None,
            package_name: None,
            root: None,
            headers: Vec::new(),
            proxy: Some(ProxyTarget::default()),
        }
    }
}

impl ServerOptions {
    pub fn host_or_default(&self) -> &str {
        self.host
            .as_deref()
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_HOST)
    }
}
