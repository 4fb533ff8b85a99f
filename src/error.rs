use std::fmt;
use std::io;
use std::net::SocketAddr;

/// Failure to bring the server up.
///
/// Every variant is terminal for the startup attempt; nothing is retried.
#[derive(Debug)]
pub enum StartupError {
    /// The free-port scan failed
    PortScan(io::Error),
    /// The listening socket could not be bound
    Bind {
        /// Port the bind was attempted on
        port: u16,
        /// Resolved address that failed, when the host resolved
        addr: Option<SocketAddr>,
        source: io::Error,
    },
    /// The working directory (default package root) is unavailable
    WorkingDirectory(io::Error),
    /// The API proxy could not be constructed
    Proxy(ProxyError),
}

impl StartupError {
    /// Whether this is a bind failure because the address is taken.
    pub fn is_addr_in_use(&self) -> bool {
        matches!(self, StartupError::Bind { source, .. } if source.kind() == io::ErrorKind::AddrInUse)
    }
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StartupError::PortScan(err) => write!(f, "failed to scan for a free port: {err}"),
            StartupError::Bind {
                addr: Some(addr),
                source,
                ..
            } => write!(f, "failed to listen on {addr}: {source}"),
            StartupError::Bind { port, source, .. } => {
                write!(f, "failed to listen on port {port}: {source}")
            }
            StartupError::WorkingDirectory(err) => {
                write!(f, "failed to read the working directory: {err}")
            }
            StartupError::Proxy(err) => write!(f, "failed to set up the API proxy: {err}"),
        }
    }
}

impl std::error::Error for StartupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StartupError::PortScan(err) | StartupError::WorkingDirectory(err) => Some(err),
            StartupError::Bind { source, .. } => Some(source),
            StartupError::Proxy(err) => Some(err),
        }
    }
}

impl From<ProxyError> for StartupError {
    fn from(err: ProxyError) -> Self {
        StartupError::Proxy(err)
    }
}

/// API proxy construction or forwarding failure.
#[derive(Debug)]
pub enum ProxyError {
    /// The request-matching pattern did not compile
    Pattern(regex::Error),
    /// The forwarding client failed to build or the upstream call failed
    Client(reqwest::Error),
    /// The incoming method cannot be forwarded
    InvalidMethod(String),
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::Pattern(err) => write!(f, "invalid proxy pattern: {err}"),
            ProxyError::Client(err) => write!(f, "upstream request failed: {err}"),
            ProxyError::InvalidMethod(method) => write!(f, "cannot forward method '{method}'"),
        }
    }
}

impl std::error::Error for ProxyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProxyError::Pattern(err) => Some(err),
            ProxyError::Client(err) => Some(err),
            ProxyError::InvalidMethod(_) => None,
        }
    }
}

impl From<regex::Error> for ProxyError {
    fn from(err: regex::Error) -> Self {
        ProxyError::Pattern(err)
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        ProxyError::Client(err)
    }
}
