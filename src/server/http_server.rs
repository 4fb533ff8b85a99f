use may::coroutine::JoinHandle;
use may_minihttp::{HttpServerWithHeaders, HttpService};
use std::fmt;
use std::io;
use std::net::{SocketAddr, TcpStream, ToSocketAddrs};
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// How long [`ServerHandle::wait_ready`] keeps probing.
const READY_TIMEOUT: Duration = Duration::from_secs(2);

/// Wrapper around may_minihttp's HTTP server
///
/// Uses 32 max headers so browser requests with large cookie and
/// `Accept-*` sets are not rejected.
pub struct HttpServer<T>(pub T);

/// Handle to a running HTTP server
pub struct ServerHandle {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

/// A failed bind, with the address it was attempted on.
#[derive(Debug)]
pub struct BindError {
    /// Address that failed; `None` when the host did not resolve
    pub addr: Option<SocketAddr>,
    pub source: io::Error,
}

impl BindError {
    pub fn kind(&self) -> io::ErrorKind {
        self.source.kind()
    }
}

impl fmt::Display for BindError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.addr {
            Some(addr) => write!(f, "cannot bind {addr}: {}", self.source),
            None => write!(f, "cannot resolve listen address: {}", self.source),
        }
    }
}

impl std::error::Error for BindError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl ServerHandle {
    /// Address the listener actually bound
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Block until a TCP connect to [`Self::addr`] succeeds.
    ///
    /// # Errors
    ///
    /// Returns `TimedOut` when the listener does not accept within two seconds.
    pub fn wait_ready(&self) -> io::Result<()> {
        let deadline = Instant::now() + READY_TIMEOUT;
        while Instant::now() < deadline {
            if TcpStream::connect_timeout(&self.addr, Duration::from_millis(50)).is_ok() {
                return Ok(());
            }
            thread::sleep(Duration::from_millis(10));
        }
        Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("server on {} not accepting connections", self.addr),
        ))
    }

    /// Cancel the accept coroutine and wait for it to unwind
    pub fn stop(self) {
        // SAFETY: the handle is owned here and nothing else joins or cancels
        // the accept coroutine.
        unsafe {
            self.handle.coroutine().cancel();
        }
        let _ = self.handle.join();
    }

    /// Block until the accept coroutine exits
    ///
    /// # Errors
    ///
    /// Returns the panic payload if the coroutine panicked.
    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

impl<T: HttpService + Clone + Send + Sync + 'static> HttpServer<T> {
    /// Bind the first usable address `addr` resolves to and start serving.
    ///
    /// Resolved addresses are tried in resolver order. An address whose
    /// family is unavailable on this host (`AddrNotAvailable`) moves on to the
    /// next one; any other failure, `AddrInUse` included, stops there and is
    /// returned with the address it happened on.
    ///
    /// # Errors
    ///
    /// Returns a [`BindError`] if the host does not resolve or no address binds.
    pub fn start<A: ToSocketAddrs>(self, addr: A) -> Result<ServerHandle, BindError> {
        let candidates: Vec<SocketAddr> = addr
            .to_socket_addrs()
            .map_err(|source| BindError { addr: None, source })?
            .collect();

        let mut last_error = None;
        for candidate in candidates {
            match HttpServerWithHeaders::<_, 32>(self.0.clone()).start(candidate) {
                Ok(handle) => {
                    return Ok(ServerHandle {
                        addr: candidate,
                        handle,
                    })
                }
                Err(source) if source.kind() == io::ErrorKind::AddrNotAvailable => {
                    debug!(addr = %candidate, error = %source, "Address not available, trying next");
                    last_error = Some(BindError {
                        addr: Some(candidate),
                        source,
                    });
                }
                Err(source) => {
                    return Err(BindError {
                        addr: Some(candidate),
                        source,
                    })
                }
            }
        }
        Err(last_error.unwrap_or_else(|| BindError {
            addr: None,
            source: io::Error::new(io::ErrorKind::InvalidInput, "address resolved to nothing"),
        }))
    }
}
