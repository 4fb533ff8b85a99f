//! # Port Negotiation
//!
//! Chooses the listening port: the configured one, or the first free port in
//! `[8080, 8180)`. The scan is a one-shot blocking probe with no timeout.

use crate::error::StartupError;
use crate::options::ServerOptions;
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpListener};
use std::ops::Range;
use tracing::debug;

/// Ports scanned when none is configured.
pub const PORT_SCAN_RANGE: Range<u16> = 8080..8180;

/// Port used when the scan finds nothing free.
pub const DEFAULT_PORT: u16 = 8080;

/// Finds a port nobody is listening on.
pub trait PortScanner {
    /// First free port in `range`, or `None` when every port is taken.
    fn first_free(&self, range: Range<u16>) -> io::Result<Option<u16>>;
}

/// Probes ports by binding the unspecified address of both families.
///
/// A port counts as free only when `0.0.0.0` and `::` both bind, so a
/// listener on either family (`127.0.0.1`, `::1`, dual-stack `::`) makes it
/// taken. Hosts without IPv6 are judged on the IPv4 probe alone.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpPortScanner;

/// Outcome of binding one address.
enum Probe {
    Free,
    Taken,
    /// The address family is not available on this host
    Unavailable,
}

fn probe(addr: SocketAddr) -> io::Result<Probe> {
    match TcpListener::bind(addr) {
        Ok(listener) => {
            drop(listener);
            Ok(Probe::Free)
        }
        Err(err)
            if matches!(
                err.kind(),
                io::ErrorKind::AddrInUse | io::ErrorKind::PermissionDenied
            ) =>
        {
            Ok(Probe::Taken)
        }
        Err(err) if addr.is_ipv6() => {
            debug!(addr = %addr, error = %err, "IPv6 probe unavailable");
            Ok(Probe::Unavailable)
        }
        Err(err) => Err(err),
    }
}

impl TcpPortScanner {
    /// Whether nothing listens on `port` on either address family.
    pub fn is_free(&self, port: u16) -> io::Result<bool> {
        if let Probe::Taken = probe(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)))? {
            return Ok(false);
        }
        let v6 = probe(SocketAddr::from((Ipv6Addr::UNSPECIFIED, port)))?;
        Ok(!matches!(v6, Probe::Taken))
    }
}

impl PortScanner for TcpPortScanner {
    fn first_free(&self, range: Range<u16>) -> io::Result<Option<u16>> {
        for port in range {
            if self.is_free(port)? {
                return Ok(Some(port));
            }
            debug!(port, "Port taken");
        }
        Ok(None)
    }
}

/// Return `options` with a port filled in.
///
/// A configured port is kept as-is and the scanner is never consulted.
/// When the scan finds no free port the port stays unset; the bootstrapper
/// then falls back to [`DEFAULT_PORT`].
pub fn negotiate_port(
    options: &ServerOptions,
    scanner: &dyn PortScanner,
) -> Result<ServerOptions, StartupError> {
    if options.port.is_some() {
        return Ok(options.clone());
    }
    let port = scanner
        .first_free(PORT_SCAN_RANGE)
        .map_err(StartupError::PortScan)?;
    debug!(port = ?port, "Port scan finished");
    Ok(ServerOptions {
        port,
        ..options.clone()
    })
}
