//! # Server Bootstrapper
//!
//! Brings the dev server up in one pass:
//!
//! ```text
//! UNSTARTED -> PORT_RESOLVING (no port given) -> BINDING -> LISTENING
//!                                                       \-> BIND_FAILED
//! ```
//!
//! There is exactly one bind attempt. A failed bind is returned to the caller
//! and never retried on another port.

use crate::app::{make_app, AppOptions};
use crate::browser::{open_page, page_url};
use crate::error::StartupError;
use crate::options::ServerOptions;
use crate::port::{negotiate_port, PortScanner, TcpPortScanner, DEFAULT_PORT};
use crate::proxy::ApiProxy;
use crate::server::{package_url_path, BindError, HttpServer, PolyserveService, ServerHandle};
use crate::static_files::StaticFiles;
use std::io;
use std::net::SocketAddr;
use tracing::{debug, error, info};

/// A bound, listening server.
pub struct RunningServer {
    handle: ServerHandle,
    package_name: String,
    base_url: String,
    page_url: Option<String>,
}

impl RunningServer {
    pub fn addr(&self) -> SocketAddr {
        self.handle.addr()
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    /// `http://<host>:<port>/components/<package>/`
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Page opened in the browser, if one was requested
    pub fn page_url(&self) -> Option<&str> {
        self.page_url.as_deref()
    }

    pub fn handle(&self) -> &ServerHandle {
        &self.handle
    }

    pub fn stop(self) {
        self.handle.stop();
    }

    pub fn join(self) -> std::thread::Result<()> {
        self.handle.join()
    }
}

/// Diagnostic printed when the chosen port is taken, naming the address
/// the bind was attempted on when it is known.
pub fn port_in_use_message(port: u16, addr: Option<SocketAddr>) -> String {
    let on = addr.map(|addr| format!(" (on {addr})")).unwrap_or_default();
    format!(
        "ERROR: Port in use: {port}{on}. Please choose another port, or let an unused port be chosen automatically."
    )
}

/// Start the server, scanning for a free port when none is configured.
pub fn start_server(options: &ServerOptions) -> Result<RunningServer, StartupError> {
    start_server_with(options, &TcpPortScanner)
}

/// Start the server with a caller-supplied port scanner.
pub fn start_server_with(
    options: &ServerOptions,
    scanner: &dyn PortScanner,
) -> Result<RunningServer, StartupError> {
    let options = negotiate_port(options, scanner)?;
    let port = options.port.unwrap_or(DEFAULT_PORT);
    let host = options.host_or_default().to_string();
    info!(port, "Starting Polyserve on port {port}");

    let root = match &options.root {
        Some(root) => root.clone(),
        None => std::env::current_dir().map_err(StartupError::WorkingDirectory)?,
    };
    let app = make_app(AppOptions {
        root: Some(root),
        component_dir: options.component_dir.clone(),
        package_name: options.package_name.clone(),
        headers: options.headers.clone(),
    });
    let package_name = app.package_name().to_string();
    let proxy = options.proxy.clone().map(ApiProxy::new).transpose()?;
    if let Some(proxy) = &proxy {
        info!(backend = %proxy.target().origin(), "API requests are proxied");
    }

    let service = PolyserveService::new(app, StaticFiles::default(), proxy);
    let handle = HttpServer(service)
        .start((host.as_str(), port))
        .map_err(|err| bind_failed(port, err))?;
    debug!(addr = %handle.addr(), "Listener bound");

    let base_url = format!("http://{host}:{port}{}", package_url_path(&package_name));
    info!(url = %base_url, "Files in this directory are available under {base_url}");

    let page_url = options.page.as_ref().map(|page| page_url(&base_url, page));
    if let Some(url) = &page_url {
        open_page(url, &options.browser);
    }

    Ok(RunningServer {
        handle,
        package_name,
        base_url,
        page_url,
    })
}

fn bind_failed(port: u16, err: BindError) -> StartupError {
    let BindError { addr, source } = err;
    if source.kind() == io::ErrorKind::AddrInUse {
        error!(port, addr = ?addr, "{}", port_in_use_message(port, addr));
    }
    StartupError::Bind { port, addr, source }
}
