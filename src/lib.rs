//! # polyserve
//!
//! **polyserve** is a development server for web components. It serves a
//! component's own files next to its dependency tree under one URL
//! namespace, forwards API traffic to a local backend and can open a browser
//! once it is listening.
//!
//! ## Overview
//!
//! ```text
//! GET /                                -> 301 /components/<package>/
//! GET /components/<package>/<path>     -> <root>/<path>
//! GET /components/<dependency>/<path>  -> <component_dir>/<dependency>/<path>
//! *   <api-looking path>               -> http://localhost:8421<path>
//! ```
//!
//! ## Architecture
//!
//! - **[`package_name`]** - resolves the name the package is served under
//! - **[`app`]** - rewrites request paths to on-disk paths
//! - **[`static_files`]** - reads files and directory indexes
//! - **[`proxy`]** - matches and forwards API requests
//! - **[`port`]** - picks the listening port
//! - **[`server`]** - HTTP server built on `may_minihttp` and the top-level service
//! - **[`start`]** - startup sequence: port, app, bind, browser
//! - **[`cli`]** - the `polyserve` binary's argument parsing
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Client
//!     participant Service as PolyserveService
//!     participant Proxy as ApiProxy
//!     participant App as ComponentApp
//!     participant Files as StaticFiles
//!
//!     Client->>Service: GET /components/my-pkg/demo/
//!     Service->>Proxy: matches(url)?
//!     alt API request
//!         Proxy->>Proxy: forward to backend
//!         Proxy-->>Client: upstream response
//!     end
//!     Service->>App: resolve("/my-pkg/demo/")
//!     App-->>Service: Serve("<root>/demo/")
//!     Service->>Files: deliver(path)
//!     Files-->>Client: 200 demo/index.html
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use polyserve::{start_server, ServerOptions};
//!
//! let server = start_server(&ServerOptions::default()).expect("server failed to start");
//! println!("serving {}", server.base_url());
//! server.join().ok();
//! ```
//!
//! ## Runtime Considerations
//!
//! polyserve runs on the `may` coroutine runtime. Startup is blocking: the
//! port scan and the bind both complete before [`start_server`] returns, and
//! neither has a timeout. Stack size and worker count are set through
//! [`runtime_config::RuntimeConfig`].

pub mod app;
pub mod browser;
pub mod cli;
pub mod error;
pub mod logging;
pub mod options;
pub mod package_name;
pub mod port;
pub mod proxy;
pub mod runtime_config;
pub mod server;
pub mod start;
pub mod static_files;

pub use app::{make_app, resolve_path, AppOptions, ComponentApp, Resolution};
pub use error::{ProxyError, StartupError};
pub use options::{Page, ServerOptions};
pub use package_name::resolve_name;
pub use port::{negotiate_port, PortScanner, TcpPortScanner};
pub use proxy::{ApiProxy, ProxyTarget};
pub use start::{start_server, start_server_with, RunningServer};
