pub mod http_server;
pub mod request;
pub mod response;
pub mod service;

pub use http_server::{BindError, HttpServer, ServerHandle};
pub use request::{parse_request, pathname_of, ParsedRequest};
pub use service::{mounted_path, package_url_path, PolyserveService, COMPONENTS_MOUNT};
