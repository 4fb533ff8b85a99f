use super::request::{parse_request, ParsedRequest};
use super::response::{
    header_line, is_valid_header, write_file, write_proxied, write_redirect, write_text_error,
};
use crate::app::{ComponentApp, Resolution};
use crate::proxy::ApiProxy;
use crate::static_files::{Delivery, StaticFiles};
use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use tracing::{debug, warn};

/// Path prefix the component app is mounted under.
pub const COMPONENTS_MOUNT: &str = "/components";

/// Top-level request handler.
///
/// Requests pass through, in order: the API proxy, the `/` redirect to the
/// package, and the component app mounted at `/components/`.
#[derive(Clone)]
pub struct PolyserveService {
    app: Arc<ComponentApp>,
    files: StaticFiles,
    proxy: Option<Arc<ApiProxy>>,
    root_redirect: &'static str,
    app_redirect: &'static str,
    extra_headers: Arc<[&'static str]>,
}

impl PolyserveService {
    pub fn new(app: ComponentApp, files: StaticFiles, proxy: Option<ApiProxy>) -> Self {
        let root_redirect = header_line("Location", &package_url_path(app.package_name()));
        let app_redirect = header_line("Location", &app.index_location());
        let extra_headers = extra_header_lines(app.headers()).into();
        Self {
            app: Arc::new(app),
            files,
            proxy: proxy.map(Arc::new),
            root_redirect,
            app_redirect,
            extra_headers,
        }
    }

    pub fn app(&self) -> &ComponentApp {
        &self.app
    }

    pub fn package_name(&self) -> &str {
        self.app.package_name()
    }

    fn forward(&self, proxy: &ApiProxy, request: &ParsedRequest, res: &mut Response) {
        match proxy.forward(request) {
            Ok(proxied) => {
                debug!(url = %request.url, status = proxied.status, "Proxied API request");
                write_proxied(res, proxied);
            }
            Err(err) => {
                warn!(
                    url = %request.url,
                    backend = %proxy.target().origin(),
                    error = %err,
                    "API proxy request failed"
                );
                write_text_error(res, 502);
            }
        }
    }

    fn serve_app(&self, request: &ParsedRequest, local_path: &str, res: &mut Response) {
        if !request.is_get_or_head() {
            write_text_error(res, 404);
            return;
        }
        let resolution = self.app.resolve(local_path);
        debug!(path = %request.pathname, resolution = ?resolution, "Component path resolved");
        let file_path = match resolution {
            Resolution::Redirect(_) => {
                write_redirect(res, 301, self.app_redirect);
                return;
            }
            Resolution::Serve(file_path) => file_path,
            Resolution::Forbidden => return self.app_error(res, 403),
            Resolution::NotFound => return self.app_error(res, 404),
            Resolution::BadRequest => return self.app_error(res, 400),
        };
        match self.files.deliver(&file_path, &request.pathname) {
            Ok(Delivery::File {
                bytes,
                content_type,
            }) => {
                write_file(res, bytes, content_type, request.is_head());
                self.append_headers(res);
            }
            Ok(Delivery::Redirect(location)) => {
                write_redirect(res, 301, header_line("Location", &location));
                self.append_headers(res);
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(file = %file_path, "File not found");
                self.app_error(res, 404);
            }
            Err(err) => {
                warn!(file = %file_path, error = %err, "File delivery failed");
                self.app_error(res, 500);
            }
        }
    }

    fn app_error(&self, res: &mut Response, status: u16) {
        write_text_error(res, status);
        self.append_headers(res);
    }

    fn append_headers(&self, res: &mut Response) {
        for line in self.extra_headers.iter().copied() {
            res.header(line);
        }
    }
}

/// Response lines for the configured extra headers; malformed ones are skipped.
fn extra_header_lines(headers: &[(String, String)]) -> Vec<&'static str> {
    headers
        .iter()
        .filter(|(name, value)| {
            let valid = is_valid_header(name, value);
            if !valid {
                warn!(header = %name, "Skipping malformed extra header");
            }
            valid
        })
        .map(|(name, value)| header_line(name, value))
        .collect()
}

/// Path of the package's base page under the component mount.
pub fn package_url_path(package_name: &str) -> String {
    format!("{COMPONENTS_MOUNT}/{package_name}/")
}

/// Path relative to the component mount, or `None` outside of it.
pub fn mounted_path(pathname: &str) -> Option<&str> {
    let rest = pathname.strip_prefix(COMPONENTS_MOUNT)?;
    match rest {
        "" => Some("/"),
        rest if rest.starts_with('/') => Some(rest),
        _ => None,
    }
}

impl HttpService for PolyserveService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = parse_request(req);

        if let Some(proxy) = &self.proxy {
            if proxy.matches(&request.url) {
                self.forward(proxy, &request, res);
                return Ok(());
            }
        }

        if request.pathname == "/" && request.is_get_or_head() {
            write_redirect(res, 301, self.root_redirect);
            return Ok(());
        }

        match mounted_path(&request.pathname) {
            Some(local_path) => self.serve_app(&request, local_path, res),
            None => write_text_error(res, 404),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mounted_path() {
        assert_eq!(mounted_path("/components/pkg/a.js"), Some("/pkg/a.js"));
        assert_eq!(mounted_path("/components/"), Some("/"));
        assert_eq!(mounted_path("/components"), Some("/"));
        assert_eq!(mounted_path("/componentsx/a.js"), None);
        assert_eq!(mounted_path("/other/a.js"), None);
    }

    #[test]
    fn test_extra_header_lines_skip_malformed() {
        let headers = vec![
            ("Cache-Control".to_string(), "no-cache".to_string()),
            ("X-Test".to_string(), "a\r\nSet-Cookie: injected=1".to_string()),
            ("Bad Name".to_string(), "x".to_string()),
        ];
        assert_eq!(extra_header_lines(&headers), vec!["Cache-Control: no-cache"]);
    }

    #[test]
    fn test_package_url_path() {
        assert_eq!(package_url_path("my-pkg"), "/components/my-pkg/");
    }
}
