use super::rewrite::{rewrite_segments, split_segments};
use crate::package_name::resolve_name;
use std::path::PathBuf;
use tracing::debug;

/// Directory holding the component's dependencies when none is configured.
pub const DEFAULT_COMPONENT_DIR: &str = "bower_components";

/// Inputs to [`make_app`].
#[derive(Debug, Clone, Default)]
pub struct AppOptions {
    /// Directory containing the package's own files
    pub root: Option<PathBuf>,
    /// Directory containing dependencies (default: `bower_components`)
    pub component_dir: Option<String>,
    /// Explicit package name, overriding config and directory lookup
    pub package_name: Option<String>,
    /// Extra headers appended to every served file
    pub headers: Vec<(String, String)>,
}

/// Routing decision for a request that reached the component app.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Permanent redirect to the given location
    Redirect(String),
    /// Deliver the file (or directory index) at this path
    Serve(String),
    /// Path escapes the served trees
    Forbidden,
    /// Hidden file or directory
    NotFound,
    /// Path is not valid percent-encoded UTF-8
    BadRequest,
}

/// The component app: a package name, a dependency directory and a root,
/// resolved once and reused for every request.
#[derive(Debug, Clone)]
pub struct ComponentApp {
    package_name: String,
    component_dir: String,
    root: Option<String>,
    headers: Vec<(String, String)>,
}

/// Build a [`ComponentApp`] from options.
pub fn make_app(options: AppOptions) -> ComponentApp {
    ComponentApp::new(options)
}

impl ComponentApp {
    pub fn new(options: AppOptions) -> Self {
        let component_dir = options
            .component_dir
            .filter(|dir| !dir.is_empty())
            .unwrap_or_else(|| DEFAULT_COMPONENT_DIR.to_string());
        let package_name = resolve_name(options.package_name.as_deref(), options.root.as_deref());
        let root = options
            .root
            .map(|root| root.to_string_lossy().into_owned());
        debug!(
            package_name = %package_name,
            component_dir = %component_dir,
            root = ?root,
            "Component app resolved"
        );
        Self {
            package_name,
            component_dir,
            root,
            headers: options.headers,
        }
    }

    pub fn package_name(&self) -> &str {
        &self.package_name
    }

    pub fn component_dir(&self) -> &str {
        &self.component_dir
    }

    pub fn root(&self) -> Option<&str> {
        self.root.as_deref()
    }

    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Location the app's own `/` redirects to.
    pub fn index_location(&self) -> String {
        format!("./{}/", self.package_name)
    }

    /// Decide how to answer `pathname`, given relative to the app's mount point.
    pub fn resolve(&self, pathname: &str) -> Resolution {
        if pathname == "/" {
            return Resolution::Redirect(self.index_location());
        }
        let mut segments = Vec::new();
        for raw in split_segments(pathname) {
            match urlencoding::decode(raw) {
                Ok(segment) => segments.push(segment.into_owned()),
                Err(_) => return Resolution::BadRequest,
            }
        }
        let parts = || segments.iter().flat_map(|s| s.split(['/', '\\']));
        if parts().any(|part| part == ".." || part.contains('\0')) {
            return Resolution::Forbidden;
        }
        if parts().any(|part| part.len() > 1 && part.starts_with('.')) {
            return Resolution::NotFound;
        }
        let file_path = rewrite_segments(
            segments,
            &self.package_name,
            &self.component_dir,
            self.root.as_deref(),
        );
        Resolution::Serve(file_path)
    }
}
