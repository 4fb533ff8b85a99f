use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directory index served for trailing-slash requests.
pub const INDEX_FILE: &str = "index.html";

/// Outcome of a successful delivery.
#[derive(Debug, PartialEq, Eq)]
pub enum Delivery {
    File {
        bytes: Vec<u8>,
        content_type: &'static str,
    },
    /// Directory requested without its trailing slash
    Redirect(String),
}

/// Reads rewritten file paths relative to a base directory.
#[derive(Debug, Clone)]
pub struct StaticFiles {
    base_dir: PathBuf,
}

impl Default for StaticFiles {
    fn default() -> Self {
        Self::new(".")
    }
}

impl StaticFiles {
    pub fn new<P: Into<PathBuf>>(base: P) -> Self {
        Self { base_dir: base.into() }
    }

    fn map_path(&self, file_path: &str) -> PathBuf {
        if file_path.is_empty() {
            self.base_dir.clone()
        } else {
            // absolute paths (a rooted package) replace the base
            self.base_dir.join(file_path)
        }
    }

    pub fn content_type(path: &Path) -> &'static str {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .unwrap_or("")
            .to_lowercase()
            .as_str()
        {
            "html" | "htm" => "text/html; charset=utf-8",
            "css" => "text/css; charset=utf-8",
            "js" | "mjs" => "application/javascript; charset=utf-8",
            "json" | "map" => "application/json; charset=utf-8",
            "txt" | "md" => "text/plain; charset=utf-8",
            "xml" => "application/xml",
            "svg" => "image/svg+xml",
            "png" => "image/png",
            "jpg" | "jpeg" => "image/jpeg",
            "gif" => "image/gif",
            "ico" => "image/x-icon",
            "webp" => "image/webp",
            "woff" => "font/woff",
            "woff2" => "font/woff2",
            "ttf" => "font/ttf",
            "wasm" => "application/wasm",
            _ => "application/octet-stream",
        }
    }

    /// Deliver `file_path`, answering directories with their index or a
    /// trailing-slash redirect based on `request_pathname`.
    pub fn deliver(&self, file_path: &str, request_pathname: &str) -> io::Result<Delivery> {
        let mut path = self.map_path(file_path);
        if path.is_dir() {
            if !request_pathname.ends_with('/') {
                return Ok(Delivery::Redirect(format!("{request_pathname}/")));
            }
            path.push(INDEX_FILE);
        }
        if !path.is_file() {
            return Err(io::Error::new(io::ErrorKind::NotFound, "file not found"));
        }
        let bytes = fs::read(&path)?;
        Ok(Delivery::File {
            bytes,
            content_type: Self::content_type(&path),
        })
    }
}
