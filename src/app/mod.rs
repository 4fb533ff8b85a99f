//! # Component App
//!
//! Maps request paths under the component namespace to files on disk.
//!
//! ## URL Namespace
//!
//! ```text
//! /                       -> 301 ./<package>/
//! /<package>/<rest>       -> <root>/<rest>
//! /<dependency>/<rest>    -> <component_dir>/<dependency>/<rest>
//! ```
//!
//! The package name is resolved once, when the app is built, through
//! [`crate::package_name`]. The app itself never touches the filesystem
//! beyond that; delivery is done by [`crate::static_files`].
//!
//! ## Usage
//!
//! ```rust
//! use polyserve::app::{make_app, AppOptions, Resolution};
//!
//! let app = make_app(AppOptions {
//!     root: Some(".".into()),
//!     package_name: Some("my-pkg".into()),
//!     ..AppOptions::default()
//! });
//! assert_eq!(app.resolve("/my-pkg/index.html"), Resolution::Serve("./index.html".into()));
//! assert_eq!(app.resolve("/"), Resolution::Redirect("./my-pkg/".into()));
//! ```

mod core;
mod rewrite;


pub use core::{make_app, AppOptions, ComponentApp, Resolution, DEFAULT_COMPONENT_DIR};
pub use rewrite::{resolve_path, split_segments};
