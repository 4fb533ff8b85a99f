//! Request path to on-disk path rewriting.
//!
//! A request whose first segment names the package is served from the
//! package's own tree; anything else addresses a dependency living under the
//! component directory. A dependency that shares the package's name is
//! therefore unreachable: its requests resolve into the package's own tree.

/// Split a request pathname into segments, dropping the empty segment produced
/// by the leading `/`.
///
/// Trailing slashes are kept as a final empty segment so that directory
/// requests survive the rewrite (`/pkg/` becomes `["pkg", ""]`).
pub fn split_segments(pathname: &str) -> Vec<&str> {
    pathname.strip_prefix('/').unwrap_or(pathname).split('/').collect()
}

/// Compute the file path to deliver for `request_path`.
///
/// * first segment equal to `package_name` with a `root`: the segment is
///   replaced by `root`
/// * first segment equal to `package_name` without a `root`: the segment is
///   dropped and the rest is served relative to the working directory
/// * anything else: `component_dir` is prepended to the full segment list
///
/// No existence checks happen here.
///
/// ```
/// use polyserve::app::resolve_path;
///
/// assert_eq!(resolve_path("/my-pkg/index.html", "my-pkg", "bower_components", Some(".")), "./index.html");
/// assert_eq!(
///     resolve_path("/some-dep/foo.js", "my-pkg", "bower_components", Some(".")),
///     "bower_components/some-dep/foo.js"
/// );
/// ```
pub fn resolve_path(
    request_path: &str,
    package_name: &str,
    component_dir: &str,
    root: Option<&str>,
) -> String {
    rewrite_segments(split_segments(request_path), package_name, component_dir, root)
}

pub(crate) fn rewrite_segments<S: AsRef<str>>(
    segments: Vec<S>,
    package_name: &str,
    component_dir: &str,
    root: Option<&str>,
) -> String {
    let owns_request = segments
        .first()
        .is_some_and(|first| first.as_ref() == package_name);
    let mut parts: Vec<&str> = Vec::with_capacity(segments.len() + 1);
    if owns_request {
        if let Some(root) = root.filter(|root| !root.is_empty()) {
            parts.push(root);
        }
        parts.extend(segments.iter().skip(1).map(AsRef::as_ref));
    } else {
        parts.push(component_dir);
        parts.extend(segments.iter().map(AsRef::as_ref));
    }
    parts.join("/")
}
